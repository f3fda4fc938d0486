//! Utility to set the health profile in the database
//!
//! Usage: set_profile [height_cm] [weight_kg] [age] [gender] [activity_level]

use std::path::PathBuf;

use glyco::estimator::{estimate_daily_needs, ActivityLevel, Gender};
use glyco::models::{HealthProfile, HealthProfileCreate, MealTarget};

fn get_database_path() -> PathBuf {
    std::env::var("GLYCO_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            std::fs::create_dir_all(&path).ok();
            path.push("glyco.db");
            path
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let height_cm: f64 = args.first().map_or(Ok(165.0), |s| s.parse())?;
    let weight_kg: f64 = args.get(1).map_or(Ok(55.0), |s| s.parse())?;
    let age: i64 = args.get(2).map_or(Ok(25), |s| s.parse())?;
    let gender = Gender::parse(args.get(3).map_or("female", |s| s.as_str()))
        .ok_or("gender must be 'male' or 'female'")?;
    let activity_level =
        ActivityLevel::parse(args.get(4).map_or("moderately_active", |s| s.as_str()))?;

    let db_path = get_database_path();
    println!("Database path: {}", db_path.display());

    let database = glyco::db::Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        glyco::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    // Compute daily needs and store the profile with its meal targets
    let needs = estimate_daily_needs(weight_kg, height_cm, age as f64, gender, activity_level)?;

    database.with_conn(|conn| {
        let profile = HealthProfile::set(
            conn,
            &HealthProfileCreate {
                height_cm,
                weight_kg,
                age,
                gender,
                activity_level,
                pre_meal_glucose: None,
                pre_meal_insulin: None,
                tdee: needs.tdee,
            },
        )?;
        MealTarget::replace_all(conn, &needs.meal_plan)?;

        println!("Health profile set:");
        println!("  Height: {} cm", profile.height_cm);
        println!("  Weight: {} kg", profile.weight_kg);
        println!("  Age: {}", profile.age);
        println!("  Gender: {}", profile.gender.as_str());
        println!("  Activity: {}", profile.activity_level.as_str());
        println!("  TDEE: {} kcal/day", profile.tdee);
        println!("  Updated: {}", profile.updated_at);
        Ok(())
    })?;

    Ok(())
}
