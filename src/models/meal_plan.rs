//! Meal target model
//!
//! Persisted per-meal macro gram targets, one row per meal slot.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::estimator::{MacroTargets, MealMacroPlan, MealSlot};

/// Stored macro targets for one meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealTarget {
    pub meal: MealSlot,
    pub carb_g: i64,
    pub protein_g: i64,
    pub fat_g: i64,
    pub updated_at: String,
}

impl MealTarget {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_str: String = row.get("meal")?;
        Ok(Self {
            meal: MealSlot::parse(&meal_str).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    format!("unexpected meal value '{}'", meal_str).into(),
                )
            })?,
            carb_g: row.get("carb_g")?,
            protein_g: row.get("protein_g")?,
            fat_g: row.get("fat_g")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Replace all meal targets with a freshly computed plan
    pub fn replace_all(conn: &Connection, plan: &MealMacroPlan) -> DbResult<()> {
        for (slot, targets) in plan.iter() {
            conn.execute(
                r#"
                INSERT INTO meal_targets (meal, carb_g, protein_g, fat_g)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(meal) DO UPDATE SET
                    carb_g = excluded.carb_g,
                    protein_g = excluded.protein_g,
                    fat_g = excluded.fat_g,
                    updated_at = datetime('now')
                "#,
                params![slot.as_str(), targets.carb_g, targets.protein_g, targets.fat_g],
            )?;
        }
        Ok(())
    }

    /// Get all stored targets, in day order
    pub fn get_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meal_targets
             ORDER BY CASE meal
                 WHEN 'breakfast' THEN 0
                 WHEN 'lunch' THEN 1
                 ELSE 2
             END",
        )?;

        let targets = stmt
            .query_map([], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(targets)
    }

    /// Get the stored targets for one meal
    pub fn get(conn: &Connection, slot: MealSlot) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_targets WHERE meal = ?1")?;

        let result = stmt.query_row([slot.as_str()], Self::from_row);
        match result {
            Ok(target) => Ok(Some(target)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reassemble a plan from stored rows; None unless all three meals exist
    pub fn to_plan(targets: &[Self]) -> Option<MealMacroPlan> {
        let find = |slot: MealSlot| {
            targets.iter().find(|t| t.meal == slot).map(|t| MacroTargets {
                carb_g: t.carb_g,
                protein_g: t.protein_g,
                fat_g: t.fat_g,
            })
        };
        Some(MealMacroPlan {
            breakfast: find(MealSlot::Breakfast)?,
            lunch: find(MealSlot::Lunch)?,
            dinner: find(MealSlot::Dinner)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::estimator::allocate_meal_macros;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_replace_all_then_get_all() {
        let conn = test_conn();
        let plan = allocate_meal_macros(2000).unwrap();
        MealTarget::replace_all(&conn, &plan).unwrap();

        let targets = MealTarget::get_all(&conn).unwrap();
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].meal, MealSlot::Breakfast);
        assert_eq!(targets[1].meal, MealSlot::Lunch);
        assert_eq!(targets[2].meal, MealSlot::Dinner);
        assert_eq!(targets[1].carb_g, 100);

        assert_eq!(MealTarget::to_plan(&targets), Some(plan));
    }

    #[test]
    fn test_replace_all_overwrites_previous_plan() {
        let conn = test_conn();
        MealTarget::replace_all(&conn, &allocate_meal_macros(2000).unwrap()).unwrap();
        let plan = allocate_meal_macros(1600).unwrap();
        MealTarget::replace_all(&conn, &plan).unwrap();

        let targets = MealTarget::get_all(&conn).unwrap();
        assert_eq!(targets.len(), 3);
        assert_eq!(MealTarget::to_plan(&targets), Some(plan));
    }

    #[test]
    fn test_to_plan_requires_all_meals() {
        let conn = test_conn();
        let plan = allocate_meal_macros(1800).unwrap();
        MealTarget::replace_all(&conn, &plan).unwrap();
        conn.execute("DELETE FROM meal_targets WHERE meal = 'lunch'", [])
            .unwrap();

        let targets = MealTarget::get_all(&conn).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(MealTarget::to_plan(&targets), None);
    }
}
