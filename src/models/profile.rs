//! Health profile model
//!
//! Single-row table holding the user's health information and the derived
//! daily energy budget.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::estimator::{ActivityLevel, Gender};

/// The user's health profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthProfile {
    pub id: i64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: i64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub pre_meal_glucose: Option<f64>,
    pub pre_meal_insulin: Option<i64>,
    pub tdee: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating or replacing the health profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthProfileCreate {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: i64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub pre_meal_glucose: Option<f64>,
    pub pre_meal_insulin: Option<i64>,
    pub tdee: i64,
}

fn text_conversion_error(column: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        format!("unexpected {} value '{}'", column, value).into(),
    )
}

impl HealthProfile {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let gender_str: String = row.get("gender")?;
        let level_str: String = row.get("activity_level")?;
        Ok(Self {
            id: row.get("id")?,
            height_cm: row.get("height_cm")?,
            weight_kg: row.get("weight_kg")?,
            age: row.get("age")?,
            gender: Gender::parse(&gender_str)
                .ok_or_else(|| text_conversion_error("gender", &gender_str))?,
            activity_level: ActivityLevel::parse(&level_str)
                .map_err(|_| text_conversion_error("activity_level", &level_str))?,
            pre_meal_glucose: row.get("pre_meal_glucose")?,
            pre_meal_insulin: row.get("pre_meal_insulin")?,
            tdee: row.get("tdee")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the health profile (single row table)
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM health_profile WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or replace the health profile (upsert)
    pub fn set(conn: &Connection, data: &HealthProfileCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO health_profile
                (id, height_cm, weight_kg, age, gender, activity_level,
                 pre_meal_glucose, pre_meal_insulin, tdee)
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg,
                age = excluded.age,
                gender = excluded.gender,
                activity_level = excluded.activity_level,
                pre_meal_glucose = excluded.pre_meal_glucose,
                pre_meal_insulin = excluded.pre_meal_insulin,
                tdee = excluded.tdee,
                updated_at = datetime('now')
            "#,
            params![
                data.height_cm,
                data.weight_kg,
                data.age,
                data.gender.as_str(),
                data.activity_level.as_str(),
                data.pre_meal_glucose,
                data.pre_meal_insulin,
                data.tdee,
            ],
        )?;

        Self::get(conn)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn sample_profile() -> HealthProfileCreate {
        HealthProfileCreate {
            height_cm: 165.0,
            weight_kg: 55.0,
            age: 25,
            gender: Gender::Female,
            activity_level: ActivityLevel::ModeratelyActive,
            pre_meal_glucose: Some(5.0),
            pre_meal_insulin: Some(0),
            tdee: 2107,
        }
    }

    #[test]
    fn test_get_returns_none_when_unset() {
        let conn = test_conn();
        assert!(HealthProfile::get(&conn).unwrap().is_none());
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let conn = test_conn();
        let saved = HealthProfile::set(&conn, &sample_profile()).unwrap();
        assert_eq!(saved.id, 1);
        assert_eq!(saved.gender, Gender::Female);
        assert_eq!(saved.activity_level, ActivityLevel::ModeratelyActive);
        assert_eq!(saved.tdee, 2107);

        let loaded = HealthProfile::get(&conn).unwrap().unwrap();
        assert_eq!(loaded.height_cm, 165.0);
        assert_eq!(loaded.pre_meal_glucose, Some(5.0));
    }

    #[test]
    fn test_set_replaces_existing_row() {
        let conn = test_conn();
        HealthProfile::set(&conn, &sample_profile()).unwrap();

        let mut update = sample_profile();
        update.weight_kg = 58.5;
        update.activity_level = ActivityLevel::VeryActive;
        update.tdee = 2345;
        HealthProfile::set(&conn, &update).unwrap();

        let loaded = HealthProfile::get(&conn).unwrap().unwrap();
        assert_eq!(loaded.id, 1);
        assert_eq!(loaded.weight_kg, 58.5);
        assert_eq!(loaded.activity_level, ActivityLevel::VeryActive);
        assert_eq!(loaded.tdee, 2345);
    }
}
