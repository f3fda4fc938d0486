//! Recommendation history model
//!
//! Each backend recommendation becomes one history entry carrying the
//! backend-reported stats, plus the recommended recipes which can be rated
//! individually afterwards.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::estimator::MealSlot;

/// A stored recommendation entry (without its recipes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub id: i64,
    pub meal_type: MealSlot,
    pub health_score: Option<f64>,
    pub predicted_glucose: Option<f64>,
    pub carb: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub created_at: String,
}

/// A recipe attached to a history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecipe {
    pub id: i64,
    pub history_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub rating: Option<f64>,
}

/// Recipe line for entry creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeLineCreate {
    pub name: String,
    pub description: Option<String>,
}

/// Data for creating a history entry with its recipes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationEntryCreate {
    pub meal_type: MealSlot,
    pub health_score: Option<f64>,
    pub predicted_glucose: Option<f64>,
    pub carb: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub recipes: Vec<RecipeLineCreate>,
}

/// History entry with its recipes attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationDetail {
    pub id: i64,
    pub meal_type: MealSlot,
    pub health_score: Option<f64>,
    pub predicted_glucose: Option<f64>,
    pub carb: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub recipes: Vec<HistoryRecipe>,
    pub created_at: String,
}

impl RecommendationEntry {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_str: String = row.get("meal_type")?;
        Ok(Self {
            id: row.get("id")?,
            meal_type: MealSlot::parse(&meal_str).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    format!("unexpected meal_type value '{}'", meal_str).into(),
                )
            })?,
            health_score: row.get("health_score")?,
            predicted_glucose: row.get("predicted_glucose")?,
            carb: row.get("carb")?,
            protein: row.get("protein")?,
            fat: row.get("fat")?,
            fiber: row.get("fiber")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a history entry and its recipes in one transaction
    pub fn create(
        conn: &mut Connection,
        data: &RecommendationEntryCreate,
    ) -> DbResult<RecommendationDetail> {
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO recommendation_history
                (meal_type, health_score, predicted_glucose, carb, protein, fat, fiber)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                data.meal_type.as_str(),
                data.health_score,
                data.predicted_glucose,
                data.carb,
                data.protein,
                data.fat,
                data.fiber,
            ],
        )?;
        let history_id = tx.last_insert_rowid();

        for recipe in &data.recipes {
            tx.execute(
                "INSERT INTO history_recipes (history_id, name, description)
                 VALUES (?1, ?2, ?3)",
                params![history_id, recipe.name, recipe.description],
            )?;
        }

        tx.commit()?;

        Self::get(conn, history_id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get one entry with its recipes
    pub fn get(conn: &Connection, id: i64) -> DbResult<Option<RecommendationDetail>> {
        let mut stmt = conn.prepare("SELECT * FROM recommendation_history WHERE id = ?1")?;

        let entry = match stmt.query_row([id], Self::from_row) {
            Ok(entry) => entry,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let recipes = HistoryRecipe::list_for_entry(conn, id)?;
        Ok(Some(entry.into_detail(recipes)))
    }

    /// Most recent entries first, each with its recipes
    pub fn list_recent(conn: &Connection, limit: i64) -> DbResult<Vec<RecommendationDetail>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM recommendation_history ORDER BY id DESC LIMIT ?1",
        )?;

        let entries = stmt
            .query_map([limit], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut details = Vec::with_capacity(entries.len());
        for entry in entries {
            let recipes = HistoryRecipe::list_for_entry(conn, entry.id)?;
            details.push(entry.into_detail(recipes));
        }
        Ok(details)
    }

    fn into_detail(self, recipes: Vec<HistoryRecipe>) -> RecommendationDetail {
        RecommendationDetail {
            id: self.id,
            meal_type: self.meal_type,
            health_score: self.health_score,
            predicted_glucose: self.predicted_glucose,
            carb: self.carb,
            protein: self.protein,
            fat: self.fat,
            fiber: self.fiber,
            recipes,
            created_at: self.created_at,
        }
    }
}

impl HistoryRecipe {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            history_id: row.get("history_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            rating: row.get("rating")?,
        })
    }

    /// Recipes for one history entry, in insertion order
    pub fn list_for_entry(conn: &Connection, history_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM history_recipes WHERE history_id = ?1 ORDER BY id ASC",
        )?;

        let recipes = stmt
            .query_map([history_id], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(recipes)
    }

    /// Find a recipe by entry and name
    pub fn find(conn: &Connection, history_id: i64, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM history_recipes WHERE history_id = ?1 AND name = ?2",
        )?;

        let result = stmt.query_row(params![history_id, name], Self::from_row);
        match result {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Record the user's rating for a recipe. Returns false if the recipe
    /// does not exist on that entry.
    pub fn set_rating(
        conn: &Connection,
        history_id: i64,
        name: &str,
        rating: f64,
    ) -> DbResult<bool> {
        let updated = conn.execute(
            "UPDATE history_recipes SET rating = ?1
             WHERE history_id = ?2 AND name = ?3",
            params![rating, history_id, name],
        )?;
        Ok(updated > 0)
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

    fn sample_entry() -> RecommendationEntryCreate {
        RecommendationEntryCreate {
            meal_type: MealSlot::Lunch,
            health_score: Some(8.2),
            predicted_glucose: Some(7.1),
            carb: Some(100.0),
            protein: Some(40.0),
            fat: Some(27.0),
            fiber: Some(10.0),
            recipes: vec![
                RecipeLineCreate {
                    name: "Steamed fish with greens".to_string(),
                    description: Some("Low glycemic load, high protein".to_string()),
                },
                RecipeLineCreate {
                    name: "Buckwheat salad".to_string(),
                    description: None,
                },
            ],
        }
    }

    #[test]
    fn test_create_and_get_entry_with_recipes() {
        let mut conn = test_conn();
        let created = RecommendationEntry::create(&mut conn, &sample_entry()).unwrap();

        assert_eq!(created.meal_type, MealSlot::Lunch);
        assert_eq!(created.recipes.len(), 2);
        assert_eq!(created.recipes[0].name, "Steamed fish with greens");
        assert!(created.recipes[0].rating.is_none());

        let loaded = RecommendationEntry::get(&conn, created.id).unwrap().unwrap();
        assert_eq!(loaded.health_score, Some(8.2));
        assert_eq!(loaded.recipes.len(), 2);
    }

    #[test]
    fn test_list_recent_newest_first() {
        let mut conn = test_conn();
        let first = RecommendationEntry::create(&mut conn, &sample_entry()).unwrap();
        let mut second_data = sample_entry();
        second_data.meal_type = MealSlot::Dinner;
        let second = RecommendationEntry::create(&mut conn, &second_data).unwrap();

        let entries = RecommendationEntry::list_recent(&conn, 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second.id);
        assert_eq!(entries[1].id, first.id);
    }

    #[test]
    fn test_set_rating() {
        let mut conn = test_conn();
        let entry = RecommendationEntry::create(&mut conn, &sample_entry()).unwrap();

        let updated =
            HistoryRecipe::set_rating(&conn, entry.id, "Buckwheat salad", 4.0).unwrap();
        assert!(updated);

        let recipe = HistoryRecipe::find(&conn, entry.id, "Buckwheat salad")
            .unwrap()
            .unwrap();
        assert_eq!(recipe.rating, Some(4.0));
    }

    #[test]
    fn test_set_rating_unknown_recipe() {
        let mut conn = test_conn();
        let entry = RecommendationEntry::create(&mut conn, &sample_entry()).unwrap();

        let updated = HistoryRecipe::set_rating(&conn, entry.id, "No such dish", 3.0).unwrap();
        assert!(!updated);
    }

    #[test]
    fn test_get_missing_entry() {
        let conn = test_conn();
        assert!(RecommendationEntry::get(&conn, 42).unwrap().is_none());
    }
}
