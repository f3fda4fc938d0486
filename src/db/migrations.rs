//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    // Get current version
    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    // Run migrations
    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- HEALTH PROFILE
        -- Single-row user profile plus the derived
        -- daily energy budget
        -- ============================================
        CREATE TABLE health_profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            height_cm REAL NOT NULL,
            weight_kg REAL NOT NULL,
            age INTEGER NOT NULL,
            gender TEXT NOT NULL CHECK(gender IN ('male', 'female')),
            activity_level TEXT NOT NULL CHECK(activity_level IN
                ('sedentary', 'lightly_active', 'moderately_active',
                 'very_active', 'extra_active')),
            pre_meal_glucose REAL,               -- mmol/L
            pre_meal_insulin INTEGER,            -- units injected
            tdee INTEGER NOT NULL,               -- kcal/day
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- MEAL TARGETS
        -- Per-meal macro gram targets, refreshed on
        -- every profile submission
        -- ============================================
        CREATE TABLE meal_targets (
            meal TEXT PRIMARY KEY CHECK(meal IN ('breakfast', 'lunch', 'dinner')),
            carb_g INTEGER NOT NULL,
            protein_g INTEGER NOT NULL,
            fat_g INTEGER NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- CHAT TRANSCRIPT
        -- ============================================
        CREATE TABLE chat_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            role TEXT NOT NULL CHECK(role IN ('user', 'assistant')),
            content TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_chat_messages_created ON chat_messages(created_at);

        -- ============================================
        -- RECOMMENDATION HISTORY
        -- One entry per recommendation the backend
        -- returned, with its reported stats
        -- ============================================
        CREATE TABLE recommendation_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            meal_type TEXT NOT NULL CHECK(meal_type IN ('breakfast', 'lunch', 'dinner')),
            health_score REAL,
            predicted_glucose REAL,              -- mmol/L, backend PBG
            carb REAL,                           -- grams
            protein REAL,                        -- grams
            fat REAL,                            -- grams
            fiber REAL,                          -- grams
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_history_created ON recommendation_history(created_at);

        -- Recipes attached to a history entry, each individually ratable
        CREATE TABLE history_recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            history_id INTEGER NOT NULL REFERENCES recommendation_history(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            rating REAL CHECK(rating IS NULL OR (rating >= 1.0 AND rating <= 5.0))
        );

        CREATE INDEX idx_history_recipes_history ON history_recipes(history_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}
