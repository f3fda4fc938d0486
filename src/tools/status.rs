//! Glyco status tool
//!
//! Provides runtime status information about the Glyco service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Usage guide for AI assistants
pub const ASSISTANT_INSTRUCTIONS: &str = r#"
# Glyco Assistant Instructions

Glyco is the companion service for a diet and glucose management assistant.
It keeps the user's health profile, chat transcript, and recommendation
history locally, and talks to the recommendation backend for answers,
recipes, and preference learning.

## Getting Started

**Always submit the health profile first.** Chat and recipe tools attach
the stored profile to every backend request and refuse to run without one.

```
submit_health_profile(
  height: 165,               // centimeters
  weight: 55,                // kilograms
  age: 25,
  gender: "female",          // "male" or "female"
  activity_level: "moderately_active",
  pre_meal_glucose: 5.0,     // mmol/L, optional
  pre_meal_insulin: 0        // units, optional
)
```

Activity levels: sedentary, lightly_active, moderately_active,
very_active, extra_active.

Submitting computes the daily energy budget (Harris-Benedict BMR scaled by
the activity multiplier) and the per-meal carb/protein/fat gram targets,
stores both, and syncs them to the backend. A failed sync is reported as
`backend_synced: false`; the profile is still saved locally.

Use `estimate_nutrient_needs` with the same parameters for a what-if
calculation that stores nothing.

## Chatting

```
chat(message: "Please suggest a diabetic-friendly breakfast")
```

The reply is recorded in the transcript. When the backend answers with a
recipe recommendation, the reply also lands in the recommendation history
with its health score and predicted post-meal glucose.

Transcript tools: `get_chat_transcript(limit)`, `clear_chat_transcript`.

## Recipes and Ratings

```
get_recipe_recommendation(meal_type: "breakfast")   // defaults to lunch
list_recommendation_history(limit: 20)
rate_recipe(history_id: 3, recipe: "Oat congee", rating: 4)
```

Ratings use a 1-5 star scale and are reported to the backend before they
are recorded locally.

## Quick Reference

| Task | Tool |
|------|------|
| Save/update profile | `submit_health_profile` |
| View stored profile | `get_health_profile` |
| What-if estimate | `estimate_nutrient_needs` |
| Ask a question | `chat` |
| View conversation | `get_chat_transcript` |
| Reset conversation | `clear_chat_transcript` |
| Get recipes | `get_recipe_recommendation` |
| Browse history | `list_recommendation_history` |
| Inspect one entry | `get_recommendation_entry` |
| Rate a recipe | `rate_recipe` |
| Service status | `glyco_status` |
"#;

/// Runtime status of the Glyco service
#[derive(Debug, Serialize)]
pub struct GlycoStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Backend collaborator
    pub backend_url: String,

    /// Process information
    pub server_time: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Tracks service start time and reports runtime status
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    backend_url: String,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf, backend_url: String) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            backend_url,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> GlycoStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        GlycoStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            backend_url: self.backend_url.clone(),
            server_time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
