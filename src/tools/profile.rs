//! Health profile tools
//!
//! Profile submission runs the estimator pipeline, persists the results,
//! then pushes the profile to the backend. Estimation alone is also
//! exposed as a pure tool.

use serde::Serialize;

use crate::backend::{BackendClient, UserDataUpload};
use crate::db::Database;
use crate::estimator::{
    estimate_daily_needs, ActivityLevel, DailyNeeds, Gender, MealMacroPlan,
};
use crate::models::{HealthProfile, HealthProfileCreate, MealTarget};

/// Validated profile input, parsed from tool parameters
#[derive(Debug, Clone)]
pub struct ProfileInput {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: i64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub pre_meal_glucose: Option<f64>,
    pub pre_meal_insulin: Option<i64>,
}

/// Parse and validate raw tool parameters into a ProfileInput
pub fn parse_profile_input(
    height_cm: f64,
    weight_kg: f64,
    age: i64,
    gender: &str,
    activity_level: &str,
    pre_meal_glucose: Option<f64>,
    pre_meal_insulin: Option<i64>,
) -> Result<ProfileInput, String> {
    let gender = Gender::parse(gender)
        .ok_or_else(|| format!("gender must be 'male' or 'female', got '{}'", gender))?;
    let activity_level = ActivityLevel::parse(activity_level).map_err(|e| e.to_string())?;

    if age <= 0 {
        return Err("age must be a positive number of years".to_string());
    }
    if let Some(glucose) = pre_meal_glucose {
        if !glucose.is_finite() || glucose <= 0.0 {
            return Err("pre_meal_glucose must be a positive mmol/L value".to_string());
        }
    }
    if let Some(insulin) = pre_meal_insulin {
        if insulin < 0 {
            return Err("pre_meal_insulin cannot be negative".to_string());
        }
    }

    Ok(ProfileInput {
        height_cm,
        weight_kg,
        age,
        gender,
        activity_level,
        pre_meal_glucose,
        pre_meal_insulin,
    })
}

/// Response for submit_health_profile
#[derive(Debug, Serialize)]
pub struct SubmitProfileResponse {
    pub bmr: f64,
    pub tdee: i64,
    pub meal_plan: MealMacroPlan,
    pub backend_synced: bool,
    pub message: String,
}

/// Response for get_health_profile
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: i64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub pre_meal_glucose: Option<f64>,
    pub pre_meal_insulin: Option<i64>,
    pub tdee: i64,
    pub meal_plan: Option<MealMacroPlan>,
    pub updated_at: String,
}

/// Response for estimate_nutrient_needs
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub bmr: f64,
    pub tdee: i64,
    pub meal_plan: MealMacroPlan,
}

/// Run the estimator over the input and persist profile plus meal targets.
pub fn save_profile(
    db: &Database,
    input: &ProfileInput,
) -> Result<(HealthProfile, DailyNeeds), String> {
    let needs = estimate_daily_needs(
        input.weight_kg,
        input.height_cm,
        input.age as f64,
        input.gender,
        input.activity_level,
    )
    .map_err(|e| e.to_string())?;

    let data = HealthProfileCreate {
        height_cm: input.height_cm,
        weight_kg: input.weight_kg,
        age: input.age,
        gender: input.gender,
        activity_level: input.activity_level,
        pre_meal_glucose: input.pre_meal_glucose,
        pre_meal_insulin: input.pre_meal_insulin,
        tdee: needs.tdee,
    };

    let profile = db
        .with_conn(|conn| {
            let profile = HealthProfile::set(conn, &data)?;
            MealTarget::replace_all(conn, &needs.meal_plan)?;
            Ok(profile)
        })
        .map_err(|e| format!("Failed to save profile: {}", e))?;

    Ok((profile, needs))
}

/// Submit the health profile: save locally, then sync to the backend.
///
/// Local state is saved before the upload; an unreachable backend is
/// reported in the response rather than failing the command.
pub async fn submit_health_profile(
    db: &Database,
    backend: &BackendClient,
    input: ProfileInput,
) -> Result<SubmitProfileResponse, String> {
    let (profile, needs) = save_profile(db, &input)?;

    let upload = UserDataUpload::from_profile(&profile, &needs.meal_plan);
    let (backend_synced, message) = match backend.upload_user_data(&upload).await {
        Ok(ack) => (
            true,
            ack.message
                .unwrap_or_else(|| "Health profile saved".to_string()),
        ),
        Err(e) => {
            tracing::warn!("user-data upload failed: {}", e);
            (
                false,
                "Health profile saved locally; backend sync failed".to_string(),
            )
        }
    };

    Ok(SubmitProfileResponse {
        bmr: needs.bmr,
        tdee: needs.tdee,
        meal_plan: needs.meal_plan,
        backend_synced,
        message,
    })
}

/// Fetch the stored profile with its meal targets.
pub fn get_health_profile(db: &Database) -> Result<Option<ProfileResponse>, String> {
    db.with_conn(|conn| {
        let profile = match HealthProfile::get(conn)? {
            Some(profile) => profile,
            None => return Ok(None),
        };
        let targets = MealTarget::get_all(conn)?;

        Ok(Some(ProfileResponse {
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            age: profile.age,
            gender: profile.gender,
            activity_level: profile.activity_level,
            pre_meal_glucose: profile.pre_meal_glucose,
            pre_meal_insulin: profile.pre_meal_insulin,
            tdee: profile.tdee,
            meal_plan: MealTarget::to_plan(&targets),
            updated_at: profile.updated_at,
        }))
    })
    .map_err(|e| format!("Failed to load profile: {}", e))
}

/// Pure estimation: no persistence, no backend call.
pub fn estimate_nutrient_needs(input: &ProfileInput) -> Result<EstimateResponse, String> {
    let needs = estimate_daily_needs(
        input.weight_kg,
        input.height_cm,
        input.age as f64,
        input.gender,
        input.activity_level,
    )
    .map_err(|e| e.to_string())?;

    Ok(EstimateResponse {
        bmr: needs.bmr,
        tdee: needs.tdee,
        meal_plan: needs.meal_plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_input_valid() {
        let input = parse_profile_input(
            165.0,
            55.0,
            25,
            "female",
            "moderately_active",
            Some(5.0),
            Some(0),
        )
        .unwrap();
        assert_eq!(input.gender, Gender::Female);
        assert_eq!(input.activity_level, ActivityLevel::ModeratelyActive);
    }

    #[test]
    fn test_parse_profile_input_rejects_bad_gender() {
        let err =
            parse_profile_input(165.0, 55.0, 25, "unknown", "sedentary", None, None).unwrap_err();
        assert!(err.contains("gender"));
    }

    #[test]
    fn test_parse_profile_input_rejects_bad_activity_level() {
        let err =
            parse_profile_input(165.0, 55.0, 25, "male", "heroic", None, None).unwrap_err();
        assert!(err.contains("activity level"));
    }

    #[test]
    fn test_parse_profile_input_rejects_bad_glucose() {
        let err = parse_profile_input(
            165.0,
            55.0,
            25,
            "male",
            "sedentary",
            Some(-2.0),
            None,
        )
        .unwrap_err();
        assert!(err.contains("pre_meal_glucose"));
    }

    #[test]
    fn test_estimate_nutrient_needs_matches_pipeline() {
        let input =
            parse_profile_input(165.0, 55.0, 25, "female", "moderately_active", None, None)
                .unwrap();
        let estimate = estimate_nutrient_needs(&input).unwrap();
        assert_eq!(estimate.tdee, 2107);
        assert_eq!(estimate.meal_plan.lunch.carb_g, 105); // 842.8 kcal * 0.5 / 4
    }

    #[test]
    fn test_estimate_nutrient_needs_propagates_estimator_error() {
        let mut input =
            parse_profile_input(165.0, 55.0, 25, "female", "sedentary", None, None).unwrap();
        input.weight_kg = 0.0;
        assert!(estimate_nutrient_needs(&input).is_err());
    }
}
