use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// A single drink event. `id` and `user_id` never change after insert;
/// quantity and drink type are mutable via update, the row is removed via delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub id: i64,
    pub user_id: i64,
    pub quantity_ml: i64,
    pub drink_type: String,
    /// RFC 3339 timestamp in local time. Calendar-day logic matches on the
    /// ISO date prefix.
    pub recorded_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConsumption {
    pub quantity_ml: i64,
    #[serde(default)]
    pub drink_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConsumption {
    pub quantity_ml: Option<i64>,
    pub drink_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    pub daily_goal_liters: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub weight_kg: Option<f64>,
    pub daily_goal_liters: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A login session. Tokens are server-issued and expire; there is no
/// long-lived shared secret anywhere in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub expires_at: String,
}

/// Dashboard statistics derived from a full consumption history.
/// Recomputed on every fetch, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedStats {
    pub today_total_ml: i64,
    pub today_coffee_count: i64,
    pub streak_days: i64,
    pub weekly_average_liters: f64,
    pub progress_percent: f64,
    /// Exactly 7 daily totals in liters, oldest to newest, coffee excluded.
    pub seven_day_series: Vec<f64>,
    pub today_records: Vec<ConsumptionRecord>,
}

pub const DEFAULT_GOAL_LITERS: f64 = 2.0;

/// Fallback drink type when the client sends an empty string.
pub const DEFAULT_DRINK_TYPE: &str = "water";

pub fn validate_quantity_ml(quantity_ml: i64) -> Result<()> {
    if quantity_ml <= 0 {
        bail!("quantity_ml must be greater than 0");
    }
    Ok(())
}

pub fn validate_goal_liters(goal: f64) -> Result<()> {
    if !goal.is_finite() || goal <= 0.0 {
        bail!("daily_goal_liters must be greater than 0");
    }
    Ok(())
}

/// Validate registration input: non-empty name, plausible email, and a
/// password of at least 8 characters.
pub fn validate_new_user(user: &NewUser) -> Result<()> {
    if user.name.trim().is_empty() {
        bail!("name must not be empty");
    }
    validate_email(&user.email)?;
    if user.password.len() < 8 {
        bail!("password must be at least 8 characters");
    }
    Ok(())
}

/// Minimal shape check: one '@' with something on both sides and a dot in
/// the domain. Real validation happens when mail bounces.
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        bail!("Invalid email address '{email}'");
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.ends_with('.') {
        bail!("Invalid email address '{email}'");
    }
    Ok(())
}

/// Validate a partial consumption update: at least one field, and a
/// positive quantity when one is given.
pub fn validate_update_consumption(update: &UpdateConsumption) -> Result<()> {
    if update.quantity_ml.is_none() && update.drink_type.is_none() {
        bail!("At least one field must be provided");
    }
    if let Some(q) = update.quantity_ml {
        validate_quantity_ml(q)?;
    }
    Ok(())
}

/// Validate a partial profile update: at least one field, positive goal,
/// non-empty name when given.
pub fn validate_update_profile(update: &UpdateProfile) -> Result<()> {
    if update.name.is_none()
        && update.age.is_none()
        && update.weight_kg.is_none()
        && update.daily_goal_liters.is_none()
    {
        bail!("At least one field must be provided");
    }
    if let Some(ref name) = update.name {
        if name.trim().is_empty() {
            bail!("name must not be empty");
        }
    }
    if let Some(age) = update.age {
        if !(0..=150).contains(&age) {
            bail!("age must be between 0 and 150");
        }
    }
    if let Some(w) = update.weight_kg {
        if !w.is_finite() || w <= 0.0 {
            bail!("weight_kg must be greater than 0");
        }
    }
    if let Some(goal) = update.daily_goal_liters {
        validate_goal_liters(goal)?;
    }
    Ok(())
}
