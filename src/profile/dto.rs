use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::repo::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Very,
    Extreme,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Very => "very",
            ActivityLevel::Extreme => "extreme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Lose => "lose",
            Goal::Maintain => "maintain",
            Goal::Gain => "gain",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub age: i32,
    pub gender: Gender,
    /// Centimeters.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
    #[serde(default)]
    pub goal_weight: Option<f64>,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub user_id: Uuid,
    pub bmr: i32,
    pub tdee: i32,
    pub target_calories: i32,
    pub protein_target: i32,
    pub carbs_target: i32,
    pub fat_target: i32,
}

#[derive(Debug, Serialize)]
pub struct OnboardingStatus {
    pub completed_onboarding: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}
