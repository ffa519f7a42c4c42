// crates/core/src/plan.rs
//! Meal-plan domain types and structural validation of generated plans.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-supplied settings for a plan-generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanSettings {
    /// Number of people the recipes should serve.
    pub persons: u32,
    /// Daily calorie target per person.
    pub calories_per_day: u32,
    /// Free-form diet description (e.g. "vegetarian", "low-carb").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,
    /// Ingredients to avoid.
    #[serde(default)]
    pub exclusions: Vec<String>,
}

impl PlanSettings {
    /// Check the request is plausible before creating a job for it.
    pub fn validate(&self) -> Result<(), PlanValidationError> {
        if self.persons == 0 {
            return Err(PlanValidationError::InvalidSettings(
                "persons must be at least 1".into(),
            ));
        }
        if self.calories_per_day == 0 {
            return Err(PlanValidationError::InvalidSettings(
                "caloriesPerDay must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// A full week plan as returned by the generation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPlan {
    pub name: String,
    pub recipes: Vec<GeneratedRecipe>,
}

/// One recipe inside a generated plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecipe {
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u8,
    pub title: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub calories: u32,
}

/// Structural problems in provider output, raised before any persistence.
#[derive(Debug, Error, PartialEq)]
pub enum PlanValidationError {
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("generated plan has no recipes")]
    EmptyPlan,

    #[error("recipe {index}: missing {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("recipe {index}: day_of_week {day} out of range 0..=6")]
    DayOutOfRange { index: usize, day: u8 },

    #[error("recipe {index}: calories must be positive")]
    NonPositiveCalories { index: usize },
}

impl GeneratedPlan {
    /// Validate the structural contract of a generated plan.
    ///
    /// The provider's JSON may parse and still be unusable (empty titles,
    /// no ingredients). Persisting such a plan would make it visible to
    /// the UI, so this runs before any database write.
    pub fn validate(&self) -> Result<(), PlanValidationError> {
        if self.recipes.is_empty() {
            return Err(PlanValidationError::EmptyPlan);
        }
        for (index, recipe) in self.recipes.iter().enumerate() {
            if recipe.title.trim().is_empty() {
                return Err(PlanValidationError::MissingField { index, field: "title" });
            }
            if recipe.category.trim().is_empty() {
                return Err(PlanValidationError::MissingField { index, field: "category" });
            }
            if recipe.ingredients.is_empty() {
                return Err(PlanValidationError::MissingField { index, field: "ingredients" });
            }
            if recipe.instructions.is_empty() {
                return Err(PlanValidationError::MissingField { index, field: "instructions" });
            }
            if recipe.day_of_week > 6 {
                return Err(PlanValidationError::DayOutOfRange {
                    index,
                    day: recipe.day_of_week,
                });
            }
            if recipe.calories == 0 {
                return Err(PlanValidationError::NonPositiveCalories { index });
            }
        }
        Ok(())
    }
}
