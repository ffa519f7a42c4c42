// crates/core/src/prompt.rs
//! Prompt and schema construction for plan generation.

use crate::llm::GenerationRequest;
use crate::plan::PlanSettings;

/// JSON schema the provider output must conform to.
pub fn plan_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "required": ["name", "recipes"],
        "properties": {
            "name": { "type": "string" },
            "recipes": {
                "type": "array",
                "minItems": 7,
                "items": {
                    "type": "object",
                    "required": [
                        "dayOfWeek", "title", "category",
                        "ingredients", "instructions", "calories"
                    ],
                    "properties": {
                        "dayOfWeek": { "type": "integer", "minimum": 0, "maximum": 6 },
                        "title": { "type": "string" },
                        "category": { "type": "string" },
                        "ingredients": { "type": "array", "items": { "type": "string" } },
                        "instructions": { "type": "array", "items": { "type": "string" } },
                        "calories": { "type": "integer", "minimum": 1 }
                    }
                }
            }
        }
    })
}

/// Build the generation request for a week plan.
///
/// `previous_titles` lets the prompt steer away from recently generated
/// recipes so consecutive weeks don't repeat.
pub fn plan_request(settings: &PlanSettings, previous_titles: &[String]) -> GenerationRequest {
    let mut prompt = format!(
        "Create a 7-day dinner plan for {} people at about {} kcal per day per person. \
         One recipe per day (dayOfWeek 0-6), each with a title, category, ingredient \
         list with quantities, step-by-step instructions and a calorie estimate.",
        settings.persons, settings.calories_per_day
    );
    if let Some(diet) = &settings.diet {
        prompt.push_str(&format!(" Diet: {diet}."));
    }
    if !settings.exclusions.is_empty() {
        prompt.push_str(&format!(
            " Do not use these ingredients: {}.",
            settings.exclusions.join(", ")
        ));
    }
    if !previous_titles.is_empty() {
        prompt.push_str(&format!(
            " Avoid repeating these recent recipes: {}.",
            previous_titles.join(", ")
        ));
    }
    GenerationRequest::new(prompt, plan_schema())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PlanSettings {
        PlanSettings {
            persons: 2,
            calories_per_day: 2000,
            diet: Some("vegetarian".to_string()),
            exclusions: vec!["peanuts".to_string()],
        }
    }

    #[test]
    fn test_prompt_mentions_settings() {
        let req = plan_request(&settings(), &["Chili".to_string()]);
        assert!(req.prompt.contains("2 people"));
        assert!(req.prompt.contains("2000 kcal"));
        assert!(req.prompt.contains("vegetarian"));
        assert!(req.prompt.contains("peanuts"));
        assert!(req.prompt.contains("Chili"));
    }

    #[test]
    fn test_prompt_without_optionals() {
        let plain = PlanSettings {
            persons: 4,
            calories_per_day: 1800,
            diet: None,
            exclusions: vec![],
        };
        let req = plan_request(&plain, &[]);
        assert!(!req.prompt.contains("Diet:"));
        assert!(!req.prompt.contains("Avoid repeating"));
    }

    #[test]
    fn test_schema_requires_recipe_fields() {
        let schema = plan_schema();
        let required = &schema["properties"]["recipes"]["items"]["required"];
        for field in ["dayOfWeek", "title", "ingredients", "instructions", "calories"] {
            assert!(
                required.as_array().unwrap().iter().any(|v| v == field),
                "missing {field}"
            );
        }
    }
}
