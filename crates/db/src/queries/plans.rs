// crates/db/src/queries/plans.rs
// Plan and recipe persistence. Only what the job system needs: a
// transactional save, fetch-by-id, share-id assignment, delete.

use crate::{Database, DbError, DbResult};
use chrono::Utc;
use mealweek_core::GeneratedRecipe;
use serde::Serialize;

/// One row of the recipes table, with JSON columns decoded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRow {
    pub id: String,
    pub day_of_week: i64,
    pub title: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub calories: i64,
}

/// A plan together with its recipes, ordered by day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanWithRecipes {
    pub id: String,
    pub name: String,
    pub share_id: Option<String>,
    pub created_at: String,
    pub recipes: Vec<RecipeRow>,
}

impl Database {
    /// Persist a plan and all its recipes in one transaction.
    ///
    /// All-or-nothing: a failed insert rolls the whole plan back so a
    /// partially-written plan is never visible to readers.
    pub async fn save_plan(
        &self,
        name: &str,
        settings_json: &str,
        recipes: &[GeneratedRecipe],
    ) -> DbResult<String> {
        let plan_id = uuid::Uuid::new_v4().to_string();
        let recipe_ids: Vec<String> = recipes
            .iter()
            .map(|_| uuid::Uuid::new_v4().to_string())
            .collect();
        self.save_plan_with_ids(&plan_id, name, settings_json, recipes, &recipe_ids)
            .await?;
        Ok(plan_id)
    }

    /// Inner save with caller-provided ids; split out so the rollback
    /// behavior is testable by forcing a constraint violation.
    pub(crate) async fn save_plan_with_ids(
        &self,
        plan_id: &str,
        name: &str,
        settings_json: &str,
        recipes: &[GeneratedRecipe],
        recipe_ids: &[String],
    ) -> DbResult<()> {
        // zip would silently drop trailing recipes on a mismatch,
        // persisting a truncated plan.
        assert_eq!(
            recipes.len(),
            recipe_ids.len(),
            "one id per recipe required"
        );

        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "INSERT INTO plans (id, name, settings_json, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(plan_id)
        .bind(name)
        .bind(settings_json)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        for (recipe, recipe_id) in recipes.iter().zip(recipe_ids) {
            let ingredients = serde_json::to_string(&recipe.ingredients)
                .map_err(|e| DbError::Sqlx(sqlx::Error::Decode(e.into())))?;
            let instructions = serde_json::to_string(&recipe.instructions)
                .map_err(|e| DbError::Sqlx(sqlx::Error::Decode(e.into())))?;
            sqlx::query(
                r#"
                INSERT INTO recipes
                    (id, plan_id, day_of_week, title, category,
                     ingredients_json, instructions_json, calories)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(recipe_id)
            .bind(plan_id)
            .bind(recipe.day_of_week as i64)
            .bind(&recipe.title)
            .bind(&recipe.category)
            .bind(&ingredients)
            .bind(&instructions)
            .bind(recipe.calories as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Load a plan with all its recipes, ordered by day of week.
    pub async fn get_plan_with_recipes(&self, plan_id: &str) -> DbResult<PlanWithRecipes> {
        let plan: Option<(String, String, Option<String>, String)> = sqlx::query_as(
            "SELECT id, name, share_id, created_at FROM plans WHERE id = ?1",
        )
        .bind(plan_id)
        .fetch_optional(self.pool())
        .await?;

        let (id, name, share_id, created_at) = plan.ok_or_else(|| DbError::NotFound {
            entity: "plan",
            id: plan_id.to_string(),
        })?;

        let rows: Vec<(String, i64, String, String, String, String, i64)> = sqlx::query_as(
            r#"
            SELECT id, day_of_week, title, category, ingredients_json, instructions_json, calories
            FROM recipes WHERE plan_id = ?1 ORDER BY day_of_week
            "#,
        )
        .bind(plan_id)
        .fetch_all(self.pool())
        .await?;

        let recipes = rows
            .into_iter()
            .map(|(id, day_of_week, title, category, ingredients, instructions, calories)| {
                RecipeRow {
                    id,
                    day_of_week,
                    title,
                    category,
                    ingredients: serde_json::from_str(&ingredients).unwrap_or_default(),
                    instructions: serde_json::from_str(&instructions).unwrap_or_default(),
                    calories,
                }
            })
            .collect();

        Ok(PlanWithRecipes {
            id,
            name,
            share_id,
            created_at,
            recipes,
        })
    }

    /// Check whether a plan exists without loading its recipes.
    pub async fn plan_exists(&self, plan_id: &str) -> DbResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM plans WHERE id = ?1")
            .bind(plan_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.is_some())
    }

    /// Assign the public share identifier to a plan.
    pub async fn set_plan_share_id(&self, plan_id: &str, share_id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE plans SET share_id = ?2 WHERE id = ?1")
            .bind(plan_id)
            .bind(share_id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "plan",
                id: plan_id.to_string(),
            });
        }
        Ok(())
    }

    /// Delete a plan; recipes and related jobs go with it via cascade.
    pub async fn delete_plan(&self, plan_id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM plans WHERE id = ?1")
            .bind(plan_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Count how many plan rows exist (test support for the
    /// no-partial-plan guarantee).
    pub async fn count_plans(&self) -> DbResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM plans")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }
}

#[cfg(test)]
pub(crate) fn test_recipe(day: u8) -> GeneratedRecipe {
    GeneratedRecipe {
        day_of_week: day,
        title: format!("Dish {day}"),
        category: "dinner".to_string(),
        ingredients: vec!["400g lentils".to_string()],
        instructions: vec!["Cook".to_string()],
        calories: 600,
    }
}
