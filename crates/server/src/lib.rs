// crates/server/src/lib.rs
//! HTTP server: Axum routes over the plan store and the background job
//! system. Long-running work never blocks a request; handlers create a
//! job row, spawn a worker, and answer 202 with the job id.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod jobs;
pub mod routes;
pub mod share;
pub mod state;

use state::AppState;

/// Build the application router.
///
/// `/api/*` is the JSON API; `/shared/*` serves the rendered share
/// documents straight from disk.
pub fn create_app(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(routes::health::router())
        .merge(routes::plans::router())
        .merge(routes::jobs::router());

    Router::new()
        .nest("/api", api)
        .nest_service("/shared", ServeDir::new(&state.share_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use mealweek_core::{JobOutcome, JobStatus};
    use super::test_support::{get_json, post_json, test_state_with_provider, wait_for_terminal};
    use tower::ServiceExt;

    fn week_json() -> serde_json::Value {
        let recipes: Vec<serde_json::Value> = (0..7)
            .map(|day| {
                serde_json::json!({
                    "dayOfWeek": day,
                    "title": format!("Dish {day}"),
                    "category": "dinner",
                    "ingredients": ["400g lentils"],
                    "instructions": ["Cook"],
                    "calories": 600
                })
            })
            .collect();
        serde_json::json!({ "name": "Test week", "recipes": recipes })
    }

    #[tokio::test]
    async fn test_unknown_route_404() {
        let (state, _tmp) = test_state_with_provider(serde_json::json!({})).await;
        let app = create_app(state);

        let (status, _body) = get_json(app, "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_preflight_allowed() {
        let (state, _tmp) = test_state_with_provider(serde_json::json!({})).await;
        let app = create_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/health")
                    .header("origin", "http://localhost:5173")
                    .header("access-control-request-method", "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    // Full flow: start generation, poll to completion, fetch the plan.
    #[tokio::test]
    async fn test_generate_poll_fetch_flow() {
        let (state, _tmp) = test_state_with_provider(week_json()).await;
        let app = create_app(state.clone());

        let request = serde_json::json!({
            "settings": { "persons": 2, "caloriesPerDay": 2000 },
            "previousRecipeTitles": ["Old stew"]
        });
        let (status, body) = post_json(app.clone(), "/api/plans/generate", request).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let job_id = body["jobId"].as_str().unwrap().to_string();

        let row = wait_for_terminal(&state, &job_id).await;
        assert_eq!(row.status(), Some(JobStatus::Complete));

        // The status endpoint now reports the result.
        let (status, body) = get_json(app.clone(), &format!("/api/jobs/{job_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "complete");
        let plan_id = body["result"]["planId"].as_str().unwrap().to_string();

        let (status, body) = get_json(app, &format!("/api/plans/{plan_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Test week");
        assert_eq!(body["recipes"].as_array().unwrap().len(), 7);
    }

    // Full flow: share an existing plan, then fetch the document over
    // the static `/shared` mount.
    #[tokio::test]
    async fn test_share_flow_serves_document() {
        let (state, _tmp) = test_state_with_provider(week_json()).await;
        let plan_id = state
            .db
            .save_plan("Week", "{}", &test_support::week_recipes())
            .await
            .unwrap();
        let app = create_app(state.clone());

        let (status, body) = post_json(
            app.clone(),
            &format!("/api/plans/{plan_id}/share"),
            serde_json::json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let job_id = body["jobId"].as_str().unwrap().to_string();

        let row = wait_for_terminal(&state, &job_id).await;
        assert_eq!(row.status(), Some(JobStatus::Complete));
        let share_url = match row.outcome().unwrap() {
            JobOutcome::SharePreparation { share_url } => share_url,
            other => panic!("wrong outcome: {other:?}"),
        };

        let response = app
            .oneshot(
                Request::builder()
                    .uri(&share_url)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<h1>Week</h1>"));
    }

    // A generation that fails validation settles as a job error and
    // leaves no plan behind.
    #[tokio::test]
    async fn test_invalid_generation_reports_error() {
        let mut content = week_json();
        content["recipes"][0]["ingredients"] = serde_json::json!([]);
        let (state, _tmp) = test_state_with_provider(content).await;
        let app = create_app(state.clone());

        let request = serde_json::json!({
            "settings": { "persons": 2, "caloriesPerDay": 2000 }
        });
        let (status, body) = post_json(app.clone(), "/api/plans/generate", request).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let job_id = body["jobId"].as_str().unwrap().to_string();

        let row = wait_for_terminal(&state, &job_id).await;
        assert_eq!(row.status(), Some(JobStatus::Error));

        let (status, body) = get_json(app, &format!("/api/jobs/{job_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("validation"));
        assert_eq!(state.db.count_plans().await.unwrap(), 0);
    }
}
