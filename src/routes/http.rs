//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler builds the caller's session, picks a store, and logs basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::HeaderMap, Json, response::IntoResponse};
use tracing::{error, info, instrument};

use crate::badges::BadgeRules;
use crate::domain::GamificationData;
use crate::levels::GamificationSummary;
use crate::progress::ProgressAggregator;
use crate::protocol::*;
use crate::session::SessionContext;
use crate::state::{AppState, Backend};

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let backend = match state.backend {
    Backend::Rest(_) => "rest",
    Backend::Memory(_) => "memory",
  };
  Json(HealthOut { ok: true, backend })
}

#[instrument(level = "info", skip(state))]
pub async fn http_levels(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.levels.clone())
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_dashboard(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  headers: HeaderMap,
) -> impl IntoResponse {
  let session = SessionContext::from_request(&user_id, &headers);
  let store = state.store_for(&session);
  let summary = ProgressAggregator::new(store.as_ref()).dashboard(&session.user_id).await;
  Json(summary)
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_progress_by_path(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  headers: HeaderMap,
) -> impl IntoResponse {
  let session = SessionContext::from_request(&user_id, &headers);
  let store = state.store_for(&session);
  let paths = ProgressAggregator::new(store.as_ref()).progress_by_path(&session.user_id).await;
  info!(target: "progress", user_id = %session.user_id, paths = paths.len(), "HTTP path progress served");
  Json(PathProgressOut { user_id: session.user_id, paths })
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_progress_by_difficulty(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  headers: HeaderMap,
) -> impl IntoResponse {
  let session = SessionContext::from_request(&user_id, &headers);
  let store = state.store_for(&session);
  let difficulty = ProgressAggregator::new(store.as_ref()).progress_by_difficulty(&session.user_id).await;
  Json(DifficultyOut { user_id: session.user_id, difficulty })
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_completed_topics(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  headers: HeaderMap,
) -> impl IntoResponse {
  let session = SessionContext::from_request(&user_id, &headers);
  let store = state.store_for(&session);
  let topics = ProgressAggregator::new(store.as_ref()).completed_topic_names(&session.user_id).await;
  info!(target: "progress", user_id = %session.user_id, completed = topics.len(), "HTTP completed topics served");
  Json(CompletedTopicsOut { user_id: session.user_id, topics })
}

/// `tier` is a path difficulty, or `all` for every tier at once.
#[instrument(level = "info", skip(state, headers))]
pub async fn http_tier_completed(
  State(state): State<Arc<AppState>>,
  Path((user_id, tier)): Path<(String, String)>,
  headers: HeaderMap,
) -> impl IntoResponse {
  let session = SessionContext::from_request(&user_id, &headers);
  let store = state.store_for(&session);
  let rules = BadgeRules::new(store.as_ref(), state.policy.clone());
  let completed = if tier == "all" {
    rules.all_tiers_completed(&session.user_id).await
  } else {
    rules.tier_completed(&session.user_id, &tier).await
  };
  Json(TierOut { user_id: session.user_id, tier, completed })
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_user_badges(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  headers: HeaderMap,
) -> impl IntoResponse {
  let session = SessionContext::from_request(&user_id, &headers);
  let store = state.store_for(&session);
  let badges = BadgeRules::new(store.as_ref(), state.policy.clone()).user_badges(&session.user_id).await;
  Json(BadgesOut { user_id: session.user_id, badges })
}

/// Evaluated on demand (e.g. on profile view); there is no background job.
#[instrument(level = "info", skip(state, headers))]
pub async fn http_award_badges(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  headers: HeaderMap,
) -> impl IntoResponse {
  let session = SessionContext::from_request(&user_id, &headers);
  let store = state.store_for(&session);
  let report = BadgeRules::new(store.as_ref(), state.policy.clone()).award_eligible_badges(&session.user_id).await;
  info!(target: "badges", user_id = %session.user_id, awarded = report.awarded.len(), held = report.already_held.len(), failed = report.failed.len(), "HTTP award pass finished");
  Json(report)
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_gamification(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  headers: HeaderMap,
) -> impl IntoResponse {
  let session = SessionContext::from_request(&user_id, &headers);
  let store = state.store_for(&session);
  let data = match store.get_gamification(&session.user_id).await {
    Ok(Some(d)) => d,
    Ok(None) => GamificationData { user_id: session.user_id.clone(), current_level: 1, ..Default::default() },
    Err(e) => {
      error!(target: "dashboard", user_id = %session.user_id, error = %e, "Gamification fetch failed; showing zero coins");
      GamificationData { user_id: session.user_id.clone(), current_level: 1, ..Default::default() }
    }
  };
  Json(GamificationSummary::derive(&data, &state.levels))
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{body::{to_bytes, Body}, http::{Method, Request, StatusCode}};
  use serde_json::Value;
  use tower::ServiceExt;

  use crate::config::BadgePolicy;
  use crate::levels::default_levels;
  use crate::routes::build_router;
  use crate::seeds::seeded_memory_store;

  async fn app() -> axum::Router {
    let state = AppState::with_memory_store(seeded_memory_store().await, BadgePolicy::default(), default_levels());
    build_router(Arc::new(state))
  }

  async fn call(app: axum::Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn health_reports_memory_backend() {
    let (status, body) = call(app().await, Method::GET, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "memory");
  }

  #[tokio::test]
  async fn dashboard_for_demo_user() {
    let (status, body) = call(app().await, Method::GET, "/api/v1/users/demo/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed_topics"], serde_json::json!(["Arrays", "Strings"]));
    assert_eq!(body["paths"][0]["percentage"], 100);
    assert_eq!(body["paths"][1]["percentage"], 33);
    assert_eq!(body["difficulty"]["theory"]["total"], 2);
    assert_eq!(body["difficulty"]["theory"]["completed"], 1);
  }

  #[tokio::test]
  async fn award_endpoint_is_idempotent() {
    let app = app().await;
    let (_, first) = call(app.clone(), Method::POST, "/api/v1/users/demo/badges/award").await;
    assert_eq!(first["awarded"][0]["tier"], "bronze");
    let (_, second) = call(app.clone(), Method::POST, "/api/v1/users/demo/badges/award").await;
    assert_eq!(second["awarded"], serde_json::json!([]));
    assert_eq!(second["already_held"], serde_json::json!(["bronze"]));
    let (_, held) = call(app, Method::GET, "/api/v1/users/demo/badges").await;
    assert_eq!(held["badges"][0]["badge"]["name"], "Bronze Coder");
  }

  #[tokio::test]
  async fn blank_user_award_is_a_no_op() {
    let (status, body) = call(app().await, Method::POST, "/api/v1/users/%20/badges/award").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["awarded"], serde_json::json!([]));
    assert_eq!(body["failed"], serde_json::json!([]));
  }

  #[tokio::test]
  async fn gamification_for_known_and_unknown_users() {
    let (_, demo) = call(app().await, Method::GET, "/api/v1/users/demo/gamification").await;
    assert_eq!(demo["level"], 2);
    assert_eq!(demo["progress_percent"], 50);
    let (_, nobody) = call(app().await, Method::GET, "/api/v1/users/nobody/gamification").await;
    assert_eq!(nobody["total_coins"], 0);
    assert_eq!(nobody["level_name"], "Newbie");
  }

  #[tokio::test]
  async fn tier_endpoint_checks_single_and_all_tiers() {
    let (_, easy) = call(app().await, Method::GET, "/api/v1/users/demo/tiers/easy").await;
    assert_eq!(easy["completed"], true);
    let (_, hard) = call(app().await, Method::GET, "/api/v1/users/demo/tiers/hard").await;
    assert_eq!(hard["completed"], false);
    let (_, all) = call(app().await, Method::GET, "/api/v1/users/demo/tiers/all").await;
    assert_eq!(all["completed"], false);
    let (_, none) = call(app().await, Method::GET, "/api/v1/users/demo/tiers/legendary").await;
    assert_eq!(none["completed"], false);
  }

  #[tokio::test]
  async fn unknown_user_gets_zeroed_progress() {
    let (status, body) = call(app().await, Method::GET, "/api/v1/users/ghost/progress/paths").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].as_array().unwrap().iter().all(|p| p["percentage"] == 0));
  }
}
