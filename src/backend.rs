//! Minimal REST client for the hosted backend (PostgREST-style `/rest/v1/<table>`).
//!
//! We only issue filtered selects and one insert. List selects are ordered by `id`
//! and paged with `limit`/`offset` so a server-side row cap never truncates the
//! catalog. Calls are instrumented and log table names, row counts and latencies
//! (never keys or tokens).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use crate::config::BackendCfg;
use crate::domain::{
  Badge, GamificationData, LearningPath, NewUserBadge, Question, Topic, UserBadge, UserProgress,
};
use crate::store::{DataStore, StoreError, StoreResult};
use crate::util::trunc_for_log;

#[derive(Clone)]
pub struct RestStore {
  pub client: reqwest::Client,
  pub base_url: String,
  api_key: String,
  /// Bearer sent with each request; the user's access token when a session carries one.
  bearer: String,
  page_size: usize,
}

impl RestStore {
  /// Construct the client if a backend URL is configured; otherwise return None.
  pub fn from_config(cfg: &BackendCfg) -> Option<Self> {
    let base_url = cfg.url.clone()?.trim_end_matches('/').to_string();
    let api_key = cfg.api_key.clone().unwrap_or_default();

    let client = match reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()
    {
      Ok(c) => c,
      Err(e) => {
        error!(target: "dashboard", error = %e, "Failed to build HTTP client for backend");
        return None;
      }
    };

    Some(Self { client, base_url, bearer: api_key.clone(), api_key, page_size: cfg.page_size.max(1) })
  }

  /// Same client, but requests run as the session's user.
  pub fn with_access_token(&self, token: &str) -> Self {
    Self { bearer: token.to_string(), ..self.clone() }
  }

  fn table_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{}", self.base_url, table)
  }

  /// GET `/rest/v1/<table>?select=...&<filters>` decoded as a Vec of rows.
  #[instrument(level = "debug", skip(self, filters), fields(%table))]
  async fn select<T: DeserializeOwned>(
    &self,
    table: &str,
    select: &str,
    filters: &[(&str, String)],
  ) -> StoreResult<Vec<T>> {
    if self.base_url.is_empty() {
      return Err(StoreError::NotConfigured("empty backend url".into()));
    }
    let mut query: Vec<(&str, String)> = vec![("select", select.to_string())];
    query.extend(filters.iter().cloned());

    let start = std::time::Instant::now();
    let res = self.client.get(self.table_url(table))
      .header(USER_AGENT, "codeprep-dashboard/0.1")
      .header(ACCEPT, "application/json")
      .header("apikey", &self.api_key)
      .header(AUTHORIZATION, format!("Bearer {}", self.bearer))
      .query(&query)
      .send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      return Err(StoreError::Http { status, body: trunc_for_log(&body, 300) });
    }

    let body = res.text().await?;
    let rows = serde_json::from_str::<Vec<T>>(&body)
      .map_err(|e| StoreError::Decode(format!("{}: {}", table, e)))?;
    debug!(target: "dashboard", %table, rows = rows.len(), elapsed = ?start.elapsed(), "Backend select");
    Ok(rows)
  }

  /// Every matching row, in `id` order, fetched one page at a time.
  /// Stops at the first page shorter than `page_size`.
  async fn select_all<T: DeserializeOwned>(
    &self,
    table: &str,
    select: &str,
    filters: &[(&str, String)],
  ) -> StoreResult<Vec<T>> {
    let mut rows: Vec<T> = Vec::new();
    let mut pages = 0usize;
    loop {
      let mut query = filters.to_vec();
      query.push(("order", "id.asc".to_string()));
      query.push(("limit", self.page_size.to_string()));
      query.push(("offset", rows.len().to_string()));
      let page: Vec<T> = self.select(table, select, &query).await?;
      pages += 1;
      let full = page.len() >= self.page_size;
      rows.extend(page);
      if !full {
        break;
      }
    }
    if pages > 1 {
      debug!(target: "dashboard", %table, rows = rows.len(), pages, "Paged select");
    }
    Ok(rows)
  }
}

/// Error for a failed insert: a duplicate row (409) is a `Conflict`, anything else is `Http`.
fn insert_error(status: StatusCode, body: &str) -> StoreError {
  let body = trunc_for_log(body, 300);
  if status == StatusCode::CONFLICT {
    StoreError::Conflict(body)
  } else {
    StoreError::Http { status: status.as_u16(), body }
  }
}

fn eq(v: &str) -> String {
  format!("eq.{}", v)
}

#[async_trait]
impl DataStore for RestStore {
  async fn list_learning_paths(&self) -> StoreResult<Vec<LearningPath>> {
    self.select_all("learning_paths", "*", &[]).await
  }

  async fn list_topics(&self) -> StoreResult<Vec<Topic>> {
    self.select_all("topics", "*", &[]).await
  }

  async fn list_topics_by_path(&self, path_id: &str) -> StoreResult<Vec<Topic>> {
    self.select_all("topics", "*", &[("learning_path_id", eq(path_id))]).await
  }

  async fn list_questions(&self) -> StoreResult<Vec<Question>> {
    self.select_all("questions", "*", &[]).await
  }

  async fn list_questions_by_topic(&self, topic_id: &str) -> StoreResult<Vec<Question>> {
    self.select_all("questions", "*", &[("topic_id", eq(topic_id))]).await
  }

  async fn list_user_progress(&self, user_id: &str) -> StoreResult<Vec<UserProgress>> {
    self.select_all("user_progress", "*", &[("user_id", eq(user_id))]).await
  }

  async fn list_badges(&self) -> StoreResult<Vec<Badge>> {
    self.select_all("badges", "*", &[]).await
  }

  async fn list_user_badges(&self, user_id: &str) -> StoreResult<Vec<UserBadge>> {
    self.select_all("user_badges", "*,badges(*)", &[("user_id", eq(user_id))]).await
  }

  #[instrument(level = "info", skip(self), fields(user_id = %row.user_id, badge_id = %row.badge_id))]
  async fn insert_user_badge(&self, row: &NewUserBadge) -> StoreResult<UserBadge> {
    let res = self.client.post(self.table_url("user_badges"))
      .header(USER_AGENT, "codeprep-dashboard/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header("apikey", &self.api_key)
      .header(AUTHORIZATION, format!("Bearer {}", self.bearer))
      .header("Prefer", "return=representation")
      .json(&[row])
      .send().await?;

    let status = res.status();
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      return Err(insert_error(status, &body));
    }

    let mut rows: Vec<UserBadge> = res.json().await?;
    rows.pop().ok_or_else(|| StoreError::Decode("insert returned no rows".into()))
  }

  async fn get_gamification(&self, user_id: &str) -> StoreResult<Option<GamificationData>> {
    let mut rows: Vec<GamificationData> = self
      .select("gamification_data", "*", &[("user_id", eq(user_id)), ("limit", "1".to_string())])
      .await?;
    Ok(rows.pop())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::extract::Query;
  use axum::routing::{get, post};
  use axum::{Json, Router};
  use serde_json::{json, Value};
  use std::collections::HashMap;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  fn cfg(url: Option<&str>) -> BackendCfg {
    BackendCfg { url: url.map(str::to_string), api_key: Some("anon".into()), timeout_secs: 5, page_size: 1000 }
  }

  /// Local stand-in for the hosted backend: `questions` honours limit/offset but
  /// never returns more than `cap` rows; `user_badges` inserts always hit a 409.
  async fn stub_backend(rows: usize, cap: usize, calls: Arc<AtomicUsize>) -> String {
    let questions: Arc<Vec<Value>> = Arc::new(
      (0..rows)
        .map(|i| json!({ "id": format!("q{:03}", i), "title": "t", "topic_id": "t1", "difficulty": "easy" }))
        .collect(),
    );
    let list = move |Query(q): Query<HashMap<String, String>>| {
      let questions = questions.clone();
      let calls = calls.clone();
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        if q.get("order").map(String::as_str) != Some("id.asc") {
          return Json(Vec::<Value>::new());
        }
        let offset = q.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
        let limit = q.get("limit").and_then(|v| v.parse::<usize>().ok()).unwrap_or(usize::MAX).min(cap);
        Json(questions.iter().skip(offset).take(limit).cloned().collect::<Vec<_>>())
      }
    };
    let app = Router::new()
      .route("/rest/v1/questions", get(list))
      .route("/rest/v1/user_badges", post(|| async { (axum::http::StatusCode::CONFLICT, "duplicate key value violates unique constraint") }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
  }

  fn paged_store(url: &str, page_size: usize) -> RestStore {
    RestStore::from_config(&BackendCfg { page_size, ..cfg(Some(url)) }).unwrap()
  }

  #[test]
  fn no_url_means_no_rest_store() {
    assert!(RestStore::from_config(&cfg(None)).is_none());
  }

  #[test]
  fn table_urls_drop_trailing_slash() {
    let store = RestStore::from_config(&cfg(Some("https://db.example.co/"))).unwrap();
    assert_eq!(store.table_url("topics"), "https://db.example.co/rest/v1/topics");
  }

  #[test]
  fn access_token_replaces_bearer_but_keeps_key() {
    let store = RestStore::from_config(&cfg(Some("https://db.example.co"))).unwrap();
    assert_eq!(store.bearer, "anon");
    let scoped = store.with_access_token("user-jwt");
    assert_eq!(scoped.bearer, "user-jwt");
    assert_eq!(scoped.api_key, "anon");
  }

  #[tokio::test]
  async fn empty_url_is_not_configured() {
    let store = RestStore::from_config(&cfg(Some("/"))).unwrap();
    let err = store.list_topics().await.unwrap_err();
    assert!(matches!(err, StoreError::NotConfigured(_)));
  }

  #[tokio::test]
  async fn unreachable_backend_is_a_transport_error() {
    let store = RestStore::from_config(&cfg(Some("http://127.0.0.1:9"))).unwrap();
    let err = store.list_learning_paths().await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
  }
  #[tokio::test]
  async fn bulk_selects_page_past_the_server_cap() {
    let calls = Arc::new(AtomicUsize::new(0));
    let url = stub_backend(25, 10, calls.clone()).await;
    let questions = paged_store(&url, 10).list_questions().await.unwrap();
    assert_eq!(questions.len(), 25);
    assert_eq!(questions.first().map(|q| q.id.as_str()), Some("q000"));
    assert_eq!(questions.last().map(|q| q.id.as_str()), Some("q024"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn exact_multiple_of_page_size_costs_one_empty_page() {
    let calls = Arc::new(AtomicUsize::new(0));
    let url = stub_backend(20, 10, calls.clone()).await;
    let questions = paged_store(&url, 10).list_questions().await.unwrap();
    assert_eq!(questions.len(), 20);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn duplicate_insert_maps_to_conflict() {
    let url = stub_backend(0, 10, Arc::new(AtomicUsize::new(0))).await;
    let row = NewUserBadge { user_id: "u1".into(), badge_id: "b1".into() };
    let err = paged_store(&url, 10).insert_user_badge(&row).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(ref m) if m.contains("duplicate key")));
  }

  #[test]
  fn insert_errors_split_conflicts_from_other_failures() {
    assert!(matches!(insert_error(StatusCode::CONFLICT, "dup"), StoreError::Conflict(_)));
    assert!(matches!(
      insert_error(StatusCode::FORBIDDEN, "rls"),
      StoreError::Http { status: 403, .. }
    ));
  }
}
