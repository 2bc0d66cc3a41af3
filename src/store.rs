//! Data collaborator seam: everything the dashboard reads from (or appends to)
//! the hosted backend goes through `DataStore`.
//!
//! Two implementations:
//!   - `RestStore` (see `backend.rs`) talks to the hosted REST backend
//!   - `MemoryStore` keeps rows in memory; used for the demo catalog and tests
//!
//! Every list method returns an empty Vec when no rows match. Errors are
//! reserved for transport/decoding failures and uniqueness conflicts.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{
  Badge, GamificationData, LearningPath, NewUserBadge, Question, Topic, UserBadge, UserProgress,
};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("backend HTTP {status}: {body}")]
  Http { status: u16, body: String },

  #[error("decode error: {0}")]
  Decode(String),

  /// Uniqueness constraint hit at the storage boundary.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store not configured: {0}")]
  NotConfigured(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DataStore: Send + Sync {
  async fn list_learning_paths(&self) -> StoreResult<Vec<LearningPath>>;

  async fn list_topics(&self) -> StoreResult<Vec<Topic>>;

  async fn list_topics_by_path(&self, path_id: &str) -> StoreResult<Vec<Topic>>;

  async fn list_questions(&self) -> StoreResult<Vec<Question>>;

  async fn list_questions_by_topic(&self, topic_id: &str) -> StoreResult<Vec<Question>>;

  async fn list_user_progress(&self, user_id: &str) -> StoreResult<Vec<UserProgress>>;

  /// Static badge catalog.
  async fn list_badges(&self) -> StoreResult<Vec<Badge>>;

  /// Badges held by the user, joined with the catalog row.
  async fn list_user_badges(&self, user_id: &str) -> StoreResult<Vec<UserBadge>>;

  /// Append one badge. Must fail with `StoreError::Conflict` if (user, badge) exists.
  async fn insert_user_badge(&self, row: &NewUserBadge) -> StoreResult<UserBadge>;

  async fn get_gamification(&self, user_id: &str) -> StoreResult<Option<GamificationData>>;
}

/// In-memory rows, insertion-ordered like a freshly queried table.
#[derive(Default)]
pub struct MemoryStore {
  paths: RwLock<Vec<LearningPath>>,
  topics: RwLock<Vec<Topic>>,
  questions: RwLock<Vec<Question>>,
  progress: RwLock<Vec<UserProgress>>,
  badges: RwLock<Vec<Badge>>,
  user_badges: RwLock<Vec<UserBadge>>,
  gamification: RwLock<HashMap<String, GamificationData>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn add_path(&self, p: LearningPath) {
    self.paths.write().await.push(p);
  }

  pub async fn add_topic(&self, t: Topic) {
    self.topics.write().await.push(t);
  }

  pub async fn add_question(&self, q: Question) {
    self.questions.write().await.push(q);
  }

  pub async fn add_badge(&self, b: Badge) {
    self.badges.write().await.push(b);
  }

  pub async fn set_gamification(&self, g: GamificationData) {
    self.gamification.write().await.insert(g.user_id.clone(), g);
  }

  /// Upsert the (user, question) progress row, keeping at most one per pair.
  #[instrument(level = "debug", skip(self))]
  pub async fn set_progress(&self, user_id: &str, question_id: &str, is_completed: bool) {
    let mut rows = self.progress.write().await;
    match rows.iter_mut().find(|r| r.user_id == user_id && r.question_id == question_id) {
      Some(row) => row.is_completed = is_completed,
      None => rows.push(UserProgress {
        user_id: user_id.to_string(),
        question_id: question_id.to_string(),
        is_completed,
        marked_for_revision: false,
      }),
    }
  }

  #[cfg(test)]
  pub async fn user_badge_count(&self, user_id: &str) -> usize {
    self.user_badges.read().await.iter().filter(|b| b.user_id == user_id).count()
  }
}

#[async_trait]
impl DataStore for MemoryStore {
  async fn list_learning_paths(&self) -> StoreResult<Vec<LearningPath>> {
    Ok(self.paths.read().await.clone())
  }

  async fn list_topics(&self) -> StoreResult<Vec<Topic>> {
    Ok(self.topics.read().await.clone())
  }

  async fn list_topics_by_path(&self, path_id: &str) -> StoreResult<Vec<Topic>> {
    let topics = self.topics.read().await;
    Ok(topics.iter().filter(|t| t.learning_path_id == path_id).cloned().collect())
  }

  async fn list_questions(&self) -> StoreResult<Vec<Question>> {
    Ok(self.questions.read().await.clone())
  }

  async fn list_questions_by_topic(&self, topic_id: &str) -> StoreResult<Vec<Question>> {
    let questions = self.questions.read().await;
    Ok(questions.iter().filter(|q| q.topic_id == topic_id).cloned().collect())
  }

  async fn list_user_progress(&self, user_id: &str) -> StoreResult<Vec<UserProgress>> {
    let rows = self.progress.read().await;
    Ok(rows.iter().filter(|r| r.user_id == user_id).cloned().collect())
  }

  async fn list_badges(&self) -> StoreResult<Vec<Badge>> {
    Ok(self.badges.read().await.clone())
  }

  async fn list_user_badges(&self, user_id: &str) -> StoreResult<Vec<UserBadge>> {
    let catalog = self.badges.read().await;
    let held = self.user_badges.read().await;
    Ok(
      held
        .iter()
        .filter(|ub| ub.user_id == user_id)
        .map(|ub| UserBadge {
          badge: catalog.iter().find(|b| b.id == ub.badge_id).cloned(),
          ..ub.clone()
        })
        .collect(),
    )
  }

  #[instrument(level = "debug", skip(self), fields(user_id = %row.user_id, badge_id = %row.badge_id))]
  async fn insert_user_badge(&self, row: &NewUserBadge) -> StoreResult<UserBadge> {
    let mut held = self.user_badges.write().await;
    if held.iter().any(|ub| ub.user_id == row.user_id && ub.badge_id == row.badge_id) {
      return Err(StoreError::Conflict(format!("user {} already holds badge {}", row.user_id, row.badge_id)));
    }
    let ub = UserBadge {
      id: Uuid::new_v4().to_string(),
      user_id: row.user_id.clone(),
      badge_id: row.badge_id.clone(),
      earned_at: Utc::now(),
      badge: None,
    };
    held.push(ub.clone());
    debug!(target: "dashboard", id = %ub.id, "Inserted user badge (memory)");
    Ok(ub)
  }

  async fn get_gamification(&self, user_id: &str) -> StoreResult<Option<GamificationData>> {
    Ok(self.gamification.read().await.get(user_id).cloned())
  }
}
