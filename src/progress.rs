//! Progress aggregation: completed topics, per-path percentages and
//! per-difficulty counts for one user.
//!
//! The pure functions take a `Catalog` and a `Completion`; the async wrappers
//! fetch both and degrade to empty results when the backend fails.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, instrument};

use crate::catalog::{Catalog, Completion};
use crate::domain::{Difficulty, LearningPath};
use crate::store::DataStore;
use crate::util::percent;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PathProgress {
  pub path: LearningPath,
  pub percentage: u8,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Default)]
pub struct Tally {
  pub total: usize,
  pub completed: usize,
}

/// Always holds all four buckets, zeroed when nothing matched.
pub type DifficultyBreakdown = BTreeMap<Difficulty, Tally>;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DashboardSummary {
  pub user_id: String,
  pub completed_topics: Vec<String>,
  pub paths: Vec<PathProgress>,
  pub difficulty: DifficultyBreakdown,
}

pub fn completed_topic_names(catalog: &Catalog, done: &Completion) -> Vec<String> {
  catalog
    .topics
    .iter()
    .filter(|t| catalog.topic_completed(&t.id, done))
    .map(|t| t.name.clone())
    .collect()
}

pub fn progress_by_path(catalog: &Catalog, done: &Completion) -> Vec<PathProgress> {
  catalog
    .paths
    .iter()
    .map(|p| {
      let (mut total, mut completed) = (0usize, 0usize);
      for t in catalog.topics_of(&p.id) {
        for q in catalog.questions_of(&t.id) {
          total += 1;
          if done.contains(&q.id) {
            completed += 1;
          }
        }
      }
      PathProgress { path: p.clone(), percentage: percent(completed, total) }
    })
    .collect()
}

pub fn progress_by_difficulty(catalog: &Catalog, done: &Completion) -> DifficultyBreakdown {
  let mut out: DifficultyBreakdown = Difficulty::ALL.iter().map(|d| (*d, Tally::default())).collect();
  for q in &catalog.questions {
    // Tags outside the closed set are dropped.
    let Some(d) = Difficulty::parse(&q.difficulty) else { continue };
    let tally = out.entry(d).or_default();
    tally.total += 1;
    if done.contains(&q.id) {
      tally.completed += 1;
    }
  }
  out
}

/// Store-backed aggregator. Never fails: fetch errors read as empty data.
pub struct ProgressAggregator<'a> {
  store: &'a dyn DataStore,
}

impl<'a> ProgressAggregator<'a> {
  pub fn new(store: &'a dyn DataStore) -> Self {
    Self { store }
  }

  async fn load(&self, user_id: &str) -> (Catalog, Completion) {
    let catalog = Catalog::fetch_or_empty(self.store).await;
    let done = Completion::fetch_or_empty(self.store, user_id).await;
    (catalog, done)
  }

  #[instrument(level = "info", skip(self), fields(%user_id))]
  pub async fn completed_topic_names(&self, user_id: &str) -> Vec<String> {
    let (catalog, done) = self.load(user_id).await;
    completed_topic_names(&catalog, &done)
  }

  #[instrument(level = "info", skip(self), fields(%user_id))]
  pub async fn progress_by_path(&self, user_id: &str) -> Vec<PathProgress> {
    let (catalog, done) = self.load(user_id).await;
    progress_by_path(&catalog, &done)
  }

  #[instrument(level = "info", skip(self), fields(%user_id))]
  pub async fn progress_by_difficulty(&self, user_id: &str) -> DifficultyBreakdown {
    let (catalog, done) = self.load(user_id).await;
    progress_by_difficulty(&catalog, &done)
  }

  /// All three views from a single catalog + progress fetch.
  #[instrument(level = "info", skip(self), fields(%user_id))]
  pub async fn dashboard(&self, user_id: &str) -> DashboardSummary {
    let (catalog, done) = self.load(user_id).await;
    let summary = DashboardSummary {
      user_id: user_id.to_string(),
      completed_topics: completed_topic_names(&catalog, &done),
      paths: progress_by_path(&catalog, &done),
      difficulty: progress_by_difficulty(&catalog, &done),
    };
    info!(target: "progress", %user_id, completed_questions = done.len(), completed_topics = summary.completed_topics.len(), paths = summary.paths.len(), "Dashboard summary computed");
    summary
  }
}
