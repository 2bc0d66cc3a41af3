//! Catalog snapshot: paths, topics and questions fetched in bulk and grouped by
//! foreign key in memory, plus the per-user completion set.
//!
//! Orphans (a topic pointing at an unknown path, a question pointing at an
//! unknown topic) are dropped here, so every count downstream ignores them.

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, instrument};

use crate::domain::{LearningPath, Question, Topic, UserProgress};
use crate::store::{DataStore, StoreResult};

#[derive(Clone, Debug, Default)]
pub struct Catalog {
  pub paths: Vec<LearningPath>,
  pub topics: Vec<Topic>,
  pub questions: Vec<Question>,
  topics_by_path: HashMap<String, Vec<usize>>,
  questions_by_topic: HashMap<String, Vec<usize>>,
}

impl Catalog {
  /// Build indices and drop orphans. Catalog order is preserved.
  pub fn from_parts(paths: Vec<LearningPath>, topics: Vec<Topic>, questions: Vec<Question>) -> Self {
    let path_ids: HashSet<&str> = paths.iter().map(|p| p.id.as_str()).collect();
    let (topics, orphan_topics): (Vec<Topic>, Vec<Topic>) =
      topics.into_iter().partition(|t| path_ids.contains(t.learning_path_id.as_str()));

    let topic_ids: HashSet<&str> = topics.iter().map(|t| t.id.as_str()).collect();
    let (questions, orphan_questions): (Vec<Question>, Vec<Question>) =
      questions.into_iter().partition(|q| topic_ids.contains(q.topic_id.as_str()));

    if !orphan_topics.is_empty() || !orphan_questions.is_empty() {
      debug!(target: "progress", orphan_topics = orphan_topics.len(), orphan_questions = orphan_questions.len(), "Dropped orphan catalog rows");
    }

    let mut topics_by_path: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, t) in topics.iter().enumerate() {
      topics_by_path.entry(t.learning_path_id.clone()).or_default().push(i);
    }
    let mut questions_by_topic: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, q) in questions.iter().enumerate() {
      questions_by_topic.entry(q.topic_id.clone()).or_default().push(i);
    }

    Self { paths, topics, questions, topics_by_path, questions_by_topic }
  }

  /// One bulk fetch per table.
  #[instrument(level = "debug", skip(store))]
  pub async fn fetch(store: &dyn DataStore) -> StoreResult<Self> {
    let paths = store.list_learning_paths().await?;
    let topics = store.list_topics().await?;
    let questions = store.list_questions().await?;
    Ok(Self::from_parts(paths, topics, questions))
  }

  /// Like `fetch`, but an unreachable backend yields an empty catalog.
  pub async fn fetch_or_empty(store: &dyn DataStore) -> Self {
    match Self::fetch(store).await {
      Ok(c) => c,
      Err(e) => {
        error!(target: "progress", error = %e, "Catalog fetch failed; using empty catalog");
        Self::default()
      }
    }
  }

  pub fn topics_of<'a>(&'a self, path_id: &str) -> impl Iterator<Item = &'a Topic> + 'a {
    self
      .topics_by_path
      .get(path_id)
      .into_iter()
      .flatten()
      .map(move |&i| &self.topics[i])
  }

  pub fn questions_of<'a>(&'a self, topic_id: &str) -> impl Iterator<Item = &'a Question> + 'a {
    self
      .questions_by_topic
      .get(topic_id)
      .into_iter()
      .flatten()
      .map(move |&i| &self.questions[i])
  }

  /// Completed iff the topic has questions and every one of them is done.
  pub fn topic_completed(&self, topic_id: &str, done: &Completion) -> bool {
    let mut any = false;
    for q in self.questions_of(topic_id) {
      if !done.contains(&q.id) {
        return false;
      }
      any = true;
    }
    any
  }

  /// Distinct path difficulties, first-seen order.
  pub fn path_difficulties(&self) -> Vec<&str> {
    let mut seen = HashSet::new();
    self
      .paths
      .iter()
      .map(|p| p.difficulty.as_str())
      .filter(|d| seen.insert(*d))
      .collect()
  }
}

/// Ids of the questions a user has completed.
#[derive(Clone, Debug, Default)]
pub struct Completion(HashSet<String>);

impl Completion {
  pub fn from_rows(rows: &[UserProgress]) -> Self {
    Self(rows.iter().filter(|r| r.is_completed).map(|r| r.question_id.clone()).collect())
  }

  /// Progress rows for the user; errors are logged and read as "nothing completed".
  #[instrument(level = "debug", skip(store))]
  pub async fn fetch_or_empty(store: &dyn DataStore, user_id: &str) -> Self {
    match store.list_user_progress(user_id).await {
      Ok(rows) => Self::from_rows(&rows),
      Err(e) => {
        error!(target: "progress", %user_id, error = %e, "Progress fetch failed; treating as no completions");
        Self::default()
      }
    }
  }

  pub fn contains(&self, question_id: &str) -> bool {
    self.0.contains(question_id)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }
}
