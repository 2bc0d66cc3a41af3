//! Seed data for the in-memory store, so the dashboard is usable without a
//! configured backend.

use crate::domain::{Badge, BadgeIcon, BadgeTier, GamificationData, LearningPath, Question, Topic};
use crate::store::MemoryStore;

/// Tier badge catalog.
pub fn seed_badges() -> Vec<Badge> {
  BadgeTier::ALL
    .into_iter()
    .map(|tier| {
      let (icon, description) = match tier {
        BadgeTier::Bronze => (BadgeIcon::Medal, "Completed an easy learning path."),
        BadgeTier::Silver => (BadgeIcon::Award, "Completed a medium learning path."),
        BadgeTier::Gold => (BadgeIcon::Star, "Completed a hard learning path."),
        BadgeTier::Supreme => (BadgeIcon::Crown, "Completed a path in every tier."),
      };
      Badge {
        id: format!("badge-{}", tier.badge_name().to_lowercase().replace(' ', "-")),
        name: tier.badge_name().into(),
        description: description.into(),
        icon,
      }
    })
    .collect()
}

/// Small demo catalog: one path per tier, a couple of topics each.
pub fn seed_catalog() -> (Vec<LearningPath>, Vec<Topic>, Vec<Question>) {
  let paths = vec![
    lp("lp-basics", "DSA Basics", "Arrays, strings and hashing.", "easy"),
    lp("lp-core", "Core Patterns", "Two pointers, sliding window, stacks.", "medium"),
    lp("lp-advanced", "Advanced Graphs & DP", "Graph search and dynamic programming.", "hard"),
  ];
  let topics = vec![
    tp("t-arrays", "Arrays", "lp-basics"),
    tp("t-strings", "Strings", "lp-basics"),
    tp("t-two-pointers", "Two Pointers", "lp-core"),
    tp("t-stacks", "Stacks", "lp-core"),
    tp("t-graphs", "Graphs", "lp-advanced"),
    tp("t-dp", "Dynamic Programming", "lp-advanced"),
  ];
  let questions = vec![
    qn("q-two-sum", "Two Sum", "t-arrays", "easy"),
    qn("q-best-time", "Best Time to Buy and Sell Stock", "t-arrays", "easy"),
    qn("q-valid-anagram", "Valid Anagram", "t-strings", "easy"),
    qn("q-big-o", "Big-O of string concatenation", "t-strings", "theory"),
    qn("q-3sum", "3Sum", "t-two-pointers", "medium"),
    qn("q-container", "Container With Most Water", "t-two-pointers", "medium"),
    qn("q-min-stack", "Min Stack", "t-stacks", "medium"),
    qn("q-islands", "Number of Islands", "t-graphs", "medium"),
    qn("q-word-ladder", "Word Ladder", "t-graphs", "hard"),
    qn("q-edit-distance", "Edit Distance", "t-dp", "hard"),
    qn("q-dp-states", "Choosing DP states", "t-dp", "theory"),
  ];
  (paths, topics, questions)
}

/// A MemoryStore filled with the demo catalog, badges and one demo user.
pub async fn seeded_memory_store() -> MemoryStore {
  let store = MemoryStore::new();
  let (paths, topics, questions) = seed_catalog();
  for p in paths {
    store.add_path(p).await;
  }
  for t in topics {
    store.add_topic(t).await;
  }
  for q in questions {
    store.add_question(q).await;
  }
  for b in seed_badges() {
    store.add_badge(b).await;
  }

  for q in ["q-two-sum", "q-best-time", "q-valid-anagram", "q-big-o", "q-3sum"] {
    store.set_progress("demo", q, true).await;
  }
  store
    .set_gamification(GamificationData { user_id: "demo".into(), total_coins: 150, current_level: 2, coins_in_level: 50 })
    .await;
  store
}

fn lp(id: &str, title: &str, description: &str, difficulty: &str) -> LearningPath {
  LearningPath { id: id.into(), title: title.into(), description: description.into(), difficulty: difficulty.into() }
}

fn tp(id: &str, name: &str, path_id: &str) -> Topic {
  Topic { id: id.into(), name: name.into(), learning_path_id: path_id.into() }
}

fn qn(id: &str, title: &str, topic_id: &str, difficulty: &str) -> Question {
  Question { id: id.into(), title: title.into(), topic_id: topic_id.into(), difficulty: difficulty.into(), link: None }
}
