//! Domain models consumed by the dashboard: the learning catalog, per-user
//! progress, the badge catalog and gamification counters.
//!
//! All of these rows live in the hosted backend; this service only reads them
//! (and appends `UserBadge` rows).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Difficulty tags a question may carry. Anything else is outside the closed set.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
  Theory,
}

impl Difficulty {
  pub const ALL: [Difficulty; 4] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Theory];

  /// Lenient tag parsing: trims and ignores case. Unknown tags yield `None`.
  pub fn parse(tag: &str) -> Option<Self> {
    match tag.trim().to_ascii_lowercase().as_str() {
      "easy" => Some(Difficulty::Easy),
      "medium" => Some(Difficulty::Medium),
      "hard" => Some(Difficulty::Hard),
      "theory" => Some(Difficulty::Theory),
      _ => None,
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LearningPath {
  pub id: String,
  pub title: String,
  #[serde(default)] pub description: String,
  /// Free-form tier label (easy/medium/hard today, extendable).
  pub difficulty: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Topic {
  pub id: String,
  pub name: String,
  pub learning_path_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
  pub id: String,
  pub title: String,
  pub topic_id: String,
  /// May differ from the parent path's tier.
  pub difficulty: String,
  #[serde(default)] pub link: Option<String>,
}

/// One row per (user, question). Missing row = not completed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProgress {
  pub user_id: String,
  pub question_id: String,
  #[serde(default)] pub is_completed: bool,
  #[serde(default)] pub marked_for_revision: bool,
}

/// Icons the front end knows how to draw. Unknown names fall back to `Trophy`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BadgeIcon {
  Medal,
  Award,
  Star,
  Crown,
  #[default]
  #[serde(other)]
  Trophy,
}

/// Badge tiers this service knows how to award.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
  Bronze,
  Silver,
  Gold,
  Supreme,
}

impl BadgeTier {
  pub const ALL: [BadgeTier; 4] = [BadgeTier::Bronze, BadgeTier::Silver, BadgeTier::Gold, BadgeTier::Supreme];

  /// Catalog name of the badge for this tier.
  pub fn badge_name(&self) -> &'static str {
    match self {
      BadgeTier::Bronze => "Bronze Coder",
      BadgeTier::Silver => "Silver Coder",
      BadgeTier::Gold => "Gold Coder",
      BadgeTier::Supreme => "Supreme Coder",
    }
  }

  /// Path difficulty that earns this tier; `None` for the all-tiers badge.
  pub fn path_difficulty(&self) -> Option<&'static str> {
    match self {
      BadgeTier::Bronze => Some("easy"),
      BadgeTier::Silver => Some("medium"),
      BadgeTier::Gold => Some("hard"),
      BadgeTier::Supreme => None,
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Badge {
  pub id: String,
  pub name: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub icon: BadgeIcon,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserBadge {
  pub id: String,
  pub user_id: String,
  pub badge_id: String,
  pub earned_at: DateTime<Utc>,
  /// Joined catalog row, when the store returns it.
  #[serde(default, alias = "badges", skip_serializing_if = "Option::is_none")]
  pub badge: Option<Badge>,
}

/// Insert payload for a new `UserBadge`.
#[derive(Clone, Debug, Serialize)]
pub struct NewUserBadge {
  pub user_id: String,
  pub badge_id: String,
}

/// Per-user coin accumulator. `current_level` and `coins_in_level` are denormalized.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct GamificationData {
  pub user_id: String,
  #[serde(default)] pub total_coins: u64,
  #[serde(default = "first_level")] pub current_level: u32,
  #[serde(default)] pub coins_in_level: u64,
}

fn first_level() -> u32 { 1 }
