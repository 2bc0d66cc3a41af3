//! Coins → level mapping and the within-level progress shown on the profile.
//!
//! NOTE: the progress bar uses a fixed bucket of `COINS_PER_LEVEL` coins, not the
//! gap between two thresholds of the table. With the default table both agree;
//! a custom table with uneven gaps will make the bar and the level disagree.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::GamificationData;

/// Bucket size used for the within-level progress bar.
pub const COINS_PER_LEVEL: u64 = 100;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Level {
  pub level: u32,
  pub name: String,
  /// Total coins needed to reach this level.
  pub threshold: u64,
}

pub fn default_levels() -> Vec<Level> {
  [
    (1, "Newbie", 0),
    (2, "Apprentice", 100),
    (3, "Coder", 200),
    (4, "Problem Solver", 300),
    (5, "Algorithmist", 400),
    (6, "Expert", 500),
    (7, "Master", 600),
    (8, "Grandmaster", 700),
  ]
  .into_iter()
  .map(|(level, name, threshold)| Level { level, name: name.to_string(), threshold })
  .collect()
}

/// Highest level whose threshold is <= `total_coins`. `None` only for an empty table.
pub fn level_for_coins(table: &[Level], total_coins: u64) -> Option<&Level> {
  table.iter().filter(|l| l.threshold <= total_coins).max_by_key(|l| l.threshold)
}

/// Display percentage within the current level: `coins_in_level / 100 * 100`, clamped.
pub fn level_progress_percent(coins_in_level: u64) -> u8 {
  (coins_in_level.saturating_mul(100) / COINS_PER_LEVEL).min(100) as u8
}

/// What the profile widget renders.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GamificationSummary {
  pub user_id: String,
  pub total_coins: u64,
  pub level: u32,
  pub level_name: String,
  pub coins_in_level: u64,
  pub progress_percent: u8,
  /// Threshold of the next level; `None` at the top of the table.
  pub next_level_threshold: Option<u64>,
}

impl GamificationSummary {
  /// Level and next threshold come from `total_coins`. The bar uses the stored
  /// `coins_in_level`; stored values that disagree with the table are only logged.
  pub fn derive(data: &GamificationData, table: &[Level]) -> Self {
    let (level, level_name, base) = match level_for_coins(table, data.total_coins) {
      Some(l) => (l.level, l.name.clone(), l.threshold),
      None => (data.current_level, String::new(), 0),
    };
    if level != data.current_level {
      warn!(target: "dashboard", user_id = %data.user_id, stored = data.current_level, derived = level, "Stored level disagrees with coin total");
    }
    let derived_in_level = data.total_coins.saturating_sub(base);
    if derived_in_level != data.coins_in_level {
      warn!(target: "dashboard", user_id = %data.user_id, stored = data.coins_in_level, derived = derived_in_level, "Stored coins in level disagree with coin total");
    }
    let next_level_threshold = table
      .iter()
      .map(|l| l.threshold)
      .filter(|t| *t > data.total_coins)
      .min();

    Self {
      user_id: data.user_id.clone(),
      total_coins: data.total_coins,
      level,
      level_name,
      coins_in_level: data.coins_in_level,
      progress_percent: level_progress_percent(data.coins_in_level),
      next_level_threshold,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn data(coins: u64, level: u32, in_level: u64) -> GamificationData {
    GamificationData { user_id: "u1".into(), total_coins: coins, current_level: level, coins_in_level: in_level }
  }

  #[test]
  fn coins_map_to_levels_on_thresholds() {
    let table = default_levels();
    assert_eq!(level_for_coins(&table, 0).unwrap().level, 1);
    assert_eq!(level_for_coins(&table, 99).unwrap().level, 1);
    assert_eq!(level_for_coins(&table, 100).unwrap().level, 2);
    assert_eq!(level_for_coins(&table, 10_000).unwrap().name, "Grandmaster");
    assert!(level_for_coins(&[], 50).is_none());
  }

  #[test]
  fn progress_bar_uses_fixed_bucket() {
    assert_eq!(level_progress_percent(0), 0);
    assert_eq!(level_progress_percent(29), 29);
    assert_eq!(level_progress_percent(45), 45);
    assert_eq!(level_progress_percent(250), 100);
  }

  #[test]
  fn summary_is_derived_from_total_coins() {
    let s = GamificationSummary::derive(&data(245, 3, 45), &default_levels());
    assert_eq!(s.level, 3);
    assert_eq!(s.level_name, "Coder");
    assert_eq!(s.coins_in_level, 45);
    assert_eq!(s.progress_percent, 45);
    assert_eq!(s.next_level_threshold, Some(300));
  }

  #[test]
  fn uneven_table_shows_the_display_inconsistency() {
    let table = vec![
      Level { level: 1, name: "A".into(), threshold: 0 },
      Level { level: 2, name: "B".into(), threshold: 500 },
    ];
    let s = GamificationSummary::derive(&data(300, 1, 300), &table);
    assert_eq!(s.level, 1);
    // 300 coins into a 500-coin level, yet the bar is full.
    assert_eq!(s.progress_percent, 100);
    assert_eq!(s.next_level_threshold, Some(500));
  }

  #[test]
  fn bar_follows_stored_coins_in_level() {
    // Level comes from the total, the bar from the stored row.
    let s = GamificationSummary::derive(&data(245, 2, 80), &default_levels());
    assert_eq!(s.level, 3);
    assert_eq!(s.coins_in_level, 80);
    assert_eq!(s.progress_percent, 80);
  }

  #[test]
  fn missing_row_defaults_to_level_one_and_empty_bar() {
    let s = GamificationSummary::derive(&GamificationData::default(), &default_levels());
    assert_eq!(s.level, 1);
    assert_eq!(s.level_name, "Newbie");
    assert_eq!(s.progress_percent, 0);
    assert_eq!(s.next_level_threshold, Some(100));
  }

  #[test]
  fn top_level_has_no_next_threshold() {
    let s = GamificationSummary::derive(&data(900, 8, 200), &default_levels());
    assert_eq!(s.level, 8);
    assert_eq!(s.next_level_threshold, None);
  }
}
