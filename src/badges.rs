//! Badge rules: tier completion predicates and idempotent badge awarding.
//!
//! easy → Bronze, medium → Silver, hard → Gold, every path tier → Supreme.
//! Eligibility is recomputed on every call; an awarded badge is never revoked.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::catalog::{Catalog, Completion};
use crate::config::BadgePolicy;
use crate::domain::{BadgeTier, NewUserBadge, UserBadge};
use crate::store::{DataStore, StoreError};

/// True iff at least one path of `tier` has all its non-empty topics completed.
///
/// Empty topics are skipped. A path left with nothing to check counts as
/// completed only when `policy.vacuous_paths_complete` is set.
pub fn tier_completed(catalog: &Catalog, done: &Completion, tier: &str, policy: &BadgePolicy) -> bool {
  catalog
    .paths
    .iter()
    .filter(|p| p.difficulty.eq_ignore_ascii_case(tier))
    .any(|p| {
      let mut checked = 0usize;
      for t in catalog.topics_of(&p.id) {
        if catalog.questions_of(&t.id).next().is_none() {
          continue;
        }
        if !catalog.topic_completed(&t.id, done) {
          return false;
        }
        checked += 1;
      }
      checked > 0 || policy.vacuous_paths_complete
    })
}

/// Every distinct path difficulty is completed. An empty catalog never qualifies.
pub fn all_tiers_completed(catalog: &Catalog, done: &Completion, policy: &BadgePolicy) -> bool {
  let tiers = catalog.path_difficulties();
  !tiers.is_empty() && tiers.iter().all(|t| tier_completed(catalog, done, t, policy))
}

/// Tiers the user currently qualifies for.
pub fn eligible_tiers(catalog: &Catalog, done: &Completion, policy: &BadgePolicy) -> Vec<BadgeTier> {
  BadgeTier::ALL
    .into_iter()
    .filter(|tier| match tier.path_difficulty() {
      Some(d) => tier_completed(catalog, done, d, policy),
      None => all_tiers_completed(catalog, done, policy),
    })
    .collect()
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AwardedBadge {
  pub tier: BadgeTier,
  pub badge_id: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AwardFailure {
  pub tier: BadgeTier,
  pub badge_id: Option<String>,
  pub reason: String,
}

/// Outcome of one award pass. Failures never abort the other tiers.
#[derive(Clone, Debug, Serialize, PartialEq, Default)]
pub struct AwardReport {
  pub awarded: Vec<AwardedBadge>,
  pub already_held: Vec<BadgeTier>,
  pub failed: Vec<AwardFailure>,
}

pub struct BadgeRules<'a> {
  store: &'a dyn DataStore,
  policy: BadgePolicy,
}

impl<'a> BadgeRules<'a> {
  pub fn new(store: &'a dyn DataStore, policy: BadgePolicy) -> Self {
    Self { store, policy }
  }

  async fn load(&self, user_id: &str) -> (Catalog, Completion) {
    let catalog = Catalog::fetch_or_empty(self.store).await;
    let done = Completion::fetch_or_empty(self.store, user_id).await;
    (catalog, done)
  }

  #[instrument(level = "info", skip(self), fields(%user_id, %tier))]
  pub async fn tier_completed(&self, user_id: &str, tier: &str) -> bool {
    let (catalog, done) = self.load(user_id).await;
    tier_completed(&catalog, &done, tier, &self.policy)
  }

  #[instrument(level = "info", skip(self), fields(%user_id))]
  pub async fn all_tiers_completed(&self, user_id: &str) -> bool {
    let (catalog, done) = self.load(user_id).await;
    all_tiers_completed(&catalog, &done, &self.policy)
  }

  /// Held badges joined with the catalog; empty when the backend fails.
  #[instrument(level = "info", skip(self), fields(%user_id))]
  pub async fn user_badges(&self, user_id: &str) -> Vec<UserBadge> {
    match self.store.list_user_badges(user_id).await {
      Ok(rows) => rows,
      Err(e) => {
        error!(target: "badges", %user_id, error = %e, "Failed to list user badges");
        Vec::new()
      }
    }
  }

  /// Insert every newly eligible, not yet held badge exactly once.
  #[instrument(level = "info", skip(self), fields(%user_id))]
  pub async fn award_eligible_badges(&self, user_id: &str) -> AwardReport {
    let mut report = AwardReport::default();
    if user_id.trim().is_empty() {
      warn!(target: "badges", "Award pass requested without a user id; nothing to do");
      return report;
    }

    let (catalog, done) = self.load(user_id).await;
    let eligible = eligible_tiers(&catalog, &done, &self.policy);
    if eligible.is_empty() {
      return report;
    }

    // Without the held set we cannot rule out duplicates, so nothing is inserted.
    let held: HashSet<String> = match self.store.list_user_badges(user_id).await {
      Ok(rows) => rows.into_iter().map(|ub| ub.badge_id).collect(),
      Err(e) => {
        error!(target: "badges", %user_id, error = %e, "Cannot read held badges; skipping award pass");
        report.failed = eligible
          .into_iter()
          .map(|tier| AwardFailure { tier, badge_id: None, reason: format!("held badges unavailable: {}", e) })
          .collect();
        return report;
      }
    };

    let catalog_badges = match self.store.list_badges().await {
      Ok(b) => b,
      Err(e) => {
        error!(target: "badges", %user_id, error = %e, "Cannot read badge catalog; skipping award pass");
        report.failed = eligible
          .into_iter()
          .map(|tier| AwardFailure { tier, badge_id: None, reason: format!("badge catalog unavailable: {}", e) })
          .collect();
        return report;
      }
    };

    for tier in eligible {
      let Some(badge) = catalog_badges.iter().find(|b| b.name == tier.badge_name()) else {
        warn!(target: "badges", %user_id, ?tier, "Badge missing from catalog");
        report.failed.push(AwardFailure { tier, badge_id: None, reason: format!("'{}' not in badge catalog", tier.badge_name()) });
        continue;
      };

      if held.contains(&badge.id) {
        report.already_held.push(tier);
        continue;
      }

      let row = NewUserBadge { user_id: user_id.to_string(), badge_id: badge.id.clone() };
      match self.store.insert_user_badge(&row).await {
        Ok(_) => {
          info!(target: "badges", %user_id, ?tier, badge_id = %badge.id, "Badge awarded");
          report.awarded.push(AwardedBadge { tier, badge_id: badge.id.clone() });
        }
        Err(StoreError::Conflict(msg)) => {
          // Lost a race with a concurrent award; the row exists, which is all we want.
          info!(target: "badges", %user_id, ?tier, %msg, "Badge already present at insert time");
          report.already_held.push(tier);
        }
        Err(e) => {
          error!(target: "badges", %user_id, ?tier, error = %e, "Badge insert failed");
          report.failed.push(AwardFailure { tier, badge_id: Some(badge.id.clone()), reason: e.to_string() });
        }
      }
    }

    report
  }
}
