//! Public response shapes for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::Serialize;

use crate::domain::UserBadge;
use crate::progress::{DifficultyBreakdown, PathProgress};

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub backend: &'static str,
}

#[derive(Serialize)]
pub struct CompletedTopicsOut {
    pub user_id: String,
    pub topics: Vec<String>,
}

#[derive(Serialize)]
pub struct PathProgressOut {
    pub user_id: String,
    pub paths: Vec<PathProgress>,
}

#[derive(Serialize)]
pub struct DifficultyOut {
    pub user_id: String,
    pub difficulty: DifficultyBreakdown,
}

#[derive(Serialize)]
pub struct TierOut {
    pub user_id: String,
    pub tier: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct BadgesOut {
    pub user_id: String,
    pub badges: Vec<UserBadge>,
}
