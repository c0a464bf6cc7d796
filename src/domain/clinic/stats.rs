//! Dashboard statistics.

use serde::{Deserialize, Serialize};

/// Headline figures shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_patients: u64,
    pub appointments_today: u64,
    pub ai_interactions: u64,
    pub revenue: f64,
}
