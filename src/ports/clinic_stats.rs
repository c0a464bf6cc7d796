//! Clinic Statistics Port.

use async_trait::async_trait;

use super::CollaboratorError;
use crate::domain::clinic::DashboardStats;

#[async_trait]
pub trait ClinicStats: Send + Sync {
    async fn dashboard(&self) -> Result<DashboardStats, CollaboratorError>;
}
