//! Patient Directory Port.

use async_trait::async_trait;

use super::CollaboratorError;
use crate::domain::clinic::Patient;

#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// Patients whose name contains `name_filter` (case-insensitive), or all.
    async fn patients(&self, name_filter: Option<&str>) -> Result<Vec<Patient>, CollaboratorError>;
}
