//! Billing Ledger Port.

use async_trait::async_trait;

use super::CollaboratorError;
use crate::domain::clinic::{BillingOverview, Invoice};

#[async_trait]
pub trait BillingLedger: Send + Sync {
    async fn overview(&self) -> Result<BillingOverview, CollaboratorError>;

    /// Invoices, optionally narrowed to one patient by name.
    async fn invoices(&self, patient_name: Option<&str>) -> Result<Vec<Invoice>, CollaboratorError>;
}
