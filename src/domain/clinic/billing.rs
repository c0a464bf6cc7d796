//! Billing ledger records.

use serde::{Deserialize, Serialize};

use super::SlotDate;
use crate::domain::foundation::InvoiceId;

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Paid,
    Unpaid,
    Overdue,
}

impl InvoiceStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }
}

/// A single invoice line in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_id: InvoiceId,
    pub patient_name: String,
    pub date: SlotDate,
    pub amount: f64,
    pub status: InvoiceStatus,
}

/// Aggregate billing figures in clinic currency units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingOverview {
    pub total_billed: f64,
    pub total_collected: f64,
    pub outstanding: f64,
}

impl BillingOverview {
    /// Sums a set of invoices. Outstanding is whatever has not been paid.
    pub fn from_invoices<'a>(invoices: impl IntoIterator<Item = &'a Invoice>) -> Self {
        invoices
            .into_iter()
            .fold(Self::default(), |mut overview, invoice| {
                overview.total_billed += invoice.amount;
                if invoice.status.is_settled() {
                    overview.total_collected += invoice.amount;
                } else {
                    overview.outstanding += invoice.amount;
                }
                overview
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(id: &str, amount: f64, status: InvoiceStatus) -> Invoice {
        Invoice {
            invoice_id: InvoiceId::new(id).unwrap(),
            patient_name: "John Doe".to_string(),
            date: SlotDate::parse("2024-07-01").unwrap(),
            amount,
            status,
        }
    }

    #[test]
    fn overview_splits_collected_and_outstanding() {
        let invoices = vec![
            invoice("INV-1", 150.0, InvoiceStatus::Paid),
            invoice("INV-2", 80.0, InvoiceStatus::Unpaid),
            invoice("INV-3", 20.0, InvoiceStatus::Overdue),
        ];
        let overview = BillingOverview::from_invoices(&invoices);
        assert_eq!(overview.total_billed, 250.0);
        assert_eq!(overview.total_collected, 150.0);
        assert_eq!(overview.outstanding, 100.0);
    }

    #[test]
    fn overview_uses_camel_case_keys() {
        let json = serde_json::to_value(BillingOverview::default()).unwrap();
        assert!(json.get("totalBilled").is_some());
        assert!(json.get("totalCollected").is_some());
    }

    #[test]
    fn invoice_status_keeps_capitalized_names() {
        assert_eq!(
            serde_json::to_string(&InvoiceStatus::Overdue).unwrap(),
            "\"Overdue\""
        );
    }
}
