use crate::domain::ids::{DesignerId, QuotationId, RequestId};
use crate::domain::money::Vnd;
use crate::domain::pricing::{RevisionAllowance, ValidatedQuotation};
use crate::error::{MarketError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl QuotationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QuotationStatus::Pending => "pending",
            QuotationStatus::Accepted => "accepted",
            QuotationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != QuotationStatus::Pending
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A designer's direct price/terms offer against one design request.
///
/// Only built from a [`ValidatedQuotation`], so an invalid quotation never
/// exists. Settles to accepted or rejected exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: QuotationId,
    pub request: RequestId,
    pub designer: DesignerId,
    pub price: Vnd,
    pub delivery_within: u16,
    pub revision_time: RevisionAllowance,
    pub extra_revision_price: Vnd,
    pub acceptance_deadline: NaiveDate,
    pub note: Option<String>,
    status: QuotationStatus,
    pub created_at: DateTime<Utc>,
}

impl Quotation {
    pub(crate) fn new(
        request: RequestId,
        designer: DesignerId,
        terms: ValidatedQuotation,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: QuotationId::new(),
            request,
            designer,
            price: terms.price,
            delivery_within: terms.delivery_within,
            revision_time: terms.revision_time,
            extra_revision_price: terms.extra_revision_price,
            acceptance_deadline: terms.acceptance_deadline,
            note: terms.note,
            status: QuotationStatus::Pending,
            created_at,
        }
    }

    pub fn status(&self) -> QuotationStatus {
        self.status
    }

    pub fn accept(&mut self) -> Result<()> {
        self.settle(QuotationStatus::Accepted)
    }

    pub fn reject(&mut self) -> Result<()> {
        self.settle(QuotationStatus::Rejected)
    }

    /// The deadline day itself still counts.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.acceptance_deadline
    }

    // Undoes an acceptance whose request could not be updated.
    pub(crate) fn reopen(&mut self) {
        if self.status == QuotationStatus::Accepted {
            self.status = QuotationStatus::Pending;
        }
    }

    fn settle(&mut self, next: QuotationStatus) -> Result<()> {
        if self.status.is_terminal() {
            return Err(MarketError::IllegalStateTransition {
                from: self.status.as_str(),
                to: next.as_str(),
            });
        }
        self.status = next;
        Ok(())
    }
}
