use crate::domain::ids::{FabricId, QuotationId, RequestId, SchoolId};
use crate::domain::rules::Rule;
use crate::error::{MarketError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a design request.
///
/// `Created` -> `Pending` -> `Imported` -> `Completed`, with `Cancelled`
/// reachable from `Created` and `Pending`. `Completed` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Open for designer quotations and offers.
    Created,
    /// An offer was picked, payment not yet confirmed.
    Pending,
    /// Paid; the downstream order has been initialized.
    Imported,
    /// Set by the order-fulfillment collaborator.
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Created => "created",
            RequestStatus::Pending => "pending",
            RequestStatus::Imported => "imported",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    pub fn accepts_offers(self) -> bool {
        self == RequestStatus::Created
    }

    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Created, Pending)
                | (Pending, Imported)
                | (Created, Cancelled)
                | (Pending, Cancelled)
                | (Imported, Completed)
        )
    }

    /// Returns `next` if the move is legal.
    pub fn transition(self, next: RequestStatus) -> Result<RequestStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(MarketError::IllegalStateTransition {
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentType {
    Shirt,
    Pants,
    Skirt,
    Shorts,
    Jacket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GarmentCategory {
    Regular,
    PhysicalEducation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Boy,
    Girl,
}

/// One garment a school wants designed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentLineItem {
    pub garment: GarmentType,
    pub category: GarmentCategory,
    pub gender: Gender,
    pub color: String,
    pub fabric: FabricId,
    #[serde(default)]
    pub logo_position: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// Reference image asset URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

/// A school's design request and the only place its status lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRequest {
    pub id: RequestId,
    pub school: SchoolId,
    items: Vec<GarmentLineItem>,
    /// Logo asset reference.
    pub logo: Option<String>,
    status: RequestStatus,
    pub created_at: DateTime<Utc>,
    selected_quotation: Option<QuotationId>,
}

impl DesignRequest {
    pub fn new(
        school: SchoolId,
        items: Vec<GarmentLineItem>,
        logo: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if items.is_empty() {
            return Err(MarketError::validation(Rule::NoLineItems));
        }
        Ok(Self {
            id: RequestId::new(),
            school,
            items,
            logo,
            status: RequestStatus::Created,
            created_at,
            selected_quotation: None,
        })
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn items(&self) -> &[GarmentLineItem] {
        &self.items
    }

    pub fn selected_quotation(&self) -> Option<QuotationId> {
        self.selected_quotation
    }

    /// Fails with `StaleRequestState` unless the request is still open.
    pub fn ensure_open(&self) -> Result<()> {
        if self.status.accepts_offers() {
            Ok(())
        } else {
            Err(MarketError::StaleRequestState {
                request: self.id,
                status: self.status,
            })
        }
    }

    /// Applies a status change. On error the status is left untouched.
    pub fn transition_to(&mut self, next: RequestStatus) -> Result<()> {
        self.status = self.status.transition(next)?;
        Ok(())
    }

    /// Records the school's pick of an offered package: `created -> pending`.
    pub fn begin_pick(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.transition_to(RequestStatus::Pending)
    }

    /// Records the single accepted quotation: `created -> pending`.
    pub fn select_quotation(&mut self, quotation: QuotationId) -> Result<()> {
        self.begin_pick()?;
        self.selected_quotation = Some(quotation);
        Ok(())
    }

    /// Line items are frozen once the request leaves `created`.
    pub fn replace_items(&mut self, items: Vec<GarmentLineItem>) -> Result<()> {
        self.ensure_open()?;
        if items.is_empty() {
            return Err(MarketError::validation(Rule::NoLineItems));
        }
        self.items = items;
        Ok(())
    }
}
