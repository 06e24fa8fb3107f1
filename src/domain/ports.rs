use super::ids::{DesignerId, PackageId, QuotationId, ReceiptId, RequestId};
use super::offer::{Package, RequestReceipt};
use super::pricing::QuotationDraft;
use super::quotation::Quotation;
use super::request::{DesignRequest, RequestStatus};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// A change applied to a stored request under the store's write lock.
///
/// If the closure fails the stored request is left exactly as it was.
pub type RequestUpdate = Box<dyn FnOnce(&mut DesignRequest) -> Result<()> + Send>;
pub type QuotationUpdate = Box<dyn FnOnce(&mut Quotation) -> Result<()> + Send>;
pub type ReceiptUpdate = Box<dyn FnOnce(&mut RequestReceipt) -> Result<()> + Send>;

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn store(&self, request: DesignRequest) -> Result<()>;
    async fn get(&self, id: RequestId) -> Result<Option<DesignRequest>>;
    async fn all(&self) -> Result<Vec<DesignRequest>>;
    /// Atomically loads, mutates and writes back one request.
    async fn update(&self, id: RequestId, apply: RequestUpdate) -> Result<DesignRequest>;
}

#[async_trait]
pub trait QuotationStore: Send + Sync {
    async fn store(&self, quotation: Quotation) -> Result<()>;
    async fn get(&self, id: QuotationId) -> Result<Option<Quotation>>;
    async fn for_request(&self, request: RequestId) -> Result<Vec<Quotation>>;
    /// Atomically loads, mutates and writes back one quotation.
    async fn update(&self, id: QuotationId, apply: QuotationUpdate) -> Result<Quotation>;
}

#[async_trait]
pub trait PackageStore: Send + Sync {
    async fn store(&self, package: Package) -> Result<()>;
    async fn get(&self, id: PackageId) -> Result<Option<Package>>;
    async fn by_designer(&self, designer: DesignerId) -> Result<Vec<Package>>;
}

#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn store(&self, receipt: RequestReceipt) -> Result<()>;
    async fn get(&self, id: ReceiptId) -> Result<Option<RequestReceipt>>;
    async fn for_request(&self, request: RequestId) -> Result<Vec<RequestReceipt>>;
    async fn update(&self, id: ReceiptId, apply: ReceiptUpdate) -> Result<RequestReceipt>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The confirmation call the payment handoff issues once per successful callback.
#[async_trait]
pub trait PickConfirmer: Send + Sync {
    async fn confirm_pick(&self, package: PackageId, request: RequestId) -> Result<()>;
}

/// The backend operations the marketplace UI consumes.
#[async_trait]
pub trait MarketplaceBackend: PickConfirmer {
    async fn list_open_requests(&self) -> Result<Vec<DesignRequest>>;
    async fn request_status(&self, request: RequestId) -> Result<RequestStatus>;
    async fn submit_quotation(
        &self,
        request: RequestId,
        designer: DesignerId,
        draft: QuotationDraft,
    ) -> Result<Quotation>;
    async fn list_packages(&self, designer: DesignerId) -> Result<Vec<Package>>;
    async fn create_offer(
        &self,
        request: RequestId,
        designer: DesignerId,
        packages: Vec<PackageId>,
        acceptance_deadline: NaiveDate,
    ) -> Result<RequestReceipt>;
    async fn list_offers(&self, request: RequestId) -> Result<Vec<RequestReceipt>>;
}

pub type RequestStoreRef = Arc<dyn RequestStore>;
pub type QuotationStoreRef = Arc<dyn QuotationStore>;
pub type PackageStoreRef = Arc<dyn PackageStore>;
pub type ReceiptStoreRef = Arc<dyn ReceiptStore>;
pub type ClockRef = Arc<dyn Clock>;
pub type PickConfirmerRef = Arc<dyn PickConfirmer>;
