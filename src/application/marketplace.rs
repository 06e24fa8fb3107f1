use crate::application::offers::OfferService;
use crate::application::quotations::QuotationService;
use crate::application::requests::RequestService;
use crate::domain::ids::{DesignerId, PackageId, RequestId};
use crate::domain::offer::{Package, RequestReceipt};
use crate::domain::ports::{ClockRef, MarketplaceBackend, PickConfirmer};
use crate::domain::pricing::QuotationDraft;
use crate::domain::quotation::Quotation;
use crate::domain::request::{DesignRequest, RequestStatus};
use crate::error::Result;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::in_memory::{
    InMemoryPackageStore, InMemoryQuotationStore, InMemoryReceiptStore, InMemoryRequestStore,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// The marketplace backend: every service wired over one set of stores.
#[derive(Clone)]
pub struct Marketplace {
    requests: RequestService,
    quotations: QuotationService,
    offers: OfferService,
}

impl Marketplace {
    /// In-memory stores and the system clock.
    pub fn in_memory() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// In-memory stores with the given clock.
    pub fn with_clock(clock: ClockRef) -> Self {
        let requests = Arc::new(InMemoryRequestStore::new());
        Self {
            requests: RequestService::new(requests.clone(), clock.clone()),
            quotations: QuotationService::new(
                Arc::new(InMemoryQuotationStore::new()),
                requests.clone(),
                clock.clone(),
            ),
            offers: OfferService::new(
                requests,
                Arc::new(InMemoryPackageStore::new()),
                Arc::new(InMemoryReceiptStore::new()),
                clock,
            ),
        }
    }

    pub fn requests(&self) -> &RequestService {
        &self.requests
    }

    pub fn quotations(&self) -> &QuotationService {
        &self.quotations
    }

    pub fn offers(&self) -> &OfferService {
        &self.offers
    }
}

#[async_trait]
impl PickConfirmer for Marketplace {
    async fn confirm_pick(&self, package: PackageId, request: RequestId) -> Result<()> {
        self.offers.confirm_pick(package, request).await
    }
}

#[async_trait]
impl MarketplaceBackend for Marketplace {
    async fn list_open_requests(&self) -> Result<Vec<DesignRequest>> {
        self.requests.list_open().await
    }

    async fn request_status(&self, request: RequestId) -> Result<RequestStatus> {
        self.requests.status(request).await
    }

    async fn submit_quotation(
        &self,
        request: RequestId,
        designer: DesignerId,
        draft: QuotationDraft,
    ) -> Result<Quotation> {
        self.quotations.submit(request, designer, &draft).await
    }

    async fn list_packages(&self, designer: DesignerId) -> Result<Vec<Package>> {
        self.offers.list_packages(designer).await
    }

    async fn create_offer(
        &self,
        request: RequestId,
        designer: DesignerId,
        packages: Vec<PackageId>,
        acceptance_deadline: NaiveDate,
    ) -> Result<RequestReceipt> {
        self.offers
            .create_offer(request, designer, packages, acceptance_deadline)
            .await
    }

    async fn list_offers(&self, request: RequestId) -> Result<Vec<RequestReceipt>> {
        Ok(self.offers.list_offers(request).await?.collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::SchoolId;
    use crate::domain::offer::PackageTerms;
    use crate::domain::request::tests::shirt;
    use crate::infrastructure::clock::SteppingClock;
    use chrono::{TimeZone, Utc};

    fn backend() -> Marketplace {
        Marketplace::with_clock(Arc::new(SteppingClock::starting_at(
            Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap(),
        )))
    }

    #[tokio::test]
    async fn test_backend_as_trait_object() {
        let market = backend();
        let request = market
            .requests()
            .create(SchoolId::new(), vec![shirt()], None)
            .await
            .unwrap();
        let designer = DesignerId::new();
        let package = market
            .offers()
            .publish_package(
                designer,
                PackageTerms {
                    name: "Basic".to_string(),
                    header: None,
                    fee: 1_000_000,
                    delivery_duration: 10,
                    revision_time: 2,
                },
            )
            .await
            .unwrap();

        let backend: Arc<dyn MarketplaceBackend> = Arc::new(market);
        assert_eq!(backend.list_open_requests().await.unwrap().len(), 1);
        assert_eq!(backend.list_packages(designer).await.unwrap().len(), 1);

        let deadline = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        backend
            .create_offer(request.id, designer, vec![package.id], deadline)
            .await
            .unwrap();
        assert_eq!(backend.list_offers(request.id).await.unwrap().len(), 1);
        assert_eq!(
            backend.request_status(request.id).await.unwrap(),
            RequestStatus::Created
        );
    }

    #[tokio::test]
    async fn test_in_memory_starts_empty() {
        let market = Marketplace::in_memory();
        assert!(market.list_open_requests().await.unwrap().is_empty());
        assert!(market.list_offers(RequestId::new()).await.unwrap().is_empty());
    }
}
