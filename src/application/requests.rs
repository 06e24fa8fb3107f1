use crate::domain::ids::{RequestId, SchoolId};
use crate::domain::ports::{ClockRef, RequestStoreRef};
use crate::domain::request::{DesignRequest, GarmentLineItem, RequestStatus};
use crate::error::{MarketError, Result};
use tracing::{info, instrument};

/// The request lifecycle. Every status change of a design request goes
/// through here.
#[derive(Clone)]
pub struct RequestService {
    requests: RequestStoreRef,
    clock: ClockRef,
}

impl RequestService {
    pub fn new(requests: RequestStoreRef, clock: ClockRef) -> Self {
        Self { requests, clock }
    }

    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn create(
        &self,
        school: SchoolId,
        items: Vec<GarmentLineItem>,
        logo: Option<String>,
    ) -> Result<DesignRequest> {
        let request = DesignRequest::new(school, items, logo, self.clock.now())?;
        self.requests.store(request.clone()).await?;
        info!(request = %request.id, "design request created");
        Ok(request)
    }

    pub async fn get(&self, id: RequestId) -> Result<DesignRequest> {
        self.requests
            .get(id)
            .await?
            .ok_or_else(|| MarketError::not_found(format!("request {id}")))
    }

    pub async fn status(&self, id: RequestId) -> Result<RequestStatus> {
        Ok(self.get(id).await?.status())
    }

    /// Requests still open for quotations and offers, newest first.
    pub async fn list_open(&self) -> Result<Vec<DesignRequest>> {
        let mut open: Vec<DesignRequest> = self
            .requests
            .all()
            .await?
            .into_iter()
            .filter(|r| r.status().accepts_offers())
            .collect();
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(open)
    }

    pub async fn replace_items(
        &self,
        id: RequestId,
        items: Vec<GarmentLineItem>,
    ) -> Result<DesignRequest> {
        self.requests
            .update(
                id,
                Box::new(move |request: &mut DesignRequest| request.replace_items(items)),
            )
            .await
    }

    /// `created -> pending`: a package was picked, payment outstanding.
    pub async fn begin_pick(&self, id: RequestId) -> Result<DesignRequest> {
        let request = self
            .requests
            .update(id, Box::new(|request: &mut DesignRequest| request.begin_pick()))
            .await?;
        info!(request = %id, "request pending payment");
        Ok(request)
    }

    /// `pending -> imported`: payment confirmed, order handed downstream.
    pub async fn import(&self, id: RequestId) -> Result<DesignRequest> {
        self.transition(id, RequestStatus::Imported).await
    }

    /// `imported -> completed`, reported by order fulfillment.
    pub async fn complete(&self, id: RequestId) -> Result<DesignRequest> {
        self.transition(id, RequestStatus::Completed).await
    }

    pub async fn cancel(&self, id: RequestId) -> Result<DesignRequest> {
        self.transition(id, RequestStatus::Cancelled).await
    }

    #[instrument(skip(self))]
    async fn transition(&self, id: RequestId, next: RequestStatus) -> Result<DesignRequest> {
        let request = self
            .requests
            .update(
                id,
                Box::new(move |request: &mut DesignRequest| request.transition_to(next)),
            )
            .await?;
        info!(request = %id, status = %next, "request status changed");
        Ok(request)
    }
}
