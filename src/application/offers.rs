use crate::domain::ids::{DesignerId, PackageId, ReceiptId, RequestId};
use crate::domain::offer::{Package, PackageTerms, ReceiptStatus, RequestReceipt};
use crate::domain::payment::{PackageDetails, PaymentContext};
use crate::domain::ports::{ClockRef, PackageStoreRef, ReceiptStoreRef, RequestStoreRef};
use crate::domain::request::{DesignRequest, RequestStatus};
use crate::domain::rules::Rule;
use crate::error::{MarketError, Result};
use chrono::NaiveDate;
use tracing::{debug, error, info, instrument, warn};

/// Package catalog and package offers, the alternative to direct quotations.
///
/// Any number of designers may offer packages against the same open request.
/// The school's pick collapses them to one winner through the request
/// lifecycle.
#[derive(Clone)]
pub struct OfferService {
    requests: RequestStoreRef,
    packages: PackageStoreRef,
    receipts: ReceiptStoreRef,
    clock: ClockRef,
}

impl OfferService {
    pub fn new(
        requests: RequestStoreRef,
        packages: PackageStoreRef,
        receipts: ReceiptStoreRef,
        clock: ClockRef,
    ) -> Self {
        Self {
            requests,
            packages,
            receipts,
            clock,
        }
    }

    pub async fn publish_package(&self, designer: DesignerId, terms: PackageTerms) -> Result<Package> {
        let package = Package::new(designer, terms)?;
        self.packages.store(package.clone()).await?;
        info!(package = %package.id, fee = %package.fee, "package published");
        Ok(package)
    }

    /// Soft-deletes a package. Existing offers keep referencing it.
    pub async fn retire_package(&self, id: PackageId) -> Result<Package> {
        let mut package = self
            .packages
            .get(id)
            .await?
            .ok_or_else(|| MarketError::not_found(format!("package {id}")))?;
        package.deleted = true;
        self.packages.store(package.clone()).await?;
        info!(package = %id, "package retired");
        Ok(package)
    }

    /// A designer's catalog, without soft-deleted packages.
    pub async fn list_packages(&self, designer: DesignerId) -> Result<Vec<Package>> {
        let mut packages: Vec<Package> = self
            .packages
            .by_designer(designer)
            .await?
            .into_iter()
            .filter(|p| !p.deleted)
            .collect();
        packages.sort_by(|a, b| a.fee.cmp(&b.fee).then_with(|| a.name.cmp(&b.name)));
        Ok(packages)
    }

    #[instrument(skip(self, packages), fields(packages = packages.len()))]
    pub async fn create_offer(
        &self,
        request: RequestId,
        designer: DesignerId,
        packages: Vec<PackageId>,
        acceptance_deadline: NaiveDate,
    ) -> Result<RequestReceipt> {
        // Validation completes fully before anything is looked up or stored.
        let receipt = RequestReceipt::new(
            request,
            designer,
            packages,
            acceptance_deadline,
            self.clock.now(),
        )?;

        for id in receipt.packages() {
            match self.packages.get(*id).await? {
                Some(package) if !package.deleted && package.designer == designer => {}
                _ => return Err(MarketError::validation(Rule::UnknownPackage)),
            }
        }

        let owner = self
            .requests
            .get(request)
            .await?
            .ok_or_else(|| MarketError::not_found(format!("request {request}")))?;
        if !owner.status().accepts_offers() {
            debug!(request = %request, status = %owner.status(), "offer for a closed request");
            return Err(MarketError::validation(Rule::RequestNotOpen));
        }

        self.receipts.store(receipt.clone()).await?;
        info!(receipt = %receipt.id, "package offer created");
        Ok(receipt)
    }

    /// Offers for a request, most recent first.
    pub async fn list_offers(
        &self,
        request: RequestId,
    ) -> Result<std::vec::IntoIter<RequestReceipt>> {
        let mut receipts = self.receipts.for_request(request).await?;
        receipts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(receipts.into_iter())
    }

    pub async fn get_offer(&self, id: ReceiptId) -> Result<RequestReceipt> {
        self.receipts
            .get(id)
            .await?
            .ok_or_else(|| MarketError::not_found(format!("offer {id}")))
    }

    pub async fn reject_offer(&self, id: ReceiptId) -> Result<RequestReceipt> {
        let receipt = self
            .receipts
            .update(id, Box::new(|receipt: &mut RequestReceipt| receipt.reject()))
            .await?;
        info!(receipt = %id, "package offer rejected");
        Ok(receipt)
    }

    /// The school picks one package from an offer, up to and including the
    /// offer's deadline day.
    ///
    /// The offer settles first under the receipt store's lock, then the
    /// request moves `created -> pending`. If the request already moved on,
    /// the offer goes back to pending and `StaleRequestState` is returned.
    /// On success the payment context to carry through the gateway redirect
    /// is returned.
    #[instrument(skip(self))]
    pub async fn pick(&self, receipt: ReceiptId, package: PackageId) -> Result<PaymentContext> {
        let today = self.clock.today();
        let offer = self
            .receipts
            .update(
                receipt,
                Box::new(move |offer: &mut RequestReceipt| {
                    if !offer.offers(package) {
                        return Err(MarketError::validation(Rule::PackageNotOffered));
                    }
                    if offer.status() == ReceiptStatus::Pending && offer.is_expired(today) {
                        return Err(MarketError::validation(Rule::OfferExpired));
                    }
                    offer.accept()
                }),
            )
            .await
            .inspect_err(|e| warn!(receipt = %receipt, error = %e, "package could not be picked"))?;

        let picked = self
            .requests
            .update(
                offer.request,
                Box::new(|request: &mut DesignRequest| request.begin_pick()),
            )
            .await;
        if let Err(e) = picked {
            warn!(receipt = %receipt, error = %e, "request moved on, pick undone");
            let reopened = self
                .receipts
                .update(
                    receipt,
                    Box::new(|offer: &mut RequestReceipt| {
                        offer.reopen();
                        Ok(())
                    }),
                )
                .await;
            if let Err(rollback) = reopened {
                error!(receipt = %receipt, error = %rollback, "picked offer could not be reopened");
            }
            return Err(e);
        }
        info!(receipt = %receipt, package = %package, request = %offer.request, "package picked");

        Ok(PaymentContext::on_redirect(PackageDetails {
            designer: offer.designer,
            package,
            request: offer.request,
        }))
    }

    /// Backend side of the payment confirmation: `pending -> imported`.
    ///
    /// The package must belong to the accepted offer for the request.
    #[instrument(skip(self))]
    pub async fn confirm_pick(&self, package: PackageId, request: RequestId) -> Result<()> {
        let offered = self
            .receipts
            .for_request(request)
            .await?
            .iter()
            .any(|r| r.status() == ReceiptStatus::Accepted && r.offers(package));
        if !offered {
            warn!(request = %request, package = %package, "confirmation for a package that was not picked");
            return Err(MarketError::validation(Rule::PackageNotOffered));
        }

        self.requests
            .update(
                request,
                Box::new(|request: &mut DesignRequest| {
                    request.transition_to(RequestStatus::Imported)
                }),
            )
            .await?;
        info!(request = %request, "pick confirmed, request imported");
        Ok(())
    }
}
