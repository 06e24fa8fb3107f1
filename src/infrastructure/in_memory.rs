use crate::domain::ids::{DesignerId, PackageId, QuotationId, ReceiptId, RequestId};
use crate::domain::offer::{Package, RequestReceipt};
use crate::domain::ports::{
    PackageStore, QuotationStore, QuotationUpdate, ReceiptStore, ReceiptUpdate, RequestStore,
    RequestUpdate,
};
use crate::domain::quotation::Quotation;
use crate::domain::request::DesignRequest;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for design requests.
///
/// Uses `Arc<RwLock<HashMap<RequestId, DesignRequest>>>` so clones share state.
/// `update` holds the write lock across the whole check-and-mutate step.
#[derive(Default, Clone)]
pub struct InMemoryRequestStore {
    requests: Arc<RwLock<HashMap<RequestId, DesignRequest>>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn store(&self, request: DesignRequest) -> Result<()> {
        let mut requests = self.requests.write().await;
        requests.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: RequestId) -> Result<Option<DesignRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.get(&id).cloned())
    }

    async fn all(&self) -> Result<Vec<DesignRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.values().cloned().collect())
    }

    async fn update(&self, id: RequestId, apply: RequestUpdate) -> Result<DesignRequest> {
        let mut requests = self.requests.write().await;
        apply_update(&mut requests, "request", id, apply)
    }
}

// Mutates a copy under the caller's write guard so a failed closure leaves
// the stored value intact.
fn apply_update<K, V>(
    entries: &mut HashMap<K, V>,
    kind: &str,
    id: K,
    apply: impl FnOnce(&mut V) -> Result<()>,
) -> Result<V>
where
    K: Eq + Hash + Display,
    V: Clone,
{
    let current = entries
        .get(&id)
        .ok_or_else(|| MarketError::not_found(format!("{kind} {id}")))?;
    let mut updated = current.clone();
    apply(&mut updated)?;
    entries.insert(id, updated.clone());
    Ok(updated)
}

/// A thread-safe in-memory store for quotations.
#[derive(Default, Clone)]
pub struct InMemoryQuotationStore {
    quotations: Arc<RwLock<HashMap<QuotationId, Quotation>>>,
}

impl InMemoryQuotationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuotationStore for InMemoryQuotationStore {
    async fn store(&self, quotation: Quotation) -> Result<()> {
        let mut quotations = self.quotations.write().await;
        quotations.insert(quotation.id, quotation);
        Ok(())
    }

    async fn get(&self, id: QuotationId) -> Result<Option<Quotation>> {
        let quotations = self.quotations.read().await;
        Ok(quotations.get(&id).cloned())
    }

    async fn for_request(&self, request: RequestId) -> Result<Vec<Quotation>> {
        let quotations = self.quotations.read().await;
        Ok(quotations
            .values()
            .filter(|q| q.request == request)
            .cloned()
            .collect())
    }

    async fn update(&self, id: QuotationId, apply: QuotationUpdate) -> Result<Quotation> {
        let mut quotations = self.quotations.write().await;
        apply_update(&mut quotations, "quotation", id, apply)
    }
}

/// A thread-safe in-memory package catalog.
#[derive(Default, Clone)]
pub struct InMemoryPackageStore {
    packages: Arc<RwLock<HashMap<PackageId, Package>>>,
}

impl InMemoryPackageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PackageStore for InMemoryPackageStore {
    async fn store(&self, package: Package) -> Result<()> {
        let mut packages = self.packages.write().await;
        packages.insert(package.id, package);
        Ok(())
    }

    async fn get(&self, id: PackageId) -> Result<Option<Package>> {
        let packages = self.packages.read().await;
        Ok(packages.get(&id).cloned())
    }

    async fn by_designer(&self, designer: DesignerId) -> Result<Vec<Package>> {
        let packages = self.packages.read().await;
        Ok(packages
            .values()
            .filter(|p| p.designer == designer)
            .cloned()
            .collect())
    }
}

/// A thread-safe in-memory store for package offers.
#[derive(Default, Clone)]
pub struct InMemoryReceiptStore {
    receipts: Arc<RwLock<HashMap<ReceiptId, RequestReceipt>>>,
}

impl InMemoryReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReceiptStore for InMemoryReceiptStore {
    async fn store(&self, receipt: RequestReceipt) -> Result<()> {
        let mut receipts = self.receipts.write().await;
        receipts.insert(receipt.id, receipt);
        Ok(())
    }

    async fn get(&self, id: ReceiptId) -> Result<Option<RequestReceipt>> {
        let receipts = self.receipts.read().await;
        Ok(receipts.get(&id).cloned())
    }

    async fn for_request(&self, request: RequestId) -> Result<Vec<RequestReceipt>> {
        let receipts = self.receipts.read().await;
        Ok(receipts
            .values()
            .filter(|r| r.request == request)
            .cloned()
            .collect())
    }

    async fn update(&self, id: ReceiptId, apply: ReceiptUpdate) -> Result<RequestReceipt> {
        let mut receipts = self.receipts.write().await;
        apply_update(&mut receipts, "offer", id, apply)
    }
}
