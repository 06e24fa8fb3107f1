mod common;

use uniform_desk::domain::ids::{DesignerId, SchoolId};
use uniform_desk::domain::offer::{Package, PackageTerms};
use uniform_desk::domain::ports::{PackageStoreRef, RequestStoreRef};
use uniform_desk::domain::request::{DesignRequest, GarmentType, RequestStatus};
use uniform_desk::infrastructure::in_memory::{InMemoryPackageStore, InMemoryRequestStore};
use std::sync::Arc;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let request_store: RequestStoreRef = Arc::new(InMemoryRequestStore::new());
    let package_store: PackageStoreRef = Arc::new(InMemoryPackageStore::new());

    let request = DesignRequest::new(
        SchoolId::new(),
        vec![common::item(GarmentType::Jacket)],
        None,
        common::start(),
    )
    .unwrap();
    let request_id = request.id;
    let designer = DesignerId::new();
    let package = Package::new(
        designer,
        PackageTerms {
            name: "Starter".to_string(),
            header: Some("One concept, two revisions".to_string()),
            fee: 800_000,
            delivery_duration: 7,
            revision_time: 2,
        },
    )
    .unwrap();
    let package_id = package.id;

    // Verify Send + Sync by spawning tasks
    let store = request_store.clone();
    let rs_handle = tokio::spawn(async move {
        store.store(request).await.unwrap();
        store
            .update(
                request_id,
                Box::new(|request: &mut DesignRequest| request.begin_pick()),
            )
            .await
            .unwrap()
    });

    let ps_handle = tokio::spawn(async move {
        package_store.store(package).await.unwrap();
        package_store.by_designer(designer).await.unwrap()
    });

    let updated = rs_handle.await.unwrap();
    assert_eq!(updated.status(), RequestStatus::Pending);
    let stored = request_store.get(request_id).await.unwrap().unwrap();
    assert_eq!(stored.status(), RequestStatus::Pending);

    let packages = ps_handle.await.unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].id, package_id);
}

#[tokio::test]
async fn test_failed_update_leaves_request_untouched() {
    let request_store: RequestStoreRef = Arc::new(InMemoryRequestStore::new());
    let request = DesignRequest::new(
        SchoolId::new(),
        vec![common::item(GarmentType::Pants)],
        None,
        common::start(),
    )
    .unwrap();
    let id = request.id;
    request_store.store(request).await.unwrap();

    let result = request_store
        .update(
            id,
            Box::new(|request: &mut DesignRequest| {
                request.replace_items(vec![common::item(GarmentType::Shorts)])?;
                request.transition_to(RequestStatus::Completed)
            }),
        )
        .await;
    assert!(result.is_err());

    let stored = request_store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status(), RequestStatus::Created);
    assert_eq!(stored.items()[0].garment, GarmentType::Pants);
}
