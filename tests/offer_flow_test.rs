mod common;

use uniform_desk::domain::ids::{DesignerId, PackageId};
use uniform_desk::domain::offer::ReceiptStatus;
use uniform_desk::domain::ports::MarketplaceBackend;
use uniform_desk::domain::request::RequestStatus;
use uniform_desk::domain::rules::Rule;
use uniform_desk::error::MarketError;

#[tokio::test]
async fn test_many_designers_offer_one_pick_wins() {
    let market = common::marketplace();
    let request = common::open_request(&market).await;

    let mut offers = Vec::new();
    for name in ["Atelier A", "Atelier B", "Atelier C"] {
        let designer = DesignerId::new();
        let package = common::package(&market, designer, name, 2_000_000).await;
        let receipt = market
            .create_offer(request.id, designer, vec![package.id], common::day(3))
            .await
            .unwrap();
        offers.push((receipt.id, package.id));
    }
    assert_eq!(market.list_offers(request.id).await.unwrap().len(), 3);
    assert_eq!(
        market.request_status(request.id).await.unwrap(),
        RequestStatus::Created
    );

    let (winner, winner_package) = offers[1];
    let context = market.offers().pick(winner, winner_package).await.unwrap();
    assert_eq!(context.details().map(|d| d.package), Some(winner_package));
    assert_eq!(
        market.request_status(request.id).await.unwrap(),
        RequestStatus::Pending
    );

    let (loser, loser_package) = offers[0];
    let result = market.offers().pick(loser, loser_package).await;
    assert!(matches!(result, Err(MarketError::StaleRequestState { .. })));
    assert_eq!(
        market.offers().get_offer(loser).await.unwrap().status(),
        ReceiptStatus::Pending
    );

    // No new offers once the request left `created`.
    let late = DesignerId::new();
    let package = common::package(&market, late, "Late", 1_000_000).await;
    let result = market
        .create_offer(request.id, late, vec![package.id], common::day(3))
        .await;
    assert!(matches!(result, Err(MarketError::Validation(e)) if e.contains(Rule::RequestNotOpen)));
}

#[tokio::test]
async fn test_offer_validation_collects_rules() {
    let market = common::marketplace();
    let request = common::open_request(&market).await;

    let result = market
        .create_offer(request.id, DesignerId::new(), Vec::new(), common::day(1))
        .await;
    let Err(MarketError::Validation(errors)) = result else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.rules(), &[Rule::EmptyPackageSet, Rule::DeadlineTooSoon]);
}

#[tokio::test]
async fn test_retired_packages_hidden_and_unofferable() {
    let market = common::marketplace();
    let request = common::open_request(&market).await;
    let designer = DesignerId::new();
    let premium = common::package(&market, designer, "Premium", 5_000_000).await;
    let basic = common::package(&market, designer, "Basic", 1_000_000).await;
    market.offers().retire_package(premium.id).await.unwrap();

    let listed: Vec<PackageId> = market
        .list_packages(designer)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(listed, vec![basic.id]);

    let result = market
        .create_offer(request.id, designer, vec![basic.id, premium.id], common::day(4))
        .await;
    assert!(matches!(result, Err(MarketError::Validation(e)) if e.contains(Rule::UnknownPackage)));
}

#[tokio::test]
async fn test_pick_of_package_not_in_offer() {
    let market = common::marketplace();
    let request = common::open_request(&market).await;
    let designer = DesignerId::new();
    let offered = common::package(&market, designer, "Basic", 1_000_000).await;
    let other = common::package(&market, designer, "Other", 1_200_000).await;
    let receipt = market
        .create_offer(request.id, designer, vec![offered.id], common::day(2))
        .await
        .unwrap();

    let result = market.offers().pick(receipt.id, other.id).await;
    assert!(matches!(result, Err(MarketError::Validation(e)) if e.contains(Rule::PackageNotOffered)));
    assert_eq!(
        market.request_status(request.id).await.unwrap(),
        RequestStatus::Created
    );
}
