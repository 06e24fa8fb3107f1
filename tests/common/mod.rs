#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use uniform_desk::application::marketplace::Marketplace;
use uniform_desk::domain::ids::{DesignerId, FabricId, SchoolId};
use uniform_desk::domain::offer::{Package, PackageTerms};
use uniform_desk::domain::pricing::QuotationDraft;
use uniform_desk::domain::request::{
    DesignRequest, GarmentCategory, GarmentLineItem, GarmentType, Gender,
};
use uniform_desk::infrastructure::clock::SteppingClock;

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap()
}

pub fn today() -> NaiveDate {
    start().date_naive()
}

pub fn day(offset: u64) -> NaiveDate {
    today().checked_add_days(chrono::Days::new(offset)).unwrap()
}

pub fn marketplace() -> Marketplace {
    Marketplace::with_clock(Arc::new(SteppingClock::starting_at(start())))
}

pub fn item(garment: GarmentType) -> GarmentLineItem {
    GarmentLineItem {
        garment,
        category: GarmentCategory::Regular,
        gender: Gender::Girl,
        color: "navy".to_string(),
        fabric: FabricId::new(),
        logo_position: None,
        note: None,
        images: Vec::new(),
    }
}

pub async fn open_request(market: &Marketplace) -> DesignRequest {
    market
        .requests()
        .create(
            SchoolId::new(),
            vec![item(GarmentType::Shirt), item(GarmentType::Skirt)],
            Some("logos/school.png".to_string()),
        )
        .await
        .unwrap()
}

pub fn draft() -> QuotationDraft {
    QuotationDraft {
        price: Some(1_500_000),
        delivery_within: Some(14),
        revision_time: Some(3),
        extra_revision_price: Some(200_000),
        acceptance_deadline: Some(day(2)),
        note: Some("Two fittings included".to_string()),
    }
}

pub async fn package(market: &Marketplace, designer: DesignerId, name: &str, fee: u64) -> Package {
    market
        .offers()
        .publish_package(
            designer,
            PackageTerms {
                name: name.to_string(),
                header: None,
                fee,
                delivery_duration: 21,
                revision_time: 2,
            },
        )
        .await
        .unwrap()
}

/// Writes a quotation batch with `rows` valid candidates.
pub fn generate_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record([
        "id",
        "price",
        "delivery_within",
        "revision_time",
        "extra_revision_price",
        "acceptance_deadline",
        "note",
    ])?;

    for i in 1..=rows {
        wtr.write_record([
            format!("q{i}"),
            (1_000_000 + i as u64 * 1_000).to_string(),
            "14".to_string(),
            "3".to_string(),
            "100000".to_string(),
            day(5).to_string(),
            String::new(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
