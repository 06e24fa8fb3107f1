mod common;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uniform_desk::domain::pricing::{
    self, PRICE_CAP, QuotationDraft, UNLIMITED_REVISIONS,
};
use uniform_desk::domain::money::Vnd;
use uniform_desk::domain::request::RequestStatus;
use uniform_desk::domain::rules::Rule;

const ROUNDS: usize = 2_000;

fn random_draft(rng: &mut StdRng) -> QuotationDraft {
    QuotationDraft {
        price: rng.gen_bool(0.95).then(|| rng.gen_range(0..=250_000_000)),
        delivery_within: rng.gen_bool(0.95).then(|| rng.gen_range(0..=120)),
        revision_time: rng.gen_bool(0.95).then(|| {
            if rng.gen_bool(0.2) {
                UNLIMITED_REVISIONS
            } else {
                rng.gen_range(0..=12_000)
            }
        }),
        extra_revision_price: rng.gen_bool(0.9).then(|| rng.gen_range(0..=60_000_000)),
        acceptance_deadline: rng
            .gen_bool(0.95)
            .then(|| common::day(rng.gen_range(0..=30))),
        note: None,
    }
}

#[test]
fn test_price_out_of_range_always_reported() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..ROUNDS {
        let mut draft = random_draft(&mut rng);
        let price = if rng.gen_bool(0.5) {
            rng.gen_range(0..10_000)
        } else {
            rng.gen_range(PRICE_CAP + 1..=u64::from(u32::MAX))
        };
        draft.price = Some(price);

        let rules = pricing::validate_quotation(&draft, common::today()).unwrap_err();
        assert!(rules.contains(&Rule::PriceRange), "{draft:?}");
    }
}

#[test]
fn test_unlimited_revisions_force_zero_extra() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..ROUNDS {
        let mut draft = random_draft(&mut rng);
        draft.revision_time = Some(UNLIMITED_REVISIONS);

        match pricing::validate_quotation(&draft, common::today()) {
            Ok(quotation) => assert_eq!(quotation.extra_revision_price, Vnd::ZERO),
            Err(rules) => {
                assert!(!rules.contains(&Rule::ExtraRevisionPriceRequired));
                assert!(!rules.contains(&Rule::ExtraRevisionPriceMin));
                assert!(!rules.contains(&Rule::CombinedCap));
            }
        }
    }
}

#[test]
fn test_price_at_cap_forces_zero_extra() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..ROUNDS {
        let mut draft = random_draft(&mut rng);
        draft.price = Some(PRICE_CAP);

        match pricing::validate_quotation(&draft, common::today()) {
            Ok(quotation) => assert_eq!(quotation.extra_revision_price, Vnd::ZERO),
            Err(rules) => assert!(!rules.contains(&Rule::CombinedCap)),
        }
    }
}

#[test]
fn test_combined_cap_when_extra_applies() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..ROUNDS {
        let mut draft = random_draft(&mut rng);
        let price = rng.gen_range(10_000..PRICE_CAP);
        let extra = rng.gen_range(10_000..=50_000_000);
        draft.price = Some(price);
        draft.extra_revision_price = Some(extra);
        draft.revision_time = Some(rng.gen_range(1..UNLIMITED_REVISIONS));

        let over = price + extra > PRICE_CAP;
        let reported = match pricing::validate_quotation(&draft, common::today()) {
            Ok(_) => false,
            Err(rules) => rules.contains(&Rule::CombinedCap),
        };
        assert_eq!(reported, over, "price {price} extra {extra}");
    }
}

#[test]
fn test_deadline_threshold() {
    for offset in 0..10 {
        let draft = QuotationDraft {
            acceptance_deadline: Some(common::day(offset)),
            ..common::draft()
        };
        let result = pricing::validate_quotation(&draft, common::today());
        assert_eq!(result.is_ok(), offset >= 2, "offset {offset}");
    }
}

#[test]
fn test_terminal_statuses_are_final() {
    let all = [
        RequestStatus::Created,
        RequestStatus::Pending,
        RequestStatus::Imported,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];
    for from in [RequestStatus::Completed, RequestStatus::Cancelled] {
        for to in all {
            assert!(from.transition(to).is_err(), "{from} -> {to}");
        }
    }
}
