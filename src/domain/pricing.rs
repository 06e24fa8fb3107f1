//! Pricing rules a quotation (or catalog package) must satisfy before it is
//! allowed to exist.
//!
//! Validation is pure: it takes the raw form fields plus the submission date
//! and either returns a normalized [`ValidatedQuotation`] or every [`Rule`]
//! the candidate broke.

use crate::domain::money::Vnd;
use crate::domain::rules::Rule;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub const MIN_PRICE: u64 = 10_000;
/// The price cap.
pub const PRICE_CAP: u64 = 200_000_000;
pub const MIN_DELIVERY_DAYS: u32 = 1;
pub const MAX_DELIVERY_DAYS: u32 = 99;
pub const MIN_REVISIONS: u32 = 1;
/// Sentinel revision count meaning "unlimited".
pub const UNLIMITED_REVISIONS: u32 = 9_999;
pub const MIN_EXTRA_REVISION_PRICE: u64 = 10_000;

/// How many revisions a designer includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RevisionAllowance {
    Limited(u16),
    Unlimited,
}

impl RevisionAllowance {
    /// Clamps a raw form value to the sentinel, as forms do before validation.
    pub fn clamp_raw(raw: u32) -> u32 {
        raw.min(UNLIMITED_REVISIONS)
    }

    pub fn is_unlimited(self) -> bool {
        self == RevisionAllowance::Unlimited
    }
}

impl TryFrom<u32> for RevisionAllowance {
    type Error = Rule;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            UNLIMITED_REVISIONS => Ok(RevisionAllowance::Unlimited),
            MIN_REVISIONS..UNLIMITED_REVISIONS => u16::try_from(value)
                .map(RevisionAllowance::Limited)
                .map_err(|_| Rule::RevisionRange),
            _ => Err(Rule::RevisionRange),
        }
    }
}

impl From<RevisionAllowance> for u32 {
    fn from(value: RevisionAllowance) -> Self {
        match value {
            RevisionAllowance::Limited(count) => u32::from(count),
            RevisionAllowance::Unlimited => UNLIMITED_REVISIONS,
        }
    }
}

/// Raw quotation form fields. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationDraft {
    pub price: Option<u64>,
    pub delivery_within: Option<u32>,
    pub revision_time: Option<u32>,
    pub extra_revision_price: Option<u64>,
    pub acceptance_deadline: Option<NaiveDate>,
    pub note: Option<String>,
}

/// A quotation candidate that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedQuotation {
    pub price: Vnd,
    pub delivery_within: u16,
    pub revision_time: RevisionAllowance,
    /// Zero when revisions are unlimited or the price sits at the cap.
    pub extra_revision_price: Vnd,
    pub acceptance_deadline: NaiveDate,
    pub note: Option<String>,
}

/// Earliest acceptance deadline accepted on `today`: the day after tomorrow.
pub fn earliest_deadline(today: NaiveDate) -> Option<NaiveDate> {
    today.checked_add_days(Days::new(2))
}

/// The deadline must fall strictly after tomorrow.
pub fn check_deadline(deadline: NaiveDate, today: NaiveDate) -> Option<Rule> {
    match earliest_deadline(today) {
        Some(earliest) if deadline >= earliest => None,
        _ => Some(Rule::DeadlineTooSoon),
    }
}

fn check_price(price: Option<u64>, rules: &mut Vec<Rule>) -> Option<Vnd> {
    match price {
        None => {
            rules.push(Rule::PriceRequired);
            None
        }
        Some(p) if !(MIN_PRICE..=PRICE_CAP).contains(&p) => {
            rules.push(Rule::PriceRange);
            None
        }
        Some(p) => Some(Vnd::new(p)),
    }
}

fn check_delivery(days: Option<u32>, rules: &mut Vec<Rule>) -> Option<u16> {
    match days {
        None => {
            rules.push(Rule::DeliveryRequired);
            None
        }
        Some(d) if !(MIN_DELIVERY_DAYS..=MAX_DELIVERY_DAYS).contains(&d) => {
            rules.push(Rule::DeliveryRange);
            None
        }
        Some(d) => u16::try_from(d).ok(),
    }
}

fn check_revisions(revisions: Option<u32>, rules: &mut Vec<Rule>) -> Option<RevisionAllowance> {
    match revisions.map(RevisionAllowance::try_from) {
        None => {
            rules.push(Rule::RevisionRequired);
            None
        }
        Some(Err(rule)) => {
            rules.push(rule);
            None
        }
        Some(Ok(allowance)) => Some(allowance),
    }
}

/// Extra revisions are free when revisions are unlimited or the price is
/// already at the cap.
pub fn extra_revision_exempt(price: Option<u64>, revisions: Option<u32>) -> bool {
    revisions == Some(UNLIMITED_REVISIONS) || price.is_some_and(|p| p >= PRICE_CAP)
}

/// Validates a quotation draft submitted on `today`.
///
/// Every violated rule is reported, in field order.
pub fn validate_quotation(
    draft: &QuotationDraft,
    today: NaiveDate,
) -> Result<ValidatedQuotation, Vec<Rule>> {
    let mut rules = Vec::new();

    let price = check_price(draft.price, &mut rules);
    let delivery_within = check_delivery(draft.delivery_within, &mut rules);
    let revision_time = check_revisions(draft.revision_time, &mut rules);

    let extra_revision_price = if extra_revision_exempt(draft.price, draft.revision_time) {
        0
    } else {
        match draft.extra_revision_price {
            None => {
                rules.push(Rule::ExtraRevisionPriceRequired);
                0
            }
            Some(extra) => {
                if extra < MIN_EXTRA_REVISION_PRICE {
                    rules.push(Rule::ExtraRevisionPriceMin);
                }
                if let Some(price) = draft.price
                    && price.saturating_add(extra) > PRICE_CAP
                {
                    rules.push(Rule::CombinedCap);
                }
                extra
            }
        }
    };

    let acceptance_deadline = match draft.acceptance_deadline {
        None => {
            rules.push(Rule::DeadlineRequired);
            None
        }
        Some(deadline) => match check_deadline(deadline, today) {
            Some(rule) => {
                rules.push(rule);
                None
            }
            None => Some(deadline),
        },
    };

    // A missing value always comes with the rule that rejected it.
    let (Some(price), Some(delivery_within), Some(revision_time), Some(acceptance_deadline)) =
        (price, delivery_within, revision_time, acceptance_deadline)
    else {
        return Err(rules);
    };
    if !rules.is_empty() {
        return Err(rules);
    }

    Ok(ValidatedQuotation {
        price,
        delivery_within,
        revision_time,
        extra_revision_price: Vnd::new(extra_revision_price),
        acceptance_deadline,
        note: draft
            .note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(str::to_string),
    })
}

/// Applies the price, delivery and revision bounds to catalog package terms.
pub fn validate_package_terms(
    fee: u64,
    delivery_days: u32,
    revisions: u32,
) -> Result<(Vnd, u16, RevisionAllowance), Vec<Rule>> {
    let mut rules = Vec::new();
    let fee = check_price(Some(fee), &mut rules);
    let days = check_delivery(Some(delivery_days), &mut rules);
    let allowance = check_revisions(Some(revisions), &mut rules);

    match (fee, days, allowance) {
        (Some(fee), Some(days), Some(allowance)) => Ok((fee, days, allowance)),
        _ => Err(rules),
    }
}
