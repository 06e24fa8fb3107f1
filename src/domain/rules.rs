//! Rule identifiers reported by validation.
//!
//! Validation never stops at the first problem: every violated rule is
//! collected into [`ValidationErrors`] so a form can show all of them at once.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    PriceRequired,
    PriceRange,
    DeliveryRequired,
    DeliveryRange,
    RevisionRequired,
    RevisionRange,
    ExtraRevisionPriceRequired,
    ExtraRevisionPriceMin,
    CombinedCap,
    DeadlineRequired,
    DeadlineTooSoon,
    NoLineItems,
    EmptyPackageSet,
    UnknownPackage,
    PackageNotOffered,
    PackageNameRequired,
    RequestNotOpen,
    OfferExpired,
    QuotationExpired,
}

impl Rule {
    /// Stable identifier, suitable for matching in a UI or a report.
    pub fn as_str(self) -> &'static str {
        match self {
            Rule::PriceRequired => "price_required",
            Rule::PriceRange => "price_range",
            Rule::DeliveryRequired => "delivery_required",
            Rule::DeliveryRange => "delivery_range",
            Rule::RevisionRequired => "revision_required",
            Rule::RevisionRange => "revision_range",
            Rule::ExtraRevisionPriceRequired => "extra_revision_price_required",
            Rule::ExtraRevisionPriceMin => "extra_revision_price_min",
            Rule::CombinedCap => "combined_cap",
            Rule::DeadlineRequired => "deadline_required",
            Rule::DeadlineTooSoon => "deadline_too_soon",
            Rule::NoLineItems => "no_line_items",
            Rule::EmptyPackageSet => "empty_package_set",
            Rule::UnknownPackage => "unknown_package",
            Rule::PackageNotOffered => "package_not_offered",
            Rule::PackageNameRequired => "package_name_required",
            Rule::RequestNotOpen => "request_not_open",
            Rule::OfferExpired => "offer_expired",
            Rule::QuotationExpired => "quotation_expired",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Rule::PriceRequired => "price is required",
            Rule::PriceRange => "price must be between 10,000 and 200,000,000 VND",
            Rule::DeliveryRequired => "delivery time is required",
            Rule::DeliveryRange => "delivery time must be between 1 and 99 days",
            Rule::RevisionRequired => "revision count is required",
            Rule::RevisionRange => "revision count must be between 1 and 9999",
            Rule::ExtraRevisionPriceRequired => "extra revision price is required",
            Rule::ExtraRevisionPriceMin => "extra revision price must be at least 10,000 VND",
            Rule::CombinedCap => "price plus extra revision price must not exceed 200,000,000 VND",
            Rule::DeadlineRequired => "acceptance deadline is required",
            Rule::DeadlineTooSoon => "acceptance deadline must be later than tomorrow",
            Rule::NoLineItems => "a design request needs at least one garment",
            Rule::EmptyPackageSet => "an offer needs at least one package",
            Rule::UnknownPackage => "package does not exist or was deleted",
            Rule::PackageNotOffered => "package is not part of an accepted offer for this request",
            Rule::PackageNameRequired => "package name is required",
            Rule::RequestNotOpen => "the design request no longer accepts offers",
            Rule::OfferExpired => "the offer's acceptance deadline has passed",
            Rule::QuotationExpired => "the quotation's acceptance deadline has passed",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Every rule a candidate violated, in the order they were checked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<Rule>);

impl ValidationErrors {
    pub fn rules(&self) -> &[Rule] {
        &self.0
    }

    pub fn contains(&self, rule: Rule) -> bool {
        self.0.contains(&rule)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Rule> {
        self.0
    }
}

impl From<Vec<Rule>> for ValidationErrors {
    fn from(rules: Vec<Rule>) -> Self {
        Self(rules)
    }
}

impl From<Rule> for ValidationErrors {
    fn from(rule: Rule) -> Self {
        Self(vec![rule])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.0.iter().map(|rule| rule.as_str()).collect();
        f.write_str(&ids.join(", "))
    }
}
