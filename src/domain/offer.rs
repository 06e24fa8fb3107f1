use crate::domain::ids::{DesignerId, PackageId, ReceiptId, RequestId};
use crate::domain::money::Vnd;
use crate::domain::pricing::{self, RevisionAllowance};
use crate::domain::rules::Rule;
use crate::error::{MarketError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A designer-authored catalog entry, reusable across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub designer: DesignerId,
    pub name: String,
    pub header: Option<String>,
    pub fee: Vnd,
    pub delivery_duration: u16,
    pub revision_time: RevisionAllowance,
    /// Soft-deleted packages stay addressable but are hidden from listings.
    pub deleted: bool,
}

/// Terms a designer fills in when publishing a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageTerms {
    pub name: String,
    pub header: Option<String>,
    pub fee: u64,
    pub delivery_duration: u32,
    pub revision_time: u32,
}

impl Package {
    pub fn new(designer: DesignerId, terms: PackageTerms) -> Result<Self> {
        let name = terms.name.trim().to_string();
        let mut rules = Vec::new();
        if name.is_empty() {
            rules.push(Rule::PackageNameRequired);
        }

        let priced = pricing::validate_package_terms(
            terms.fee,
            terms.delivery_duration,
            RevisionAllowance::clamp_raw(terms.revision_time),
        );
        match priced {
            Ok((fee, delivery_duration, revision_time)) if rules.is_empty() => Ok(Self {
                id: PackageId::new(),
                designer,
                name,
                header: terms.header,
                fee,
                delivery_duration,
                revision_time,
                deleted: false,
            }),
            Ok(_) => Err(MarketError::validation(rules)),
            Err(violations) => {
                rules.extend(violations);
                Err(MarketError::validation(rules))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ReceiptStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "pending",
            ReceiptStatus::Accepted => "accepted",
            ReceiptStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A designer's formal offer of one or more packages for a request.
///
/// Read-only after creation except for its single status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestReceipt {
    pub id: ReceiptId,
    pub request: RequestId,
    pub designer: DesignerId,
    packages: Vec<PackageId>,
    pub acceptance_deadline: NaiveDate,
    status: ReceiptStatus,
    pub created_at: DateTime<Utc>,
}

impl RequestReceipt {
    /// Builds an offer. Duplicate package ids collapse, first occurrence wins.
    pub fn new(
        request: RequestId,
        designer: DesignerId,
        packages: impl IntoIterator<Item = PackageId>,
        acceptance_deadline: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let mut unique: Vec<PackageId> = Vec::new();
        for package in packages {
            if !unique.contains(&package) {
                unique.push(package);
            }
        }

        let mut rules = Vec::new();
        if unique.is_empty() {
            rules.push(Rule::EmptyPackageSet);
        }
        rules.extend(pricing::check_deadline(
            acceptance_deadline,
            created_at.date_naive(),
        ));
        if !rules.is_empty() {
            return Err(MarketError::validation(rules));
        }

        Ok(Self {
            id: ReceiptId::new(),
            request,
            designer,
            packages: unique,
            acceptance_deadline,
            status: ReceiptStatus::Pending,
            created_at,
        })
    }

    pub fn packages(&self) -> &[PackageId] {
        &self.packages
    }

    pub fn offers(&self, package: PackageId) -> bool {
        self.packages.contains(&package)
    }

    pub fn status(&self) -> ReceiptStatus {
        self.status
    }

    pub fn accept(&mut self) -> Result<()> {
        self.settle(ReceiptStatus::Accepted)
    }

    pub fn reject(&mut self) -> Result<()> {
        self.settle(ReceiptStatus::Rejected)
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.acceptance_deadline
    }

    pub(crate) fn reopen(&mut self) {
        if self.status == ReceiptStatus::Accepted {
            self.status = ReceiptStatus::Pending;
        }
    }

    fn settle(&mut self, next: ReceiptStatus) -> Result<()> {
        if self.status != ReceiptStatus::Pending {
            return Err(MarketError::IllegalStateTransition {
                from: self.status.as_str(),
                to: next.as_str(),
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap()
    }

    fn in_days(days: u64) -> NaiveDate {
        now().date_naive().checked_add_days(Days::new(days)).unwrap()
    }

    fn terms() -> PackageTerms {
        PackageTerms {
            name: "Basic".to_string(),
            header: Some("Two concepts, one fitting".to_string()),
            fee: 3_000_000,
            delivery_duration: 21,
            revision_time: 2,
        }
    }

    #[test]
    fn test_package_new_validates_terms() {
        let package = Package::new(DesignerId::new(), terms()).unwrap();
        assert_eq!(package.fee, Vnd::new(3_000_000));
        assert!(!package.deleted);

        let result = Package::new(
            DesignerId::new(),
            PackageTerms {
                name: "  ".to_string(),
                fee: 500,
                ..terms()
            },
        );
        match result {
            Err(MarketError::Validation(errors)) => {
                assert_eq!(errors.rules(), &[Rule::PackageNameRequired, Rule::PriceRange]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_package_clamps_revisions() {
        let package = Package::new(
            DesignerId::new(),
            PackageTerms {
                revision_time: 20_000,
                ..terms()
            },
        )
        .unwrap();
        assert_eq!(package.revision_time, RevisionAllowance::Unlimited);
    }

    #[test]
    fn test_receipt_requires_packages_and_deadline() {
        let result = RequestReceipt::new(
            RequestId::new(),
            DesignerId::new(),
            Vec::new(),
            in_days(1),
            now(),
        );
        match result {
            Err(MarketError::Validation(errors)) => {
                assert_eq!(errors.rules(), &[Rule::EmptyPackageSet, Rule::DeadlineTooSoon]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_receipt_dedups_packages() {
        let a = PackageId::new();
        let b = PackageId::new();
        let receipt =
            RequestReceipt::new(RequestId::new(), DesignerId::new(), [a, b, a], in_days(5), now())
                .unwrap();
        assert_eq!(receipt.packages(), &[a, b]);
        assert!(receipt.offers(b));
        assert!(!receipt.offers(PackageId::new()));
    }

    #[test]
    fn test_receipt_settles_once() {
        let mut receipt = RequestReceipt::new(
            RequestId::new(),
            DesignerId::new(),
            [PackageId::new()],
            in_days(5),
            now(),
        )
        .unwrap();
        receipt.accept().unwrap();
        assert!(receipt.reject().is_err());
        assert_eq!(receipt.status(), ReceiptStatus::Accepted);
    }

    #[test]
    fn test_receipt_expiry_and_reopen() {
        let mut receipt = RequestReceipt::new(
            RequestId::new(),
            DesignerId::new(),
            [PackageId::new()],
            in_days(5),
            now(),
        )
        .unwrap();
        assert!(!receipt.is_expired(in_days(5)));
        assert!(receipt.is_expired(in_days(6)));

        receipt.accept().unwrap();
        receipt.reopen();
        assert_eq!(receipt.status(), ReceiptStatus::Pending);
        receipt.reject().unwrap();
        receipt.reopen();
        assert_eq!(receipt.status(), ReceiptStatus::Rejected);
    }
}
