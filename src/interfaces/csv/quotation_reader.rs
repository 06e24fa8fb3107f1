use crate::domain::pricing::{QuotationDraft, RevisionAllowance};
use crate::error::{MarketError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;

/// One quotation candidate as it appears in a batch file. Empty cells are
/// missing fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuotationRow {
    pub id: String,
    pub price: Option<u64>,
    pub delivery_within: Option<u32>,
    pub revision_time: Option<u32>,
    pub extra_revision_price: Option<u64>,
    pub acceptance_deadline: Option<NaiveDate>,
    pub note: Option<String>,
}

impl QuotationRow {
    /// The form draft for this row. Revision counts above the unlimited
    /// sentinel are clamped to it, as the form input does.
    pub fn into_draft(self) -> QuotationDraft {
        QuotationDraft {
            price: self.price,
            delivery_within: self.delivery_within,
            revision_time: self.revision_time.map(RevisionAllowance::clamp_raw),
            extra_revision_price: self.extra_revision_price,
            acceptance_deadline: self.acceptance_deadline,
            note: self.note,
        }
    }
}

/// Reads quotation candidates from a CSV source.
///
/// Whitespace is trimmed and short records are accepted.
pub struct QuotationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> QuotationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes rows. A bad row yields an error and reading continues.
    pub fn rows(self) -> impl Iterator<Item = Result<QuotationRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(MarketError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::UNLIMITED_REVISIONS;

    const HEADER: &str =
        "id, price, delivery_within, revision_time, extra_revision_price, acceptance_deadline, note";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\nq1, 1500000, 14, 3, 200000, 2026-10-16, rush order\nq2, 900000, 7, , , 2026-10-20,"
        );
        let rows: Vec<Result<QuotationRow>> = QuotationReader::new(data.as_bytes()).rows().collect();
        assert_eq!(rows.len(), 2);

        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.id, "q1");
        assert_eq!(first.price, Some(1_500_000));
        assert_eq!(first.note.as_deref(), Some("rush order"));
        assert_eq!(first.acceptance_deadline, NaiveDate::from_ymd_opt(2026, 10, 16));

        let second = rows[1].as_ref().unwrap();
        assert_eq!(second.revision_time, None);
        assert_eq!(second.extra_revision_price, None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}\nq1, lots, 14, 3, 0, 2026-10-16,\nq2, 900000, 7, 1, 10000, 2026-10-20,");
        let rows: Vec<Result<QuotationRow>> = QuotationReader::new(data.as_bytes()).rows().collect();
        assert!(rows[0].is_err());
        assert!(rows[1].is_ok());
    }

    #[test]
    fn test_draft_clamps_revisions() {
        let data = format!("{HEADER}\nq1, 1500000, 14, 25000, , 2026-10-16,");
        let row = QuotationReader::new(data.as_bytes())
            .rows()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(row.into_draft().revision_time, Some(UNLIMITED_REVISIONS));
    }
}
