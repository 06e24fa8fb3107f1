use crate::domain::pricing::ValidatedQuotation;
use crate::domain::rules::Rule;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ReportRecord<'a> {
    id: &'a str,
    valid: bool,
    price: Option<u64>,
    extra_revision_price: Option<u64>,
    violations: String,
}

/// Writes one report line per validated quotation candidate.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// A candidate that passed: the normalized price and extra revision price.
    pub fn write_valid(&mut self, id: &str, quotation: &ValidatedQuotation) -> Result<()> {
        self.writer.serialize(ReportRecord {
            id,
            valid: true,
            price: Some(quotation.price.value()),
            extra_revision_price: Some(quotation.extra_revision_price.value()),
            violations: String::new(),
        })?;
        Ok(())
    }

    /// A candidate that failed, with every broken rule separated by `;`.
    pub fn write_invalid(&mut self, id: &str, rules: &[Rule]) -> Result<()> {
        let violations = rules
            .iter()
            .map(|rule| rule.as_str())
            .collect::<Vec<_>>()
            .join(";");
        self.writer.serialize(ReportRecord {
            id,
            valid: false,
            price: None,
            extra_revision_price: None,
            violations,
        })?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
