//! # Output Sinks
//!
//! A sink turns a [`ComposedDocument`] into bytes. Composition itself can't
//! fail; writing can, and a failed write is always reported to the caller.

use std::io::Write;

use chrono::NaiveDate;

use crate::error::ReportError;
use crate::layout::ComposedDocument;
use crate::model::Patient;

pub trait OutputSink {
    /// Serialize `document` into `out`.
    fn write_document(&self, document: &ComposedDocument, out: &mut dyn Write) -> Result<(), ReportError>;

    /// Serialize into a fresh byte vector.
    fn to_bytes(&self, document: &ComposedDocument) -> Result<Vec<u8>, ReportError> {
        let mut buf = Vec::new();
        self.write_document(document, &mut buf)?;
        Ok(buf)
    }
}

/// Conventional download name: `HemoScan_Report_<age>y_<F|M>_<date>.pdf`.
pub fn report_file_name(patient: &Patient, date: NaiveDate) -> String {
    format!(
        "HemoScan_Report_{}y_{}_{}.pdf",
        patient.age,
        patient.gender_code.initial(),
        date.format("%Y-%m-%d")
    )
}
