//! # HemoScan Report
//!
//! A paginated layout engine for anemia screening reports.
//!
//! A screening result arrives as one structured record. The engine flows it
//! into fixed-size pages (banner, patient data, classification, colored
//! probability bars, risk-factor table, forecast bars, wrapped
//! recommendations, alerts) and stamps every page with a footer once the
//! page count is known. Everything happens in memory; no server round-trip.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    : ReportModel: patient, classification, sections
//!       ↓
//!   [layout]   : Composer → block renderers → page cursor
//!       ↓          (text measures wrapped paragraphs)
//!   [pdf]      : Serialize pages to PDF bytes (an OutputSink)
//! ```
//!
//! Composition is pure and single-threaded: each call owns its own state,
//! so independent reports can be composed concurrently without locking.

pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod sink;
pub mod style;
pub mod text;

use chrono::NaiveDateTime;

use config::ReportConfig;
use error::ReportError;
use layout::{ComposedDocument, DocumentComposer};
use model::ReportModel;
use pdf::PdfSink;
use sink::OutputSink;

/// Lay out a report into pages of draw operations.
pub fn compose(model: &ReportModel, config: &ReportConfig, generated_at: NaiveDateTime) -> ComposedDocument {
    DocumentComposer::new(config.clone())
        .generated_at(generated_at)
        .compose(model)
}

/// Render a report to PDF bytes.
///
/// This is the primary entry point.
pub fn render(model: &ReportModel, config: &ReportConfig, generated_at: NaiveDateTime) -> Result<Vec<u8>, ReportError> {
    let document = compose(model, config, generated_at);
    PdfSink::new().to_bytes(&document)
}

/// Render a report described as JSON to PDF bytes.
pub fn render_json(json: &str, config: &ReportConfig, generated_at: NaiveDateTime) -> Result<Vec<u8>, ReportError> {
    let model: ReportModel = serde_json::from_str(json)?;
    render(&model, config, generated_at)
}
