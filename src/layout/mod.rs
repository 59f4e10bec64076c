//! # Page-Flow Layout
//!
//! Turns a [`ReportModel`](crate::model::ReportModel) into pages of
//! positioned primitives.
//!
//! The layout never builds an infinitely tall canvas that gets sliced
//! afterwards. Every block is measured first, and then asks the
//! [`PageCursor`] whether it fits:
//!
//! 1. Measure the block's height
//! 2. `reserve(height)`: does it end above the near-bottom cutoff?
//! 3. If not, start a new page and draw at the fresh top margin
//! 4. Emit primitives, then `advance(height)`
//!
//! That check-then-commit step is the only page-break rule, and every
//! block type goes through it. Page footers need the final page count, so
//! they are stamped in a separate pass once the flow is finished.

pub mod blocks;
pub mod composer;
pub mod cursor;

pub use composer::{ComposerState, DocumentComposer};
pub use cursor::PageCursor;

use serde::Serialize;

use crate::config::PageGeometry;
use crate::style::Color;

/// A single drawing instruction in page coordinates (points, origin at the
/// top-left corner).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DrawOp {
    /// One line of text; `y` is the baseline.
    #[serde(rename_all = "camelCase")]
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
        bold: bool,
        color: Color,
    },
    /// A filled rectangle; `y` is the top edge.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Color,
    },
    /// A stroked straight line.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
}

impl DrawOp {
    /// The text content, if this is a text op.
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// A primitive tagged with the page it was drawn on (1-based).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOp {
    pub page: usize,
    pub op: DrawOp,
}

/// A finished page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(DrawOp::text)
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

/// Document-level metadata handed to the output sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub subject: String,
}

/// The complete output of composition: every page in order, footers
/// included.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedDocument {
    pub geometry: PageGeometry,
    pub metadata: Metadata,
    pub pages: Vec<Page>,
}

impl ComposedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages (1-based numbers) whose text contains `needle`.
    pub fn pages_containing(&self, needle: &str) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.contains_text(needle))
            .map(|p| p.number)
            .collect()
    }
}
