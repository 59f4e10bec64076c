//! # Page Cursor
//!
//! Tracks where we are in the flow: which page, and how far down it.
//! Blocks ask the cursor whether they fit before drawing anything.

use log::debug;

use crate::config::PageGeometry;

/// What to do with a block of a given height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Draw on the current page.
    Place,
    /// Start a new page and draw at its top margin.
    MoveToNextPage,
}

/// Current page index and vertical offset.
///
/// `y` only grows within a page and snaps back to the top margin when a
/// new page starts. Page indices are 1-based and contiguous.
#[derive(Debug, Clone)]
pub struct PageCursor {
    geometry: PageGeometry,
    page: usize,
    y: f64,
    /// Set after a heading: the next block stays on this page.
    anchored: bool,
}

impl PageCursor {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            page: 1,
            y: geometry.margin_top,
            anchored: false,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Space left above the near-bottom cutoff.
    pub fn remaining_height(&self) -> f64 {
        (self.geometry.content_bottom - self.y).max(0.0)
    }

    /// True if a block of `height` ends at or above the cutoff. Never mutates.
    pub fn reserve(&self, height: f64) -> bool {
        self.y + height <= self.geometry.content_bottom
    }

    /// Commit a drawn block.
    pub fn advance(&mut self, height: f64) {
        self.y += height.max(0.0);
        self.anchored = false;
    }

    /// Bind the block drawn last to the next one. The next block is placed
    /// on this page even if it overruns the cutoff. Cleared by the next
    /// `advance`.
    pub fn keep_with_next(&mut self) {
        self.anchored = true;
    }

    /// Move down to an absolute offset; never moves up.
    pub fn advance_to(&mut self, y: f64) {
        if y > self.y {
            self.y = y;
        }
    }

    pub fn new_page(&mut self) {
        self.page += 1;
        self.y = self.geometry.margin_top;
        self.anchored = false;
        debug!("page break: now on page {}", self.page);
    }

    /// Decide where a block of `height` goes.
    ///
    /// A block that doesn't fit moves to a new page, unless the cursor is
    /// already at the top margin: then nothing would be gained, and the
    /// block is placed and allowed to overrun the cutoff. The same holds
    /// right after a [`keep_with_next`](Self::keep_with_next) block.
    pub fn decide(&self, height: f64) -> BreakDecision {
        if self.reserve(height) || self.y <= self.geometry.margin_top || self.anchored {
            BreakDecision::Place
        } else {
            BreakDecision::MoveToNextPage
        }
    }

    /// Apply [`decide`](Self::decide). Returns the top of the block.
    pub fn make_room(&mut self, height: f64) -> f64 {
        if self.decide(height) == BreakDecision::MoveToNextPage {
            self.new_page();
        }
        self.y
    }
}
