//! # Block Renderers
//!
//! One renderer per kind of content. Each follows the same steps: measure,
//! make room on the cursor (possibly starting a new page), emit primitives
//! tagged with the page they landed on, then advance the cursor.
//!
//! Multi-row blocks (probability bars, table rows, recommendations, alerts)
//! make room per row or per entry, so a list may continue on the next page
//! between items but never inside one.

use log::warn;

use crate::config::{PageGeometry, ReportConfig};
use crate::font;
use crate::model::{Alert, FutureRisk, Probabilities, Recommendation, RiskFactor, SeverityLabel};
use crate::style::{self, Color};
use crate::text::TextMeasurer;

use super::{DrawOp, PageCursor, PlacedOp};

// ── Font sizes ──────────────────────────────────────────────────

pub const SECTION_TITLE_SIZE: f64 = 14.0;
pub const SUBSECTION_TITLE_SIZE: f64 = 12.0;
const BANNER_TITLE_SIZE: f64 = 22.0;
const BODY_SIZE: f64 = 10.0;
const SMALL_SIZE: f64 = 9.0;
const FOOTER_SIZE: f64 = 8.0;
const BADGE_SIZE: f64 = 16.0;

// ── Block geometry (points) ─────────────────────────────────────

const BANNER_HEIGHT: f64 = 99.0;
const BANNER_GAP: f64 = 14.0;
const BANNER_BASELINES: [f64; 3] = [51.0, 74.0, 91.0];

const HEADING_PADDING: f64 = 4.0;

const GRID_ROW_HEIGHT: f64 = 17.0;
/// Column offsets from the left margin.
const GRID_COLUMNS: [f64; 3] = [0.0, 187.0, 374.0];

const DIVIDER_GAP_ABOVE: f64 = 11.0;
const DIVIDER_GAP_BELOW: f64 = 28.0;
const DIVIDER_STROKE: f64 = 1.4;

const BADGE_HEIGHT: f64 = 23.0;

const PROB_ROW_HEIGHT: f64 = 23.0;
const PROB_BAR_HEIGHT: f64 = 14.0;
pub const PROB_BAR_MAX_WIDTH: f64 = 283.0;
const PROB_LABEL_OFFSET: f64 = 300.0;

const TABLE_HEADER_HEIGHT: f64 = 20.0;
const TABLE_ROW_HEIGHT: f64 = 17.0;
const TABLE_COLUMNS: [f64; 4] = [6.0, 159.0, 258.0, 414.0];
const TABLE_HEADERS: [&str; 4] = ["Parameter", "Value", "Normal Range", "Status"];

pub const FORECAST_AREA_HEIGHT: f64 = 80.0;
/// Smallest fill, in percent of the bar area, so a 0% bar is still visible.
pub const FORECAST_MIN_VISIBLE: f64 = 15.0;
const FORECAST_BAR_WIDTH: f64 = 48.0;
const FORECAST_COLUMNS: [f64; 3] = [0.0, 159.0, 317.0];
const FORECAST_CAPTION_GAP: f64 = 4.0;

const REC_INDENT: f64 = 17.0;
const REC_GAP: f64 = 8.5;

const ALERT_ROW_HEIGHT: f64 = 14.0;

/// Distance of the page-number stamp from the right page edge.
const FOOTER_PAGE_OFFSET: f64 = 85.0;

/// Space left after a list-like section.
pub const SECTION_GAP: f64 = 17.0;

/// One grid row: up to three `label: value` cells.
pub type GridRow = Vec<(String, String)>;

/// Clamp a percentage into `[0, 100]`. NaN becomes 0.
pub fn clamp_percent(value: f64, what: &str) -> f64 {
    let clamped = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    };
    if clamped != value {
        warn!("{} {} out of range, clamped to {}", what, value, clamped);
    }
    clamped
}

/// Probability bar width for a percentage.
pub fn bar_width(percentage: f64) -> f64 {
    clamp_percent(percentage, "probability") / 100.0 * PROB_BAR_MAX_WIDTH
}

/// Filled height of a forecast bar.
pub fn forecast_bar_height(value: f64) -> f64 {
    clamp_percent(value, "forecast risk").max(FORECAST_MIN_VISIBLE) / 100.0 * FORECAST_AREA_HEIGHT
}

/// Format a decimal with at most `places` fraction digits, dropping
/// trailing zeros.
pub fn format_decimal(value: f64, places: usize) -> String {
    let s = format!("{:.*}", places, value);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

fn baseline(top: f64, font_size: f64) -> f64 {
    top + font_size
}

fn text(x: f64, y: f64, content: impl Into<String>, font_size: f64, bold: bool, color: Color) -> DrawOp {
    DrawOp::Text {
        x,
        y,
        text: content.into(),
        font_size,
        bold,
        color,
    }
}

fn place(page: usize, ops: Vec<DrawOp>) -> Vec<PlacedOp> {
    ops.into_iter().map(|op| PlacedOp { page, op }).collect()
}

/// Renders blocks against one configuration.
pub struct BlockRenderer<'a> {
    config: &'a ReportConfig,
    measurer: TextMeasurer,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self {
            config,
            measurer: TextMeasurer::new(config.line_height_ratio),
        }
    }

    fn geometry(&self) -> &PageGeometry {
        &self.config.geometry
    }

    fn left(&self) -> f64 {
        self.geometry().margin_left
    }

    // ── Banner ──────────────────────────────────────────────────

    /// Full-bleed header on page 1. Drawn at a fixed position; it only
    /// pushes the cursor below itself.
    pub fn banner(&self, cursor: &mut PageCursor, generated_at: &str) -> Vec<PlacedOp> {
        debug_assert_eq!(cursor.page(), 1, "banner belongs on the first page");
        let left = self.left();
        let ops = vec![
            DrawOp::Rect {
                x: 0.0,
                y: 0.0,
                width: self.geometry().width,
                height: BANNER_HEIGHT,
                fill: style::BRAND,
            },
            text(left, BANNER_BASELINES[0], &self.config.title, BANNER_TITLE_SIZE, true, Color::WHITE),
            text(left, BANNER_BASELINES[1], &self.config.subtitle, BODY_SIZE, false, Color::WHITE),
            text(
                left,
                BANNER_BASELINES[2],
                format!("Generated: {}", generated_at),
                BODY_SIZE,
                false,
                Color::WHITE,
            ),
        ];
        cursor.advance_to(BANNER_HEIGHT + BANNER_GAP);
        place(cursor.page(), ops)
    }

    // ── Heading ─────────────────────────────────────────────────

    pub fn heading_height(&self, font_size: f64) -> f64 {
        self.measurer.line_height(font_size) + HEADING_PADDING
    }

    /// Section title. Makes room for `keep_with` more points so the title
    /// never ends up alone at the bottom of a page, and anchors the next
    /// block to it. A `keep_with` taller than a page is capped so the title
    /// starts a fresh page and the oversized block follows it there.
    pub fn heading(
        &self,
        cursor: &mut PageCursor,
        title: &str,
        font_size: f64,
        color: Color,
        keep_with: f64,
    ) -> Vec<PlacedOp> {
        let height = self.heading_height(font_size);
        let keep_with = keep_with.min(self.geometry().content_height() - height).max(0.0);
        let top = cursor.make_room(height + keep_with);
        let op = text(self.left(), baseline(top, font_size), title, font_size, true, color);
        cursor.advance(height);
        cursor.keep_with_next();
        place(cursor.page(), vec![op])
    }

    // ── Key/value grid ──────────────────────────────────────────

    pub fn grid_height(&self, rows: &[GridRow]) -> f64 {
        rows.len() as f64 * GRID_ROW_HEIGHT
    }

    /// Rows of up to three `label: value` cells at fixed column offsets.
    /// Cells past the third are dropped.
    pub fn key_value_grid(&self, cursor: &mut PageCursor, rows: &[GridRow]) -> Vec<PlacedOp> {
        let height = self.grid_height(rows);
        let top = cursor.make_room(height);
        let left = self.left();

        let mut ops = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let y = baseline(top + i as f64 * GRID_ROW_HEIGHT, BODY_SIZE);
            for ((label, value), offset) in row.iter().zip(GRID_COLUMNS) {
                ops.push(text(
                    left + offset,
                    y,
                    format!("{}: {}", label, value),
                    BODY_SIZE,
                    false,
                    style::INK,
                ));
            }
        }

        cursor.advance(height);
        place(cursor.page(), ops)
    }

    // ── Divider ─────────────────────────────────────────────────

    pub fn divider(&self, cursor: &mut PageCursor) -> Vec<PlacedOp> {
        let height = DIVIDER_GAP_ABOVE + DIVIDER_GAP_BELOW;
        let top = cursor.make_room(height);
        let y = top + DIVIDER_GAP_ABOVE;
        let op = DrawOp::Line {
            x1: self.left(),
            y1: y,
            x2: self.geometry().width - self.geometry().margin_right,
            y2: y,
            width: DIVIDER_STROKE,
            color: style::BRAND,
        };
        cursor.advance(height);
        place(cursor.page(), vec![op])
    }

    // ── Severity badge ──────────────────────────────────────────

    pub fn badge_height(&self) -> f64 {
        BADGE_HEIGHT
    }

    pub fn severity_badge(&self, cursor: &mut PageCursor, label: &SeverityLabel) -> Vec<PlacedOp> {
        let top = cursor.make_room(BADGE_HEIGHT);
        let op = text(
            self.left(),
            baseline(top, BADGE_SIZE),
            label.as_str(),
            BADGE_SIZE,
            true,
            style::label_color(label),
        );
        cursor.advance(BADGE_HEIGHT);
        place(cursor.page(), vec![op])
    }

    // ── Probability bars ────────────────────────────────────────

    pub fn probability_row_height(&self) -> f64 {
        PROB_ROW_HEIGHT
    }

    pub fn probability_bars(&self, cursor: &mut PageCursor, probabilities: &Probabilities) -> Vec<PlacedOp> {
        let left = self.left();
        let mut placed = Vec::new();

        for (label, raw) in probabilities.iter() {
            let pct = clamp_percent(raw, "probability");
            let top = cursor.make_room(PROB_ROW_HEIGHT);
            let ops = vec![
                DrawOp::Rect {
                    x: left,
                    y: top + (PROB_ROW_HEIGHT - PROB_BAR_HEIGHT) / 2.0,
                    width: bar_width(pct),
                    height: PROB_BAR_HEIGHT,
                    fill: style::label_color(label),
                },
                text(
                    left + PROB_LABEL_OFFSET,
                    baseline(top + 2.0, BODY_SIZE),
                    format!("{}: {}%", label, format_decimal(pct, 2)),
                    BODY_SIZE,
                    false,
                    style::INK,
                ),
            ];
            cursor.advance(PROB_ROW_HEIGHT);
            placed.extend(place(cursor.page(), ops));
        }

        cursor.advance(SECTION_GAP / 2.0);
        placed
    }

    // ── Risk-factor table ───────────────────────────────────────

    /// Header plus first row, the least that may start a table.
    pub fn table_lead_height(&self) -> f64 {
        TABLE_HEADER_HEIGHT + TABLE_ROW_HEIGHT
    }

    /// Shaded header, then one row per factor. Each row makes its own room;
    /// the header is drawn once and not repeated on continuation pages.
    pub fn table(&self, cursor: &mut PageCursor, factors: &[RiskFactor]) -> Vec<PlacedOp> {
        let left = self.left();
        let mut placed = Vec::new();

        let top = cursor.make_room(self.table_lead_height());
        let mut header = vec![DrawOp::Rect {
            x: left,
            y: top,
            width: self.geometry().content_width(),
            height: TABLE_HEADER_HEIGHT,
            fill: style::HEADER_FILL,
        }];
        for (title, offset) in TABLE_HEADERS.iter().zip(TABLE_COLUMNS) {
            header.push(text(
                left + offset,
                baseline(top + 4.0, SMALL_SIZE),
                *title,
                SMALL_SIZE,
                true,
                style::INK,
            ));
        }
        cursor.advance(TABLE_HEADER_HEIGHT);
        placed.extend(place(cursor.page(), header));

        for factor in factors {
            let top = cursor.make_room(TABLE_ROW_HEIGHT);
            let y = baseline(top + 3.0, SMALL_SIZE);
            let cells = [
                (factor.name.as_str(), style::INK),
                (factor.value.as_str(), style::INK),
                (factor.normal_range.as_str(), style::INK),
                (factor.status.as_str(), style::status_color(factor.status)),
            ];
            let ops = cells
                .iter()
                .zip(TABLE_COLUMNS)
                .map(|((cell, color), offset)| text(left + offset, y, *cell, SMALL_SIZE, false, *color))
                .collect();
            cursor.advance(TABLE_ROW_HEIGHT);
            placed.extend(place(cursor.page(), ops));
        }

        cursor.advance(SECTION_GAP);
        placed
    }

    // ── Forecast bars ───────────────────────────────────────────

    pub fn forecast_height(&self) -> f64 {
        FORECAST_AREA_HEIGHT + FORECAST_CAPTION_GAP + 2.0 * GRID_ROW_HEIGHT + SECTION_GAP
    }

    /// Three vertical bars for the 3/6/12 month risk, then trend and
    /// preventability. Drawn as one unit.
    pub fn forecast_bars(&self, cursor: &mut PageCursor, forecast: &FutureRisk) -> Vec<PlacedOp> {
        let height = self.forecast_height();
        let top = cursor.make_room(height);
        let left = self.left();
        let area_bottom = top + FORECAST_AREA_HEIGHT;
        let caption_y = baseline(area_bottom + FORECAST_CAPTION_GAP, BODY_SIZE);

        let horizons = [
            ("3 Months", forecast.at_3_months),
            ("6 Months", forecast.at_6_months),
            ("12 Months", forecast.at_12_months),
        ];

        let mut ops = Vec::new();
        for ((label, raw), offset) in horizons.iter().zip(FORECAST_COLUMNS) {
            let value = clamp_percent(*raw, "forecast risk");
            let fill = forecast_bar_height(value);
            let x = left + offset;
            ops.push(DrawOp::Rect {
                x,
                y: top,
                width: FORECAST_BAR_WIDTH,
                height: FORECAST_AREA_HEIGHT,
                fill: style::HEADER_FILL,
            });
            ops.push(DrawOp::Rect {
                x,
                y: area_bottom - fill,
                width: FORECAST_BAR_WIDTH,
                height: fill,
                fill: style::risk_band_color(value),
            });
            ops.push(text(
                x,
                caption_y,
                format!("{}: {}%", label, format_decimal(value, 1)),
                BODY_SIZE,
                false,
                style::INK,
            ));
        }

        let trend_y = caption_y + GRID_ROW_HEIGHT;
        ops.push(text(
            left + FORECAST_COLUMNS[0],
            trend_y,
            format!("Trend: {}", forecast.trend.as_str()),
            BODY_SIZE,
            false,
            style::trend_color(forecast.trend),
        ));
        ops.push(text(
            left + FORECAST_COLUMNS[1],
            trend_y,
            format!("Preventable: {}", if forecast.preventable { "Yes" } else { "No" }),
            BODY_SIZE,
            false,
            style::INK,
        ));

        cursor.advance(height);
        place(cursor.page(), ops)
    }

    // ── Recommendations ─────────────────────────────────────────

    fn recommendation_title(index: usize, rec: &Recommendation) -> String {
        let icon = rec.icon.trim();
        if !icon.is_empty() && font::is_encodable(icon) {
            format!("{}. {} {}", index + 1, icon, rec.title)
        } else {
            format!("{}. {}", index + 1, rec.title)
        }
    }

    fn recommendation_body(&self, rec: &Recommendation) -> Vec<String> {
        let width = self.geometry().content_width() - REC_INDENT;
        self.measurer.wrap(&rec.text, width, SMALL_SIZE)
    }

    /// Full height of one entry: title line, wrapped body, gap.
    pub fn recommendation_height(&self, rec: &Recommendation) -> f64 {
        let lines = self.recommendation_body(rec).len();
        self.measurer.line_height(SMALL_SIZE) + self.measurer.height(lines, SMALL_SIZE) + REC_GAP
    }

    pub fn recommendation_list(&self, cursor: &mut PageCursor, recommendations: &[Recommendation]) -> Vec<PlacedOp> {
        let left = self.left();
        let line_height = self.measurer.line_height(SMALL_SIZE);
        let mut placed = Vec::new();

        for (i, rec) in recommendations.iter().enumerate() {
            let body = self.recommendation_body(rec);
            let height = line_height + self.measurer.height(body.len(), SMALL_SIZE) + REC_GAP;
            let top = cursor.make_room(height);

            let mut ops = vec![text(
                left,
                baseline(top, SMALL_SIZE),
                Self::recommendation_title(i, rec),
                SMALL_SIZE,
                true,
                style::INK,
            )];
            for (n, line) in body.into_iter().enumerate() {
                let line_top = top + line_height * (n + 1) as f64;
                ops.push(text(
                    left + REC_INDENT,
                    baseline(line_top, SMALL_SIZE),
                    line,
                    SMALL_SIZE,
                    false,
                    style::INK,
                ));
            }

            cursor.advance(height);
            placed.extend(place(cursor.page(), ops));
        }

        cursor.advance(SECTION_GAP / 2.0);
        placed
    }

    // ── Alerts ──────────────────────────────────────────────────

    pub fn alert_height(&self, alert: &Alert) -> f64 {
        let rows = if alert.action.is_some() { 2.0 } else { 1.0 };
        rows * ALERT_ROW_HEIGHT
    }

    pub fn alert_list(&self, cursor: &mut PageCursor, alerts: &[Alert]) -> Vec<PlacedOp> {
        let left = self.left();
        let mut placed = Vec::new();

        for alert in alerts {
            let height = self.alert_height(alert);
            let top = cursor.make_room(height);
            let mut ops = vec![text(
                left,
                baseline(top, SMALL_SIZE),
                format!("! {}", alert.message),
                SMALL_SIZE,
                false,
                style::RED,
            )];
            if let Some(action) = &alert.action {
                ops.push(text(
                    left,
                    baseline(top + ALERT_ROW_HEIGHT, SMALL_SIZE),
                    format!("  Action: {}", action),
                    SMALL_SIZE,
                    false,
                    style::NEUTRAL,
                ));
            }
            cursor.advance(height);
            placed.extend(place(cursor.page(), ops));
        }

        placed
    }

    // ── Footer stamp ────────────────────────────────────────────

    /// Disclaimer and `Page X of N` at fixed positions. Applied to every
    /// page after the flow is done, outside the cursor.
    pub fn footer_stamp(&self, page: usize, total: usize) -> Vec<DrawOp> {
        let g = self.geometry();
        vec![
            text(
                g.margin_left,
                g.footer_baseline,
                &self.config.disclaimer,
                FOOTER_SIZE,
                false,
                style::FOOTER_INK,
            ),
            text(
                g.width - FOOTER_PAGE_OFFSET,
                g.footer_baseline,
                format!("Page {} of {}", page, total),
                FOOTER_SIZE,
                false,
                style::FOOTER_INK,
            ),
        ]
    }
}
