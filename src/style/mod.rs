//! # Colors and Palettes
//!
//! Every color the report uses lives here. The status lookups are plain
//! tables keyed by enums, so adding a variant is a compile error until it
//! gets a color; free-form labels fall back to [`NEUTRAL`].

use serde::{Deserialize, Serialize};

use crate::model::{FactorStatus, Severity, SeverityLabel, Trend};

/// An RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb8(255, 255, 255);

    /// Build a color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }
}

// ── Named colors ────────────────────────────────────────────────

pub const GREEN: Color = Color::rgb8(34, 197, 94);
pub const YELLOW: Color = Color::rgb8(234, 179, 8);
pub const ORANGE: Color = Color::rgb8(249, 115, 22);
pub const RED: Color = Color::rgb8(239, 68, 68);

/// Fallback for labels the palette doesn't know.
pub const NEUTRAL: Color = Color::rgb8(100, 100, 100);

/// Banner fill and divider stroke.
pub const BRAND: Color = Color::rgb8(220, 38, 38);
/// Body text.
pub const INK: Color = Color::rgb8(50, 50, 50);
/// Table header shading.
pub const HEADER_FILL: Color = Color::rgb8(240, 240, 240);
/// Footer stamp text.
pub const FOOTER_INK: Color = Color::rgb8(150, 150, 150);

// ── Lookups ─────────────────────────────────────────────────────

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Normal => GREEN,
        Severity::MildAnemia => YELLOW,
        Severity::ModerateAnemia => ORANGE,
        Severity::SevereAnemia => RED,
    }
}

/// Color for a free-form severity label. Unrecognized labels are gray.
pub fn label_color(label: &SeverityLabel) -> Color {
    label.severity().map(severity_color).unwrap_or(NEUTRAL)
}

pub fn status_color(status: FactorStatus) -> Color {
    match status {
        FactorStatus::Normal => GREEN,
        FactorStatus::Low => RED,
        FactorStatus::High => ORANGE,
    }
}

pub fn trend_color(trend: Trend) -> Color {
    match trend {
        Trend::Increasing => ORANGE,
        Trend::Stable => GREEN,
    }
}

/// Lower bounds (exclusive) of the forecast risk bands, highest first.
const RISK_BANDS: [(f64, Color); 3] = [(60.0, RED), (30.0, ORANGE), (15.0, YELLOW)];

/// Band color for a risk percentage: `>60` red, `>30` orange, `>15` yellow,
/// green otherwise.
pub fn risk_band_color(value: f64) -> Color {
    RISK_BANDS
        .iter()
        .find(|(floor, _)| value > *floor)
        .map(|(_, color)| *color)
        .unwrap_or(GREEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_map_to_palette() {
        assert_eq!(label_color(&SeverityLabel::new("Normal")), GREEN);
        assert_eq!(label_color(&SeverityLabel::new("Mild Anemia")), YELLOW);
        assert_eq!(label_color(&SeverityLabel::new("ModerateAnemia")), ORANGE);
        assert_eq!(label_color(&SeverityLabel::new("SevereAnemia")), RED);
    }

    #[test]
    fn unknown_label_is_neutral() {
        assert_eq!(label_color(&SeverityLabel::new("Borderline")), NEUTRAL);
        assert_eq!(label_color(&SeverityLabel::new("")), NEUTRAL);
    }

    #[test]
    fn risk_bands_are_exclusive_at_edges() {
        assert_eq!(risk_band_color(0.0), GREEN);
        assert_eq!(risk_band_color(15.0), GREEN);
        assert_eq!(risk_band_color(15.1), YELLOW);
        assert_eq!(risk_band_color(30.0), YELLOW);
        assert_eq!(risk_band_color(31.0), ORANGE);
        assert_eq!(risk_band_color(60.0), ORANGE);
        assert_eq!(risk_band_color(60.5), RED);
    }
}
