//! # Report Configuration
//!
//! Page geometry and the fixed strings of the report. Every field has a
//! default, so an empty JSON object (or no config file at all) yields the
//! standard A4 report.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// The whole pagination contract. All values are in points, measured from
/// the top edge of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    /// Where flowing content starts on continuation pages.
    pub margin_top: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Near-bottom cutoff: a block fits only if it ends at or above this line.
    pub content_bottom: f64,
    /// Baseline of the footer stamp, inside the band below `content_bottom`.
    pub footer_baseline: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin_top: 56.0,
            margin_left: 40.0,
            margin_right: 40.0,
            content_bottom: 766.0,
            footer_baseline: 816.0,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn content_height(&self) -> f64 {
        self.content_bottom - self.margin_top
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        let finite = [
            self.width,
            self.height,
            self.margin_top,
            self.margin_left,
            self.margin_right,
            self.content_bottom,
            self.footer_baseline,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(ReportError::Config("page geometry must be finite".into()));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(ReportError::Config(format!(
                "page size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.content_width() <= 0.0 {
            return Err(ReportError::Config(
                "horizontal margins leave no content width".into(),
            ));
        }
        if !(self.margin_top >= 0.0
            && self.margin_top < self.content_bottom
            && self.content_bottom <= self.footer_baseline
            && self.footer_baseline <= self.height)
        {
            return Err(ReportError::Config(format!(
                "expected 0 <= marginTop ({}) < contentBottom ({}) <= footerBaseline ({}) <= height ({})",
                self.margin_top, self.content_bottom, self.footer_baseline, self.height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    pub geometry: PageGeometry,
    /// Line height as a multiple of font size.
    pub line_height_ratio: f64,
    pub title: String,
    pub subtitle: String,
    pub disclaimer: String,
    /// Written to the PDF Info dictionary.
    pub author: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            line_height_ratio: 1.45,
            title: "HemoScan AI".to_string(),
            subtitle: "Anemia Detection & Risk Analysis Report".to_string(),
            disclaimer: "HemoScan AI - Screening support tool. NOT a substitute for professional medical diagnosis.".to_string(),
            author: "HemoScan AI".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ReportError> {
        let config: ReportConfig = serde_json::from_str(json)
            .map_err(|e| ReportError::Config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if !(self.line_height_ratio.is_finite() && self.line_height_ratio > 0.0) {
            return Err(ReportError::Config(format!(
                "lineHeightRatio must be positive, got {}",
                self.line_height_ratio
            )));
        }
        self.geometry.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = ReportConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn partial_geometry_override() {
        let config =
            ReportConfig::from_json_str(r#"{ "geometry": { "contentBottom": 700 } }"#).unwrap();
        assert_eq!(config.geometry.content_bottom, 700.0);
        assert_eq!(config.geometry.width, PageGeometry::default().width);
    }

    #[test]
    fn inverted_margins_rejected() {
        let err = ReportConfig::from_json_str(r#"{ "geometry": { "marginTop": 800 } }"#)
            .unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn zero_line_height_rejected() {
        assert!(ReportConfig::from_json_str(r#"{ "lineHeightRatio": 0 }"#).is_err());
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = ReportConfig::from_path(Path::new("/nonexistent/report.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
