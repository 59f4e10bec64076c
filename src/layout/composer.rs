//! # Document Composer
//!
//! Drives one report through `Idle → Rendering → Finalizing → Done`.
//!
//! The flowing part of the document is a fixed list of sections. Each
//! section pairs a presence check with a render function; sections whose
//! data is missing or empty are skipped entirely, heading included.
//!
//! `compose` takes the composer by value, so a composer renders exactly one
//! document.

use chrono::{Local, NaiveDateTime};
use log::debug;

use crate::config::ReportConfig;
use crate::model::{Patient, ReportModel, ScreeningMode};
use crate::style;

use super::blocks::{
    self, BlockRenderer, GridRow, SECTION_GAP, SECTION_TITLE_SIZE, SUBSECTION_TITLE_SIZE,
};
use super::{ComposedDocument, DrawOp, Metadata, Page, PageCursor, PlacedOp};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

fn transition(state: &mut ComposerState, next: ComposerState) {
    debug!("composer: {:?} -> {:?}", state, next);
    *state = next;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    Idle,
    Rendering,
    Finalizing,
    Done,
}

/// Working state for one composition: the cursor plus everything drawn so
/// far, bucketed by page.
struct RenderState {
    cursor: PageCursor,
    pages: Vec<Vec<DrawOp>>,
}

impl RenderState {
    fn new(cursor: PageCursor) -> Self {
        Self {
            cursor,
            pages: vec![Vec::new()],
        }
    }

    fn push(&mut self, placed: Vec<PlacedOp>) {
        for PlacedOp { page, op } in placed {
            self.ensure_page(page);
            self.pages[page - 1].push(op);
        }
    }

    /// Make sure buckets exist up to `page`, even if nothing was drawn on
    /// the pages in between.
    fn ensure_page(&mut self, page: usize) {
        while self.pages.len() < page {
            self.pages.push(Vec::new());
        }
    }
}

/// One entry of the fixed section order.
struct Section {
    name: &'static str,
    present: fn(&ReportModel) -> bool,
    render: fn(&BlockRenderer, &mut PageCursor, &ReportModel) -> Vec<PlacedOp>,
}

const SECTIONS: [Section; 8] = [
    Section {
        name: "patient information",
        present: |_| true,
        render: render_patient,
    },
    Section {
        name: "divider",
        present: |_| true,
        render: |r, cursor, _| r.divider(cursor),
    },
    Section {
        name: "classification summary",
        present: |_| true,
        render: render_classification,
    },
    Section {
        name: "probabilities",
        present: |m| !m.probabilities.is_empty(),
        render: render_probabilities,
    },
    Section {
        name: "risk factors",
        present: |m| !m.risk_factors.is_empty(),
        render: render_risk_factors,
    },
    Section {
        name: "forecast",
        present: |m| m.future_risk.is_some(),
        render: render_forecast,
    },
    Section {
        name: "recommendations",
        present: |m| !m.recommendations.is_empty(),
        render: render_recommendations,
    },
    Section {
        name: "alerts",
        present: |m| !m.alerts.is_empty(),
        render: render_alerts,
    },
];

pub struct DocumentComposer {
    config: ReportConfig,
    generated_at: NaiveDateTime,
    state: ComposerState,
}

impl DocumentComposer {
    /// A composer stamping the current local time into the banner.
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            generated_at: Local::now().naive_local(),
            state: ComposerState::Idle,
        }
    }

    /// Use a fixed generation timestamp. Two compositions of the same model
    /// with the same timestamp produce identical output.
    pub fn generated_at(mut self, timestamp: NaiveDateTime) -> Self {
        self.generated_at = timestamp;
        self
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    /// Lay out the whole report.
    pub fn compose(mut self, model: &ReportModel) -> ComposedDocument {
        debug_assert_eq!(self.state, ComposerState::Idle);
        transition(&mut self.state, ComposerState::Rendering);

        let renderer = BlockRenderer::new(&self.config);
        let mut flow = RenderState::new(PageCursor::new(self.config.geometry));

        let stamp = self.generated_at.format(TIMESTAMP_FORMAT).to_string();
        let banner = renderer.banner(&mut flow.cursor, &stamp);
        flow.push(banner);

        for section in &SECTIONS {
            if !(section.present)(model) {
                debug!("skipping empty section: {}", section.name);
                continue;
            }
            let placed = (section.render)(&renderer, &mut flow.cursor, model);
            flow.push(placed);
        }

        transition(&mut self.state, ComposerState::Finalizing);
        let total = flow.cursor.page();
        flow.ensure_page(total);

        let pages = flow
            .pages
            .into_iter()
            .enumerate()
            .map(|(i, mut ops)| {
                ops.extend(renderer.footer_stamp(i + 1, total));
                Page { number: i + 1, ops }
            })
            .collect();

        let document = ComposedDocument {
            geometry: self.config.geometry,
            metadata: Metadata {
                title: format!("{} - {}", self.config.title, self.config.subtitle),
                author: self.config.author.clone(),
                subject: model.classification.severity_label.to_string(),
            },
            pages,
        };

        transition(&mut self.state, ComposerState::Done);
        debug!("composed {} page(s)", document.page_count());
        document
    }
}

// ── Section renderers ───────────────────────────────────────────

fn cell(label: &str, value: String) -> (String, String) {
    (label.to_string(), value)
}

fn patient_rows(patient: &Patient) -> Vec<GridRow> {
    let mut rows = vec![
        vec![
            cell("Age", format!("{} years", patient.age)),
            cell("Gender", patient.gender_code.label().to_string()),
        ],
        vec![
            cell("Hemoglobin", format!("{} g/dL", patient.hemoglobin)),
            cell("BMI", patient.bmi.to_string()),
        ],
    ];

    if patient.mode == ScreeningMode::Full {
        match &patient.panel {
            Some(panel) => {
                rows.push(vec![
                    cell("RBC Count", format!("{} M/uL", panel.rbc_count)),
                    cell("Iron Level", format!("{} ug/dL", panel.iron_level)),
                ]);
                rows.push(vec![
                    cell("Ferritin", format!("{} ng/mL", panel.ferritin)),
                    cell("Hematocrit", format!("{}%", panel.hematocrit)),
                ]);
                rows.push(vec![
                    cell("MCV", format!("{} fL", panel.mcv)),
                    cell("MCH", format!("{} pg", panel.mch)),
                    cell("MCHC", format!("{} g/dL", panel.mchc)),
                ]);
            }
            None => debug!("full screening without blood panel, showing quick fields only"),
        }
    }

    rows
}

fn render_patient(r: &BlockRenderer, cursor: &mut PageCursor, model: &ReportModel) -> Vec<PlacedOp> {
    let rows = patient_rows(&model.patient);
    let mut placed = r.heading(
        cursor,
        "Patient Information",
        SECTION_TITLE_SIZE,
        style::INK,
        r.grid_height(&rows),
    );
    placed.extend(r.key_value_grid(cursor, &rows));
    placed
}

fn render_classification(r: &BlockRenderer, cursor: &mut PageCursor, model: &ReportModel) -> Vec<PlacedOp> {
    let c = &model.classification;
    let rows: Vec<GridRow> = vec![
        vec![
            cell("Risk Score", format!("{}/100", c.risk_score.min(100))),
            cell(
                "Confidence",
                format!("{:.1}%", blocks::clamp_percent(c.confidence, "confidence")),
            ),
            cell(
                "Model Accuracy",
                format!("{:.1}%", blocks::clamp_percent(c.model_accuracy, "model accuracy")),
            ),
        ],
        vec![cell("Risk Level", c.risk_level.clone())],
    ];

    let mut placed = r.heading(
        cursor,
        "Classification Result",
        SECTION_TITLE_SIZE,
        style::INK,
        r.badge_height(),
    );
    placed.extend(r.severity_badge(cursor, &c.severity_label));
    placed.extend(r.key_value_grid(cursor, &rows));
    cursor.advance(SECTION_GAP / 2.0);
    placed
}

fn render_probabilities(r: &BlockRenderer, cursor: &mut PageCursor, model: &ReportModel) -> Vec<PlacedOp> {
    let mut placed = r.heading(
        cursor,
        "Classification Probabilities",
        SUBSECTION_TITLE_SIZE,
        style::INK,
        r.probability_row_height(),
    );
    placed.extend(r.probability_bars(cursor, &model.probabilities));
    placed
}

fn render_risk_factors(r: &BlockRenderer, cursor: &mut PageCursor, model: &ReportModel) -> Vec<PlacedOp> {
    let mut placed = r.heading(
        cursor,
        "Risk Factor Analysis",
        SUBSECTION_TITLE_SIZE,
        style::INK,
        r.table_lead_height(),
    );
    placed.extend(r.table(cursor, &model.risk_factors));
    placed
}

fn render_forecast(r: &BlockRenderer, cursor: &mut PageCursor, model: &ReportModel) -> Vec<PlacedOp> {
    let Some(forecast) = &model.future_risk else {
        return Vec::new();
    };
    let mut placed = r.heading(
        cursor,
        "Future Risk Forecast",
        SUBSECTION_TITLE_SIZE,
        style::INK,
        r.forecast_height(),
    );
    placed.extend(r.forecast_bars(cursor, forecast));
    placed
}

fn render_recommendations(r: &BlockRenderer, cursor: &mut PageCursor, model: &ReportModel) -> Vec<PlacedOp> {
    let first = model
        .recommendations
        .first()
        .map(|rec| r.recommendation_height(rec))
        .unwrap_or(0.0);
    let mut placed = r.heading(cursor, "Recommendations", SUBSECTION_TITLE_SIZE, style::INK, first);
    placed.extend(r.recommendation_list(cursor, &model.recommendations));
    placed
}

fn render_alerts(r: &BlockRenderer, cursor: &mut PageCursor, model: &ReportModel) -> Vec<PlacedOp> {
    let first = model
        .alerts
        .first()
        .map(|alert| r.alert_height(alert))
        .unwrap_or(0.0);
    let mut placed = r.heading(cursor, "ALERTS", SUBSECTION_TITLE_SIZE, style::RED, first);
    placed.extend(r.alert_list(cursor, &model.alerts));
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BloodPanel, Classification, FactorStatus, Gender, Probabilities, Recommendation, RiskFactor,
        SeverityLabel,
    };
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap()
    }

    fn minimal_model() -> ReportModel {
        ReportModel {
            patient: Patient {
                age: 41,
                gender_code: Gender::Male,
                hemoglobin: 14.2,
                bmi: 24.0,
                mode: ScreeningMode::Quick,
                panel: None,
            },
            classification: Classification {
                severity_label: SeverityLabel::new("Normal"),
                risk_score: 12,
                confidence: 97.0,
                model_accuracy: 96.5,
                risk_level: "Low".to_string(),
            },
            probabilities: Probabilities::default(),
            risk_factors: vec![],
            future_risk: None,
            recommendations: vec![],
            alerts: vec![],
        }
    }

    fn compose(model: &ReportModel) -> ComposedDocument {
        DocumentComposer::new(ReportConfig::default())
            .generated_at(timestamp())
            .compose(model)
    }

    #[test]
    fn new_composer_is_idle() {
        let composer = DocumentComposer::new(ReportConfig::default());
        assert_eq!(composer.state(), ComposerState::Idle);
    }

    #[test]
    fn minimal_model_is_one_page() {
        let doc = compose(&minimal_model());
        assert_eq!(doc.page_count(), 1);
        let page = &doc.pages[0];
        assert!(page.contains_text("Generated: 2026-10-19 09:30"));
        assert!(page.contains_text("Page 1 of 1"));
        assert!(!page.contains_text("Classification Probabilities"));
        assert!(!page.contains_text("Risk Factor Analysis"));
    }

    #[test]
    fn full_mode_adds_panel_rows() {
        let mut model = minimal_model();
        model.patient.mode = ScreeningMode::Full;
        model.patient.panel = Some(BloodPanel {
            rbc_count: 4.5,
            iron_level: 80.0,
            ferritin: 100.0,
            hematocrit: 40.0,
            mcv: 85.0,
            mch: 29.0,
            mchc: 33.0,
        });
        let doc = compose(&model);
        assert!(doc.pages[0].contains_text("MCHC: 33 g/dL"));
        assert!(doc.pages[0].contains_text("Hematocrit: 40%"));
    }

    #[test]
    fn full_mode_without_panel_degrades_to_quick() {
        let mut model = minimal_model();
        model.patient.mode = ScreeningMode::Full;
        let doc = compose(&model);
        assert!(!doc.pages[0].contains_text("MCV"));
        assert!(doc.pages[0].contains_text("BMI: 24"));
    }

    #[test]
    fn every_page_gets_footer() {
        let mut model = minimal_model();
        model.risk_factors = (0..80)
            .map(|i| RiskFactor {
                name: format!("Marker {}", i),
                value: "1".to_string(),
                normal_range: "0-2".to_string(),
                status: FactorStatus::Normal,
            })
            .collect();
        let doc = compose(&model);
        let total = doc.page_count();
        assert!(total > 1);
        for page in &doc.pages {
            assert!(page.contains_text(&format!("Page {} of {}", page.number, total)));
        }
    }

    #[test]
    fn heading_moves_with_first_recommendation() {
        let mut model = minimal_model();
        // Table ends low on page 1: room for the heading, not for the entry.
        model.risk_factors = (0..20)
            .map(|i| RiskFactor {
                name: format!("Marker {}", i),
                value: "1".to_string(),
                normal_range: "0-2".to_string(),
                status: FactorStatus::High,
            })
            .collect();
        model.recommendations = vec![Recommendation {
            icon: String::new(),
            title: "Iron supplements".to_string(),
            text: "word ".repeat(200),
        }];
        let doc = compose(&model);
        assert_eq!(doc.pages_containing("Recommendations"), vec![2]);
        assert_eq!(
            doc.pages_containing("Recommendations"),
            doc.pages_containing("1. Iron supplements")
        );
    }

    #[test]
    fn oversized_first_recommendation_is_not_orphaned() {
        let mut model = minimal_model();
        model.recommendations = vec![Recommendation {
            icon: String::new(),
            title: "Iron supplements".to_string(),
            text: "ferrous sulfate ".repeat(940),
        }];
        let doc = compose(&model);
        let heading = doc.pages_containing("Recommendations");
        assert_eq!(heading.len(), 1);
        assert_eq!(heading, doc.pages_containing("1. Iron supplements"));
        // The entry is atomic; it overruns its page instead of trailing onto a
        // third one.
        assert_eq!(doc.page_count(), heading[0]);
    }
}
