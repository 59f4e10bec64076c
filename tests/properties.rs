//! Property tests for the layout primitives.

use proptest::prelude::*;

use hemoscan_report::config::{PageGeometry, ReportConfig};
use hemoscan_report::layout::blocks::{
    bar_width, forecast_bar_height, BlockRenderer, FORECAST_AREA_HEIGHT, FORECAST_MIN_VISIBLE,
    PROB_BAR_MAX_WIDTH,
};
use hemoscan_report::layout::{DrawOp, PageCursor};
use hemoscan_report::model::{FactorStatus, RiskFactor, SeverityLabel};
use hemoscan_report::style;
use hemoscan_report::text::TextMeasurer;

fn word() -> impl Strategy<Value = String> {
    "[A-Za-z0-9,.;-]{1,24}"
}

proptest! {
    #[test]
    fn bar_width_is_monotonic(a in -50.0f64..150.0, b in -50.0f64..150.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(bar_width(lo) <= bar_width(hi));
        prop_assert!(bar_width(hi) <= PROB_BAR_MAX_WIDTH);
        prop_assert!(bar_width(lo) >= 0.0);
    }

    #[test]
    fn forecast_bar_never_below_minimum(v in -100.0f64..200.0) {
        let h = forecast_bar_height(v);
        prop_assert!(h >= FORECAST_MIN_VISIBLE / 100.0 * FORECAST_AREA_HEIGHT - 1e-9);
        prop_assert!(h <= FORECAST_AREA_HEIGHT + 1e-9);
    }

    #[test]
    fn wrap_never_splits_tokens(
        words in prop::collection::vec(word(), 0..40),
        max_width in 20.0f64..500.0,
    ) {
        let text = words.join(" ");
        let lines = TextMeasurer::new(1.45).wrap(&text, max_width, 10.0);
        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
        let expected: Vec<&str> = words.iter().map(String::as_str).collect();
        prop_assert_eq!(rejoined, expected);
    }

    #[test]
    fn wrapped_lines_fit_unless_single_token(
        words in prop::collection::vec(word(), 1..40),
        max_width in 20.0f64..500.0,
    ) {
        let measurer = TextMeasurer::new(1.45);
        for line in measurer.wrap(&words.join(" "), max_width, 10.0) {
            let fits = measurer.width(&line, 10.0, false) <= max_width + 1e-9;
            prop_assert!(fits || !line.contains(' '), "overfull line {:?}", line);
        }
    }

    #[test]
    fn severity_color_depends_only_on_label(label in "[A-Za-z ]{0,20}") {
        let a = style::label_color(&SeverityLabel::new(label.clone()));
        let b = style::label_color(&SeverityLabel::new(label));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn table_rows_stay_whole(rows in 1usize..150, start in 56.0f64..760.0) {
        let config = ReportConfig::default();
        let renderer = BlockRenderer::new(&config);
        let mut cursor = PageCursor::new(PageGeometry::default());
        cursor.advance_to(start);

        let factors: Vec<RiskFactor> = (0..rows)
            .map(|i| RiskFactor {
                name: format!("row{}", i),
                value: "1".to_string(),
                normal_range: "0-2".to_string(),
                status: FactorStatus::Normal,
            })
            .collect();
        let placed = renderer.table(&mut cursor, &factors);

        for i in 0..rows {
            let name = format!("row{}", i);
            let cell = placed
                .iter()
                .find(|p| p.op.text() == Some(name.as_str()))
                .expect("row drawn");
            let y = match &cell.op {
                DrawOp::Text { y, .. } => *y,
                _ => unreachable!(),
            };
            prop_assert!(y <= config.geometry.content_bottom);
            let status_same_page = placed.iter().any(|p| {
                p.page == cell.page
                    && matches!(&p.op, DrawOp::Text { text, y: sy, .. } if text == "normal" && (*sy - y).abs() < 1e-9)
            });
            prop_assert!(status_same_page);
        }
    }
}
