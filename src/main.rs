//! # HemoScan Report CLI
//!
//! Usage:
//!   hemoscan-report result.json
//!   hemoscan-report result.json -o report.pdf --config a4.json
//!   echo '{ ... }' | hemoscan-report
//!   hemoscan-report --example > result.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::Parser;

use hemoscan_report::config::ReportConfig;
use hemoscan_report::error::ReportError;
use hemoscan_report::layout::DocumentComposer;
use hemoscan_report::model::ReportModel;
use hemoscan_report::pdf::PdfSink;
use hemoscan_report::sink::{report_file_name, OutputSink};

#[derive(Parser, Debug)]
#[command(name = "hemoscan-report", version, about = "Render a screening result as a paginated PDF report")]
struct Cli {
    /// Report model JSON. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Output file. Defaults to HemoScan_Report_<age>y_<F|M>_<date>.pdf
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page geometry and report strings (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Date used in the default file name (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Print the laid-out pages as JSON instead of writing a PDF.
    #[arg(long)]
    dump_layout: bool,

    /// Print an example report model and exit.
    #[arg(long)]
    example: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.example {
        print!("{}", example_model_json());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ReportError> {
    let config = match &cli.config {
        Some(path) => ReportConfig::from_path(path)?,
        None => ReportConfig::default(),
    };

    let input = match &cli.input {
        Some(path) => {
            fs::read_to_string(path).map_err(|e| ReportError::input(path.display().to_string(), e))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| ReportError::input("stdin", e))?;
            buf
        }
    };
    let model: ReportModel = serde_json::from_str(&input)?;

    let now = Local::now().naive_local();
    let document = DocumentComposer::new(config).generated_at(now).compose(&model);

    if cli.dump_layout {
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| ReportError::sink("serializing layout", e.into()))?;
        println!("{}", json);
        return Ok(());
    }

    let date = cli.date.unwrap_or_else(|| now.date());
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(report_file_name(&model.patient, date)));

    let mut file = fs::File::create(&output)
        .map_err(|e| ReportError::sink(format!("creating {}", output.display()), e))?;
    PdfSink::new().write_document(&document, &mut file)?;

    eprintln!(
        "✓ Written {} page(s) to {}",
        document.page_count(),
        output.display()
    );
    Ok(())
}

fn example_model_json() -> &'static str {
    r##"{
  "patient": {
    "age": 34,
    "genderCode": 0,
    "hemoglobin": 9.4,
    "bmi": 22.1,
    "mode": "full",
    "rbcCount": 3.9,
    "ironLevel": 38,
    "ferritin": 11,
    "hematocrit": 29,
    "mcv": 74,
    "mch": 24,
    "mchc": 31
  },
  "classification": {
    "severityLabel": "Moderate Anemia",
    "riskScore": 68,
    "confidence": 91.4,
    "modelAccuracy": 96.2,
    "riskLevel": "High"
  },
  "probabilities": {
    "Normal": 4.1,
    "Mild Anemia": 21.3,
    "Moderate Anemia": 62.8,
    "Severe Anemia": 11.8
  },
  "riskFactors": [
    { "name": "Hemoglobin", "value": "9.4", "normalRange": "12-15", "status": "low" },
    { "name": "Ferritin", "value": "11", "normalRange": "20-200", "status": "low" },
    { "name": "MCV", "value": "74", "normalRange": "80-100", "status": "low" },
    { "name": "BMI", "value": "22.1", "normalRange": "18.5-25", "status": "normal" }
  ],
  "futureRisk": {
    "at3Months": 48,
    "at6Months": 57,
    "at12Months": 66,
    "trend": "increasing",
    "preventable": true
  },
  "recommendations": [
    {
      "icon": "",
      "title": "Increase dietary iron",
      "text": "Include iron-rich foods such as lentils, spinach, red meat and fortified cereals in daily meals. Pair them with vitamin C sources to improve absorption."
    },
    {
      "icon": "",
      "title": "Follow-up blood test",
      "text": "Repeat a complete blood count and ferritin test in 8 to 12 weeks to confirm the response to dietary changes or supplementation."
    }
  ],
  "alerts": [
    {
      "level": "warning",
      "message": "Ferritin indicates depleted iron stores",
      "action": "Discuss iron supplementation with a physician"
    }
  ]
}
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_model_parses() {
        let model: ReportModel = serde_json::from_str(example_model_json()).unwrap();
        assert_eq!(model.risk_factors.len(), 4);
        assert!(model.patient.panel.is_some());
    }

    #[test]
    fn missing_input_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "hemoscan-report",
            dir.path().join("absent.json").to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(run(&cli), Err(ReportError::Input { .. })));
    }

    #[test]
    fn example_renders_full_panel() {
        let model: ReportModel = serde_json::from_str(example_model_json()).unwrap();
        let doc = DocumentComposer::new(ReportConfig::default()).compose(&model);
        assert!(doc.pages[0].contains_text("MCV: 74 fL"));
    }

    #[test]
    fn cli_accepts_date_and_output() {
        let cli = Cli::try_parse_from([
            "hemoscan-report",
            "in.json",
            "-o",
            "out.pdf",
            "--date",
            "2026-10-19",
        ])
        .unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("out.pdf")));
        assert_eq!(cli.date, NaiveDate::from_ymd_opt(2026, 10, 19));
    }
}
