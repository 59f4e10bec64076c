//! # Report Model
//!
//! The input representation for the report engine: one screening result,
//! supplied in full before composition starts.
//!
//! Field names are camelCase, but the snake_case names produced by the
//! prediction service (`risk_score`, `future_risk`, `3_months`, ...) are
//! accepted as aliases so a service response can be fed in unchanged.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A complete screening result ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportModel {
    pub patient: Patient,

    pub classification: Classification,

    /// Severity label → percentage, in the order the service produced them.
    #[serde(default)]
    pub probabilities: Probabilities,

    #[serde(default, alias = "risk_factors")]
    pub risk_factors: Vec<RiskFactor>,

    #[serde(default, alias = "future_risk")]
    pub future_risk: Option<FutureRisk>,

    #[serde(default)]
    pub recommendations: Vec<Recommendation>,

    #[serde(default)]
    pub alerts: Vec<Alert>,
}

// ── Patient ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub age: u32,

    #[serde(alias = "gender")]
    pub gender_code: Gender,

    pub hemoglobin: f64,

    pub bmi: f64,

    #[serde(default, alias = "screening_mode")]
    pub mode: ScreeningMode,

    /// Extended blood panel, carried as flat fields beside the quick ones.
    /// `None` unless all seven are present. Only rendered in
    /// [`ScreeningMode::Full`].
    #[serde(flatten)]
    pub panel: Option<BloodPanel>,
}

/// Gender as the numeric code used by the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }

    /// Single-letter code used in report file names.
    pub fn initial(self) -> char {
        match self {
            Gender::Female => 'F',
            Gender::Male => 'M',
        }
    }
}

impl TryFrom<u8> for Gender {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Gender::Female),
            1 => Ok(Gender::Male),
            other => Err(format!("gender code must be 0 or 1, got {}", other)),
        }
    }
}

impl From<Gender> for u8 {
    fn from(g: Gender) -> u8 {
        match g {
            Gender::Female => 0,
            Gender::Male => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreeningMode {
    #[default]
    Quick,
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodPanel {
    #[serde(alias = "rbc_count")]
    pub rbc_count: f64,
    #[serde(alias = "iron_level")]
    pub iron_level: f64,
    pub ferritin: f64,
    pub hematocrit: f64,
    pub mcv: f64,
    pub mch: f64,
    pub mchc: f64,
}

// ── Classification ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    #[serde(alias = "severity_label")]
    pub severity_label: SeverityLabel,
    /// 0..=100; larger values are clamped when rendered.
    #[serde(alias = "risk_score")]
    pub risk_score: u32,
    pub confidence: f64,
    #[serde(alias = "model_accuracy")]
    pub model_accuracy: f64,
    #[serde(alias = "risk_level")]
    pub risk_level: String,
}

/// The four classification outcomes the palette knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Normal,
    MildAnemia,
    ModerateAnemia,
    SevereAnemia,
}

impl Severity {
    /// Parse a label, ignoring case, spaces and underscores, so that
    /// `"Mild Anemia"`, `"MildAnemia"` and `"mild_anemia"` all match.
    pub fn from_label(label: &str) -> Option<Self> {
        let key: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "normal" => Some(Severity::Normal),
            "mildanemia" => Some(Severity::MildAnemia),
            "moderateanemia" => Some(Severity::ModerateAnemia),
            "severeanemia" => Some(Severity::SevereAnemia),
            _ => None,
        }
    }
}

/// A severity label as received. Kept verbatim for display; unknown labels
/// are legal and render in the neutral color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityLabel(String);

impl SeverityLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn severity(&self) -> Option<Severity> {
        Severity::from_label(&self.0)
    }
}

impl fmt::Display for SeverityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Probabilities ───────────────────────────────────────────────

/// Ordered label → percentage mapping.
///
/// Deserialized from a JSON object with the object's key order preserved,
/// which a plain map type would lose.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Probabilities(Vec<(SeverityLabel, f64)>);

impl Probabilities {
    pub fn new(entries: Vec<(SeverityLabel, f64)>) -> Self {
        Self(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeverityLabel, f64)> {
        self.0.iter().map(|(label, pct)| (label, *pct))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Probabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, pct) in &self.0 {
            map.serialize_entry(label.as_str(), pct)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Probabilities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = Probabilities;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping severity labels to percentages")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(4));
                while let Some((label, pct)) = access.next_entry::<String, f64>()? {
                    entries.push((SeverityLabel(label), pct));
                }
                Ok(Probabilities(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

// ── Risk factors ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub name: String,
    /// Measured value, already formatted. Numbers in the input are
    /// converted to their plain decimal form.
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    #[serde(default, alias = "normal_range")]
    pub normal_range: String,
    pub status: FactorStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorStatus {
    Normal,
    Low,
    High,
}

impl FactorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FactorStatus::Normal => "normal",
            FactorStatus::Low => "low",
            FactorStatus::High => "high",
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct ValueVisitor;

    impl<'de> Visitor<'de> for ValueVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(ValueVisitor)
}

// ── Forecast ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureRisk {
    #[serde(rename = "at3Months", alias = "3_months")]
    pub at_3_months: f64,
    #[serde(rename = "at6Months", alias = "6_months")]
    pub at_6_months: f64,
    #[serde(rename = "at12Months", alias = "12_months")]
    pub at_12_months: f64,
    pub trend: Trend,
    pub preventable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Stable => "stable",
        }
    }
}

// ── Recommendations & alerts ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub icon: String,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub level: AlertLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    #[default]
    Warning,
    Critical,
}
