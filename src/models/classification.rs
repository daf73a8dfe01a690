use serde::Serialize;
use time::OffsetDateTime;

use super::{EnergyTier, NormalizedTags, SourceResults};

/// Category label used when nothing matches well enough.
pub const FALLBACK_CATEGORY: &str = "others";

/// How a classification request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Tags were found and matched against the taxonomy.
    Classified,
    /// No catalog returned any tags for the application.
    NoData,
    /// The pipeline failed; the result carries safe defaults and an error.
    Failed,
}

/// Outcome of one classification request.
///
/// Built once by [`EnergyService`](crate::EnergyService) and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    app_name: String,
    energy_level: EnergyTier,
    outcome: Outcome,
    category: Option<String>,
    confidence: Option<f64>,
    normalized_tags: Option<NormalizedTags>,
    raw_data: SourceResults,
    error: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    classified_at: OffsetDateTime,
}

impl ClassificationResult {
    /// A successful classification.
    pub fn classified(
        app_name: impl Into<String>,
        category: impl Into<String>,
        confidence: f64,
        normalized_tags: NormalizedTags,
        raw_data: SourceResults,
        energy_level: EnergyTier,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            energy_level,
            outcome: Outcome::Classified,
            category: Some(category.into()),
            confidence: Some(confidence),
            normalized_tags: Some(normalized_tags),
            raw_data,
            error: None,
            classified_at: OffsetDateTime::now_utc(),
        }
    }

    /// No source had data: only the default tier is reported.
    pub fn no_data(app_name: impl Into<String>, energy_level: EnergyTier) -> Self {
        Self {
            app_name: app_name.into(),
            energy_level,
            outcome: Outcome::NoData,
            category: None,
            confidence: None,
            normalized_tags: None,
            raw_data: SourceResults::new(),
            error: None,
            classified_at: OffsetDateTime::now_utc(),
        }
    }

    /// The pipeline failed with `error`.
    pub fn failed(
        app_name: impl Into<String>,
        energy_level: EnergyTier,
        error: impl Into<String>,
    ) -> Self {
        let error = error.into();
        Self {
            app_name: app_name.into(),
            energy_level,
            outcome: Outcome::Failed,
            category: Some(FALLBACK_CATEGORY.to_string()),
            confidence: Some(0.0),
            normalized_tags: Some(NormalizedTags::default()),
            raw_data: SourceResults::new(),
            error: Some(if error.is_empty() {
                "unknown classification error".to_string()
            } else {
                error
            }),
            classified_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn energy_level(&self) -> EnergyTier {
        self.energy_level
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn normalized_tags(&self) -> Option<&NormalizedTags> {
        self.normalized_tags.as_ref()
    }

    pub fn raw_data(&self) -> &SourceResults {
        &self.raw_data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn classified_at(&self) -> OffsetDateTime {
        self.classified_at
    }
}
