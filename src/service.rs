use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{error, info};

use crate::{
    Aggregator, ClassificationResult, EnergyTier, NormalizedTags, SourceResults, Taxonomy,
    classifier::{CategoryMatch, CategoryMatcher, ClassifyError, TagNormalizer},
};

/// Service layer that turns an application name into an energy tier.
///
/// EnergyService owns the shared taxonomy, the category matcher and the
/// source aggregator, and sequences them: aggregate catalog tags, normalize,
/// match, map to a tier. It never fails: every request ends in a
/// [`ClassificationResult`] whose [`Outcome`](crate::Outcome) says whether
/// the app was classified, unknown to every catalog, or hit an error.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use appenergy::{Aggregator, EnergyService, EnergyTier, Outcome, SourceResults, Taxonomy};
///
/// # fn main() -> anyhow::Result<()> {
/// let taxonomy = Arc::new(Taxonomy::builtin()?);
/// let service = EnergyService::new(taxonomy, Aggregator::new(Vec::new()));
///
/// let mut raw = SourceResults::new();
/// raw.push("Flathub", vec!["Photo Editor".to_string(), "Raster Editor".to_string()]);
///
/// let result = service.classify_sources("GIMP", raw);
/// assert_eq!(result.outcome(), Outcome::Classified);
/// assert_eq!(result.category(), Some("media_creation"));
/// assert_eq!(result.energy_level(), EnergyTier::High);
/// # Ok(())
/// # }
/// ```
pub struct EnergyService {
    taxonomy: Arc<Taxonomy>,
    matcher: CategoryMatcher,
    aggregator: Aggregator,
}

impl EnergyService {
    /// Creates a service matching against `taxonomy` with the default
    /// confidence threshold.
    pub fn new(taxonomy: Arc<Taxonomy>, aggregator: Aggregator) -> Self {
        let matcher = CategoryMatcher::new(Arc::clone(&taxonomy));
        Self {
            taxonomy,
            matcher,
            aggregator,
        }
    }

    /// Overrides the confidence threshold below which results become "others".
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.matcher = self.matcher.with_threshold(threshold);
        self
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn matcher(&self) -> &CategoryMatcher {
        &self.matcher
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Classifies `app_name` by querying every configured catalog.
    pub fn classify(&self, app_name: &str) -> ClassificationResult {
        info!(app_name, "classifying application");
        self.guarded(app_name, || {
            let raw = self.aggregator.aggregate(app_name);
            self.try_classify_sources(app_name, raw)
        })
    }

    /// Classifies `app_name` from already collected catalog tags.
    ///
    /// Empty `raw` yields an [`Outcome::NoData`](crate::Outcome::NoData)
    /// result.
    pub fn classify_sources(&self, app_name: &str, raw: SourceResults) -> ClassificationResult {
        self.guarded(app_name, || self.try_classify_sources(app_name, raw))
    }

    /// Runs normalization, matching and tier lookup on a flat tag list.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::EmptyTaxonomy`] when there is nothing to match
    /// against.
    pub fn classify_tags<I, S>(
        &self,
        tags: I,
    ) -> Result<(CategoryMatch, NormalizedTags, EnergyTier), ClassifyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = TagNormalizer::normalize_tags(tags);
        let best = self.matcher.match_tags(&normalized)?;
        let tier = self.taxonomy.energy_tier(&best.category);
        Ok((best, normalized, tier))
    }

    /// Shortcut for `classify(app_name).energy_level()`.
    pub fn energy_level(&self, app_name: &str) -> EnergyTier {
        self.classify(app_name).energy_level()
    }

    fn try_classify_sources(
        &self,
        app_name: &str,
        raw: SourceResults,
    ) -> Result<ClassificationResult, ClassifyError> {
        if raw.is_empty() {
            info!(app_name, "no catalog returned tags");
            return Ok(ClassificationResult::no_data(app_name, EnergyTier::default()));
        }

        let (best, normalized, tier) = self.classify_tags(raw.all_tags())?;
        info!(
            app_name,
            category = %best.category,
            confidence = best.confidence,
            tier = %tier,
            "classified application"
        );

        Ok(ClassificationResult::classified(
            app_name,
            best.category,
            best.confidence,
            normalized,
            raw,
            tier,
        ))
    }

    /// Runs `pipeline`, converting errors and panics into a failed result.
    fn guarded<F>(&self, app_name: &str, pipeline: F) -> ClassificationResult
    where
        F: FnOnce() -> Result<ClassificationResult, ClassifyError>,
    {
        let failure = match panic::catch_unwind(AssertUnwindSafe(pipeline)) {
            Ok(Ok(result)) => return result,
            Ok(Err(e)) => e,
            Err(payload) => ClassifyError::Panicked(panic_message(payload.as_ref())),
        };

        error!(app_name, error = %failure, "classification failed");
        ClassificationResult::failed(app_name, EnergyTier::default(), failure.to_string())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
