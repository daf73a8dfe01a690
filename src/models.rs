mod classification;
mod energy_tier;
mod normalized_tags;
mod source_results;

pub use classification::{ClassificationResult, FALLBACK_CATEGORY, Outcome};
pub use energy_tier::{EnergyTier, UnknownEnergyTier};
pub use normalized_tags::NormalizedTags;
pub use source_results::{SourceResults, SourceTags};
