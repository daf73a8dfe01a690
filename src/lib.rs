pub mod aggregator;
pub mod classifier;
pub mod models;
pub mod service;
pub mod settings;
pub mod sources;
pub mod taxonomy;

pub use aggregator::Aggregator;
pub use models::{ClassificationResult, EnergyTier, NormalizedTags, Outcome, SourceResults};
pub use service::EnergyService;
pub use settings::{Settings, SettingsBuilder, SettingsError};
pub use taxonomy::{Taxonomy, TaxonomyError};
