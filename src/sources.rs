//! Catalog source adapters.
//!
//! Each adapter asks one public software catalog for the categories or tags it
//! assigns to an application. Adapters share a blocking [`CatalogClient`] and
//! never let a failure escape [`CategorySource::categories`]: a missing app, an
//! HTTP error or an unexpected page layout all degrade to an empty tag list.

mod apple_store;
mod client;
mod flathub;
mod gog;
mod html;
mod itch_io;
mod my_abandonware;
mod snapcraft;

use std::sync::Arc;

use tracing::{debug, warn};

pub use apple_store::AppleStore;
pub use client::{
    CatalogClient, CatalogClientBuilder, DEFAULT_USER_AGENT, RetryPolicy, SourceError,
    retry_with_backoff,
};
pub use flathub::Flathub;
pub use gog::Gog;
pub use itch_io::ItchIo;
pub use my_abandonware::MyAbandonware;
pub use snapcraft::Snapcraft;

/// A catalog that can be asked for an application's categories.
///
/// This trait enables mocking in unit tests and lets the aggregator treat every
/// catalog uniformly.
pub trait CategorySource: Send + Sync {
    /// Display name used as the key in aggregated results (e.g. "Flathub").
    fn name(&self) -> &str;

    /// Queries the catalog.
    ///
    /// # Returns
    ///
    /// The raw category or tag strings in catalog order. An application the
    /// catalog does not know is `Ok` with an empty list, not an error.
    fn fetch_categories(&self, app_name: &str) -> Result<Vec<String>, SourceError>;

    /// Like [`fetch_categories`](Self::fetch_categories), but failures are
    /// logged and reported as "no tags".
    fn categories(&self, app_name: &str) -> Vec<String> {
        match self.fetch_categories(app_name) {
            Ok(tags) => {
                debug!(source = self.name(), app_name, count = tags.len(), "fetched tags");
                tags
            }
            Err(e) => {
                warn!(source = self.name(), app_name, error = %e, "catalog query failed");
                Vec::new()
            }
        }
    }
}

/// The six built-in catalogs in their fixed query order.
pub fn default_sources(client: Arc<CatalogClient>) -> Vec<Arc<dyn CategorySource>> {
    vec![
        Arc::new(Snapcraft::new(Arc::clone(&client))),
        Arc::new(Flathub::new(Arc::clone(&client))),
        Arc::new(AppleStore::new(Arc::clone(&client))),
        Arc::new(Gog::new(Arc::clone(&client))),
        Arc::new(ItchIo::new(Arc::clone(&client))),
        Arc::new(MyAbandonware::new(client)),
    ]
}
