mod client;
pub mod kinds;
mod raw_object;

use anyhow::Result;
use async_trait::async_trait;

pub use client::KubeLister;
pub use kinds::{CollectionId, KindMapping};
pub use raw_object::RawObject;

/// Source of raw objects for one collection, across all namespaces
#[async_trait]
pub trait ResourceLister: Send + Sync {
    async fn list(&self, collection: &CollectionId) -> Result<Vec<RawObject>>;
}
