use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;

/// A reference implant held by the catalog.
///
/// Records are immutable once stored; an upsert replaces the whole record.
/// The `reference_image` locator is opaque to the engine and never
/// dereferenced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplantRecord {
    pub id: u64,
    pub name: String,
    pub manufacturer: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub reference_image: Option<String>,
    pub embedding: Embedding,
}

impl ImplantRecord {
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            id,
            name: name.into(),
            manufacturer: None,
            kind: None,
            reference_image: None,
            embedding,
        }
    }

    #[must_use]
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_reference_image(mut self, locator: impl Into<String>) -> Self {
        self.reference_image = Some(locator.into());
        self
    }
}

/// One entry of the catalog load format.
///
/// `id` may be omitted, in which case the store assigns the next free key
/// at load time. `name` is required; everything else is optional metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "image_url", default)]
    pub reference_image: Option<String>,
    pub embedding: Vec<f32>,
}
