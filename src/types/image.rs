//! Results returned by image operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Operation;

/// One produced image: a hosted URL or inline bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ImageOutput {
    Url(String),
    Bytes(Vec<u8>),
}

impl ImageOutput {
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Bytes(_) => None,
        }
    }
}

impl fmt::Debug for ImageOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

/// Images produced by a single operation, in the order the API returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImages {
    pub images: Vec<ImageOutput>,
}

impl GeneratedImages {
    pub fn new(images: Vec<ImageOutput>) -> Self {
        Self { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn first(&self) -> Option<&ImageOutput> {
        self.images.first()
    }

    /// URLs of hosted results, skipping inline images.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.images.iter().filter_map(ImageOutput::as_url)
    }
}

/// A successful result kept in the session gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub operation: Operation,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Prompt or scene description that produced the images, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub images: GeneratedImages,
}
