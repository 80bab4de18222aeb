//! Input validation run before any remote call.
//!
//! Everything here is a pure function of its inputs: no I/O, no logging.
//! Callers (the [`Session`](crate::Session)) decide how to report
//! failures; a rejected request never reaches the network and never
//! produces a [`CallRecord`](crate::CallRecord).

use std::fmt;

use crate::ErrorKind;
use crate::types::{ImageUpload, MediaType};

/// Default maximum upload size: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Why an input was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    #[error("file too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("unsupported media type '{media_type}' (supported: {supported})")]
    UnsupportedType {
        media_type: String,
        supported: String,
    },

    #[error("{field} out of range: got {value}, expected {range}")]
    ParameterOutOfRange {
        field: &'static str,
        value: String,
        range: String,
    },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput(_) => ErrorKind::MissingInput,
            Self::TooLarge { .. } => ErrorKind::TooLarge,
            Self::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Self::ParameterOutOfRange { .. } => ErrorKind::ParameterOutOfRange,
        }
    }

    /// The offending parameter, for `ParameterOutOfRange`.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::ParameterOutOfRange { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Upload limits applied by [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    /// Maximum upload size in bytes. Default: 10 MiB.
    pub max_file_size: u64,
    /// Accepted media types. Default: JPEG, PNG, WebP.
    pub allowed_types: Vec<MediaType>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: vec![MediaType::Jpeg, MediaType::Png, MediaType::Webp],
        }
    }
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum upload size in bytes.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Replace the accepted media types.
    pub fn allowed_types(mut self, types: impl IntoIterator<Item = MediaType>) -> Self {
        self.allowed_types = types.into_iter().collect();
        self
    }

    fn supported_list(&self) -> String {
        self.allowed_types
            .iter()
            .map(MediaType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Check an uploaded file against `constraints`.
///
/// Checks run in order: presence, size, media type. An empty file counts
/// as missing.
pub fn validate(
    file: Option<&ImageUpload>,
    constraints: &Constraints,
) -> Result<(), ValidationError> {
    let file = match file {
        Some(f) if !f.bytes.is_empty() => f,
        _ => return Err(ValidationError::MissingInput("image")),
    };

    if file.size() > constraints.max_file_size {
        return Err(ValidationError::TooLarge {
            size: file.size(),
            max: constraints.max_file_size,
        });
    }

    if !constraints.allowed_types.contains(&file.media_type) {
        return Err(ValidationError::UnsupportedType {
            media_type: file.media_type.to_string(),
            supported: constraints.supported_list(),
        });
    }

    Ok(())
}

/// Requests that can check themselves before dispatch.
pub trait Validate {
    fn validate(&self, constraints: &Constraints) -> Result<(), ValidationError>;
}

/// Inclusive numeric range, optionally restricted to multiples of `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
}

impl ParameterRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            step: None,
        }
    }

    pub const fn stepped(min: f64, max: f64, step: f64) -> Self {
        Self {
            min,
            max,
            step: Some(step),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() || value < self.min || value > self.max {
            return false;
        }
        match self.step {
            Some(step) => value % step == 0.0,
            None => true,
        }
    }

    /// Fail with `ParameterOutOfRange` naming `field` unless `value` fits.
    pub fn check(&self, field: &'static str, value: f64) -> Result<(), ValidationError> {
        if self.contains(value) {
            return Ok(());
        }
        Err(ValidationError::ParameterOutOfRange {
            field,
            value: value.to_string(),
            range: self.to_string(),
        })
    }

    pub fn check_int(&self, field: &'static str, value: i64) -> Result<(), ValidationError> {
        self.check(field, value as f64)
    }
}

impl fmt::Display for ParameterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)?;
        if let Some(step) = self.step {
            write!(f, " (multiple of {step})")?;
        }
        Ok(())
    }
}

/// Fixed parameter ranges accepted by the remote API.
pub mod ranges {
    use super::ParameterRange;

    /// Output width and height in pixels.
    pub const DIMENSION: ParameterRange = ParameterRange::stepped(256.0, 1024.0, 64.0);
    /// Denoising steps.
    pub const STEPS: ParameterRange = ParameterRange::new(10.0, 50.0);
    /// Text guidance scale.
    pub const GUIDANCE_SCALE: ParameterRange = ParameterRange::new(1.0, 20.0);
    /// Results per text-to-image call.
    pub const GENERATE_RESULTS: ParameterRange = ParameterRange::new(1.0, 4.0);
    /// Variations per lifestyle shot.
    pub const LIFESTYLE_RESULTS: ParameterRange = ParameterRange::new(1.0, 8.0);
    /// Variations per generative fill.
    pub const FILL_RESULTS: ParameterRange = ParameterRange::new(1.0, 4.0);
    pub const SEED: ParameterRange = ParameterRange::new(1.0, 4_294_967_295.0);
    pub const SHADOW_INTENSITY: ParameterRange = ParameterRange::new(0.1, 1.0);
    pub const SHADOW_BLUR: ParameterRange = ParameterRange::new(1.0, 20.0);
}

/// Reject prompts that are empty after trimming.
pub(crate) fn require_text(field: &'static str, text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::MissingInput(field));
    }
    Ok(())
}

/// Accept `#RRGGBB` colours only.
pub(crate) fn check_hex_colour(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        return Ok(());
    }
    Err(ValidationError::ParameterOutOfRange {
        field,
        value: value.to_string(),
        range: "#000000..=#FFFFFF".to_string(),
    })
}
