//! Typed requests, one per remote operation.
//!
//! Each request is built with defaults matching the remote API and then
//! adjusted through chained setters. Nothing is checked at build time;
//! [`Validate::validate`] runs before dispatch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ImageUpload;
use crate::validation::{
    Constraints, Validate, ValidationError, check_hex_colour, ranges, require_text, validate,
};

/// Output aspect ratio for text-to-image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    Classic,
    #[serde(rename = "3:4")]
    ClassicPortrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Classic => "4:3",
            Self::ClassicPortrait => "3:4",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" => Ok(Self::Square),
            "16:9" => Ok(Self::Landscape),
            "9:16" => Ok(Self::Portrait),
            "4:3" => Ok(Self::Classic),
            "3:4" => Ok(Self::ClassicPortrait),
            other => Err(format!(
                "unknown aspect ratio '{other}' (expected 1:1, 16:9, 9:16, 4:3 or 3:4)"
            )),
        }
    }
}

/// Where the product is placed in a lifestyle shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Automatic,
    Original,
    ManualPlacement,
    CustomCoordinates,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Original => "original",
            Self::ManualPlacement => "manual_placement",
            Self::CustomCoordinates => "custom_coordinates",
        }
    }
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace(|c: char| c == ' ' || c == '-', "_");
        match normalized.as_str() {
            "automatic" => Ok(Self::Automatic),
            "original" => Ok(Self::Original),
            "manual_placement" => Ok(Self::ManualPlacement),
            "custom_coordinates" => Ok(Self::CustomCoordinates),
            other => Err(format!("unknown placement '{other}'")),
        }
    }
}

// ============================================================================
// Text to image
// ============================================================================

/// Text-to-image generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateImageRequest {
    pub prompt: String,
    /// Output width in pixels (256..=1024, multiple of 64).
    pub width: i32,
    /// Output height in pixels (256..=1024, multiple of 64).
    pub height: i32,
    /// Denoising steps (10..=50).
    pub steps: i32,
    /// Text guidance scale (1.0..=20.0).
    pub guidance_scale: f64,
    /// Number of images to produce (1..=4).
    pub num_results: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    pub aspect_ratio: AspectRatio,
    pub model_version: String,
    pub enhance_image: bool,
}

impl GenerateImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            width: 512,
            height: 512,
            steps: 20,
            guidance_scale: 7.5,
            num_results: 1,
            negative_prompt: None,
            seed: None,
            aspect_ratio: AspectRatio::default(),
            model_version: "2.2".to_string(),
            enhance_image: true,
        }
    }

    pub fn width(mut self, width: i32) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: i32) -> Self {
        self.height = height;
        self
    }

    pub fn steps(mut self, steps: i32) -> Self {
        self.steps = steps;
        self
    }

    pub fn guidance_scale(mut self, scale: f64) -> Self {
        self.guidance_scale = scale;
        self
    }

    pub fn num_results(mut self, n: i32) -> Self {
        self.num_results = n;
        self
    }

    pub fn negative_prompt(mut self, text: impl Into<String>) -> Self {
        self.negative_prompt = Some(text.into());
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    pub fn model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = version.into();
        self
    }

    pub fn enhance_image(mut self, enabled: bool) -> Self {
        self.enhance_image = enabled;
        self
    }
}

impl Validate for GenerateImageRequest {
    fn validate(&self, _constraints: &Constraints) -> Result<(), ValidationError> {
        require_text("prompt", &self.prompt)?;
        ranges::DIMENSION.check_int("width", self.width.into())?;
        ranges::DIMENSION.check_int("height", self.height.into())?;
        ranges::STEPS.check_int("steps", self.steps.into())?;
        ranges::GUIDANCE_SCALE.check("guidance_scale", self.guidance_scale)?;
        ranges::GENERATE_RESULTS.check_int("num_results", self.num_results.into())?;
        if let Some(seed) = self.seed {
            ranges::SEED.check_int("seed", seed)?;
        }
        require_text("model_version", &self.model_version)
    }
}

// ============================================================================
// Prompt enhancement
// ============================================================================

/// Rewrite a prompt into a more detailed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancePromptRequest {
    pub prompt: String,
}

impl EnhancePromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Validate for EnhancePromptRequest {
    fn validate(&self, _constraints: &Constraints) -> Result<(), ValidationError> {
        require_text("prompt", &self.prompt)
    }
}

// ============================================================================
// Image-to-image operations
// ============================================================================

/// Place a product image into a described scene.
#[derive(Debug, Clone, PartialEq)]
pub struct LifestyleShotRequest {
    pub image: ImageUpload,
    pub scene_description: String,
    pub placement: Placement,
    /// Number of variations (1..=8).
    pub num_results: i32,
    pub fast: bool,
    pub optimize_description: bool,
}

impl LifestyleShotRequest {
    pub fn new(image: ImageUpload, scene_description: impl Into<String>) -> Self {
        Self {
            image,
            scene_description: scene_description.into(),
            placement: Placement::default(),
            num_results: 4,
            fast: true,
            optimize_description: true,
        }
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn num_results(mut self, n: i32) -> Self {
        self.num_results = n;
        self
    }

    pub fn fast(mut self, enabled: bool) -> Self {
        self.fast = enabled;
        self
    }

    pub fn optimize_description(mut self, enabled: bool) -> Self {
        self.optimize_description = enabled;
        self
    }
}

impl Validate for LifestyleShotRequest {
    fn validate(&self, constraints: &Constraints) -> Result<(), ValidationError> {
        validate(Some(&self.image), constraints)?;
        require_text("scene_description", &self.scene_description)?;
        ranges::LIFESTYLE_RESULTS.check_int("num_results", self.num_results.into())
    }
}

/// Regenerate the masked area of an image from a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerativeFillRequest {
    pub image: ImageUpload,
    /// Greyscale mask; white marks the area to fill.
    pub mask: ImageUpload,
    pub prompt: String,
    pub negative_prompt: Option<String>,
    /// Number of variations (1..=4).
    pub num_results: i32,
    pub seed: Option<i64>,
}

impl GenerativeFillRequest {
    pub fn new(image: ImageUpload, mask: ImageUpload, prompt: impl Into<String>) -> Self {
        Self {
            image,
            mask,
            prompt: prompt.into(),
            negative_prompt: None,
            num_results: 2,
            seed: None,
        }
    }

    pub fn negative_prompt(mut self, text: impl Into<String>) -> Self {
        self.negative_prompt = Some(text.into());
        self
    }

    pub fn num_results(mut self, n: i32) -> Self {
        self.num_results = n;
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Validate for GenerativeFillRequest {
    fn validate(&self, constraints: &Constraints) -> Result<(), ValidationError> {
        validate(Some(&self.image), constraints)?;
        if self.mask.bytes.is_empty() {
            return Err(ValidationError::MissingInput("mask"));
        }
        validate(Some(&self.mask), constraints)?;
        require_text("prompt", &self.prompt)?;
        ranges::FILL_RESULTS.check_int("num_results", self.num_results.into())?;
        if let Some(seed) = self.seed {
            ranges::SEED.check_int("seed", seed)?;
        }
        Ok(())
    }
}

/// Remove the foreground subject from an image.
#[derive(Debug, Clone, PartialEq)]
pub struct EraseForegroundRequest {
    pub image: ImageUpload,
    pub content_moderation: bool,
}

impl EraseForegroundRequest {
    pub fn new(image: ImageUpload) -> Self {
        Self {
            image,
            content_moderation: false,
        }
    }

    pub fn content_moderation(mut self, enabled: bool) -> Self {
        self.content_moderation = enabled;
        self
    }
}

impl Validate for EraseForegroundRequest {
    fn validate(&self, constraints: &Constraints) -> Result<(), ValidationError> {
        validate(Some(&self.image), constraints)
    }
}

/// Add a drop shadow under a product.
#[derive(Debug, Clone, PartialEq)]
pub struct AddShadowRequest {
    pub image: ImageUpload,
    /// Shadow opacity (0.1..=1.0).
    pub intensity: f64,
    /// Shadow blur radius (1..=20).
    pub blur: i32,
}

impl AddShadowRequest {
    pub fn new(image: ImageUpload) -> Self {
        Self {
            image,
            intensity: 0.5,
            blur: 10,
        }
    }

    pub fn intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn blur(mut self, blur: i32) -> Self {
        self.blur = blur;
        self
    }
}

impl Validate for AddShadowRequest {
    fn validate(&self, constraints: &Constraints) -> Result<(), ValidationError> {
        validate(Some(&self.image), constraints)?;
        ranges::SHADOW_INTENSITY.check("intensity", self.intensity)?;
        ranges::SHADOW_BLUR.check_int("blur", self.blur.into())
    }
}

/// Cut out a product onto a plain background.
#[derive(Debug, Clone, PartialEq)]
pub struct PackshotRequest {
    pub image: ImageUpload,
    /// `#RRGGBB` background colour.
    pub background_color: String,
}

impl PackshotRequest {
    pub fn new(image: ImageUpload) -> Self {
        Self {
            image,
            background_color: "#FFFFFF".to_string(),
        }
    }

    pub fn background_color(mut self, colour: impl Into<String>) -> Self {
        self.background_color = colour.into();
        self
    }
}

impl Validate for PackshotRequest {
    fn validate(&self, constraints: &Constraints) -> Result<(), ValidationError> {
        validate(Some(&self.image), constraints)?;
        check_hex_colour("background_color", &self.background_color)
    }
}
