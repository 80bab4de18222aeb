//! Public types for the adsnap API.

mod image;
mod operation;
mod record;
mod request;
mod upload;

pub use image::{GalleryItem, GeneratedImages, ImageOutput};
pub use operation::Operation;
pub use record::{CallRecord, Outcome};
pub use request::{
    AddShadowRequest, AspectRatio, EnhancePromptRequest, EraseForegroundRequest,
    GenerateImageRequest, GenerativeFillRequest, LifestyleShotRequest, PackshotRequest, Placement,
};
pub use upload::{ImageUpload, MediaType};
