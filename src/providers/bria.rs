//! Bria API client for text-to-image and product image editing.
//!
//! All endpoints take JSON; uploaded images travel base64-encoded in the
//! body. Responses carry hosted result URLs (`result_url`, `result_urls`,
//! `result[].urls`) or inline base64 images (`result.images`).

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::traits::ImageGateway;
use crate::types::{
    AddShadowRequest, EnhancePromptRequest, EraseForegroundRequest, GenerateImageRequest,
    GenerativeFillRequest, GeneratedImages, ImageOutput, LifestyleShotRequest, PackshotRequest,
};
use crate::{AdsnapError, Result, version};

/// Default base URL for the Bria API
pub const DEFAULT_BASE_URL: &str = "https://engine.prod.bria-api.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the Bria image API.
///
/// Built without an API key, the client still constructs; every
/// authenticated call then fails with [`AdsnapError::MissingApiKey`]
/// before touching the network.
#[derive(Clone)]
pub struct BriaClient {
    api_key: Option<String>,
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl BriaClient {
    /// Create a client against the production API.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(version::user_agent())
            .build()
            .map_err(|e| AdsnapError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_base_url(
            config.api.api_key.clone(),
            config.api.base_url.clone(),
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(AdsnapError::MissingApiKey)
    }

    /// POST a JSON body and return the checked JSON response.
    async fn post_json<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        let api_key = self.api_key()?;
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = response.status();
        debug!(endpoint, status = status.as_u16(), "API response");

        let response = check_status(response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| AdsnapError::InvalidResponse(format!("{endpoint}: {e}")))?;

        check_application_error(status, &value)?;
        Ok(value)
    }

    async fn post_images<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<GeneratedImages> {
        let value = self.post_json(endpoint, body).await?;
        parse_images(&value)
    }

    /// Map a transport failure to a timeout or network error.
    fn transport_error(&self, endpoint: &str, err: reqwest::Error) -> AdsnapError {
        if err.is_timeout() {
            AdsnapError::Timeout {
                after: self.timeout,
            }
        } else if err.is_connect() {
            AdsnapError::Network(format!("connection error for {endpoint}: {err}"))
        } else {
            AdsnapError::Network(format!("request to {endpoint} failed: {err}"))
        }
    }
}

/// Turn a non-2xx response into `Remote` with the body as detail.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(status = status.as_u16(), error = %e, "failed to read error body");
            String::new()
        }
    };
    let detail = match body.trim() {
        "" => status.canonical_reason().unwrap_or("no details").to_string(),
        text => text.to_string(),
    };
    Err(AdsnapError::Remote {
        status: Some(status.as_u16()),
        message: format!("API Error: {} - {}", status.as_u16(), detail),
    })
}

/// A 2xx body may still report an application-level failure in `error`.
fn check_application_error(status: StatusCode, value: &Value) -> Result<()> {
    let message = match value.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Ok(()),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
        Some(other) => other.to_string(),
    };
    Err(AdsnapError::Remote {
        status: Some(status.as_u16()),
        message,
    })
}

/// Collect every image the response carries, in order.
fn parse_images(value: &Value) -> Result<GeneratedImages> {
    let mut images = Vec::new();

    if let Some(url) = value.get("result_url").and_then(Value::as_str) {
        images.push(ImageOutput::Url(url.to_string()));
    }

    if let Some(urls) = value.get("result_urls").and_then(Value::as_array) {
        images.extend(
            urls.iter()
                .filter_map(Value::as_str)
                .map(|u| ImageOutput::Url(u.to_string())),
        );
    }

    match value.get("result") {
        // {"result": {"images": ["<base64>", ...]}}
        Some(Value::Object(obj)) => {
            if let Some(list) = obj.get("images").and_then(Value::as_array) {
                for item in list {
                    let s = item.as_str().ok_or_else(|| {
                        AdsnapError::InvalidResponse("unexpected image format in response".into())
                    })?;
                    images.push(image_from_str(s)?);
                }
            }
        }
        // {"result": [{"urls": [...]}, ...]} or {"result": ["<url>", ...]}
        Some(Value::Array(entries)) => {
            for entry in entries {
                match entry {
                    Value::String(s) => images.push(image_from_str(s)?),
                    Value::Object(obj) => {
                        if let Some(urls) = obj.get("urls").and_then(Value::as_array) {
                            images.extend(
                                urls.iter()
                                    .filter_map(Value::as_str)
                                    .map(|u| ImageOutput::Url(u.to_string())),
                            );
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    if images.is_empty() {
        return Err(AdsnapError::InvalidResponse(
            "no images in response".to_string(),
        ));
    }
    Ok(GeneratedImages::new(images))
}

fn image_from_str(s: &str) -> Result<ImageOutput> {
    if s.starts_with("http://") || s.starts_with("https://") {
        return Ok(ImageOutput::Url(s.to_string()));
    }
    STANDARD
        .decode(s.trim())
        .map(ImageOutput::Bytes)
        .map_err(|e| AdsnapError::InvalidResponse(format!("image is neither URL nor base64: {e}")))
}

fn parse_enhanced_prompt(value: &Value) -> Result<String> {
    let candidate = value
        .get("prompt variations")
        .and_then(Value::as_array)
        .and_then(|v| v.first())
        .and_then(Value::as_str)
        .or_else(|| value.get("result").and_then(Value::as_str))
        .or_else(|| value.get("enhanced_prompt").and_then(Value::as_str));

    match candidate.map(str::trim) {
        Some(prompt) if !prompt.is_empty() => Ok(prompt.to_string()),
        _ => Err(AdsnapError::InvalidResponse(
            "no enhanced prompt in response".to_string(),
        )),
    }
}

fn non_blank(text: &Option<String>) -> Option<&str> {
    text.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ============================================================================
// Wire bodies
// ============================================================================

#[derive(Serialize)]
struct TextToImageBody<'a> {
    prompt: &'a str,
    num_results: i32,
    aspect_ratio: &'a str,
    width: i32,
    height: i32,
    steps_num: i32,
    text_guidance_scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    enhance_image: bool,
    sync: bool,
}

#[derive(Serialize)]
struct PromptEnhancerBody<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
struct LifestyleBody<'a> {
    file: String,
    scene_description: &'a str,
    placement_type: &'a str,
    num_results: i32,
    fast: bool,
    optimize_description: bool,
    sync: bool,
}

#[derive(Serialize)]
struct GenFillBody<'a> {
    file: String,
    mask_file: String,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
    num_results: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    sync: bool,
}

#[derive(Serialize)]
struct EraseBody {
    file: String,
    content_moderation: bool,
}

#[derive(Serialize)]
struct ShadowBody {
    file: String,
    shadow_intensity: f64,
    shadow_blur: i32,
}

#[derive(Serialize)]
struct PackshotBody<'a> {
    file: String,
    background_color: &'a str,
}

// ============================================================================
// Gateway Trait Implementation
// ============================================================================

#[async_trait]
impl ImageGateway for BriaClient {
    fn name(&self) -> &str {
        "bria"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip_all, fields(endpoint = "text-to-image"))]
    async fn generate_image(&self, request: &GenerateImageRequest) -> Result<GeneratedImages> {
        let endpoint = format!("v1/text-to-image/hd/{}", request.model_version.trim());
        let body = TextToImageBody {
            prompt: request.prompt.trim(),
            num_results: request.num_results,
            aspect_ratio: request.aspect_ratio.as_str(),
            width: request.width,
            height: request.height,
            steps_num: request.steps,
            text_guidance_scale: request.guidance_scale,
            negative_prompt: non_blank(&request.negative_prompt),
            seed: request.seed,
            enhance_image: request.enhance_image,
            sync: true,
        };
        self.post_images(&endpoint, &body).await
    }

    #[instrument(skip_all, fields(endpoint = "prompt_enhancer"))]
    async fn enhance_prompt(&self, request: &EnhancePromptRequest) -> Result<String> {
        let body = PromptEnhancerBody {
            prompt: request.prompt.trim(),
        };
        let value = self.post_json("v1/prompt_enhancer", &body).await?;
        parse_enhanced_prompt(&value)
    }

    #[instrument(skip_all, fields(endpoint = "lifestyle_shot_by_text"))]
    async fn lifestyle_shot(&self, request: &LifestyleShotRequest) -> Result<GeneratedImages> {
        let body = LifestyleBody {
            file: request.image.to_base64(),
            scene_description: request.scene_description.trim(),
            placement_type: request.placement.as_str(),
            num_results: request.num_results,
            fast: request.fast,
            optimize_description: request.optimize_description,
            sync: true,
        };
        self.post_images("v1/product/lifestyle_shot_by_text", &body)
            .await
    }

    #[instrument(skip_all, fields(endpoint = "gen_fill"))]
    async fn generative_fill(&self, request: &GenerativeFillRequest) -> Result<GeneratedImages> {
        let body = GenFillBody {
            file: request.image.to_base64(),
            mask_file: request.mask.to_base64(),
            prompt: request.prompt.trim(),
            negative_prompt: non_blank(&request.negative_prompt),
            num_results: request.num_results,
            seed: request.seed,
            sync: true,
        };
        self.post_images("v1/gen_fill", &body).await
    }

    #[instrument(skip_all, fields(endpoint = "erase_foreground"))]
    async fn erase_foreground(&self, request: &EraseForegroundRequest) -> Result<GeneratedImages> {
        let body = EraseBody {
            file: request.image.to_base64(),
            content_moderation: request.content_moderation,
        };
        self.post_images("v1/erase_foreground", &body).await
    }

    #[instrument(skip_all, fields(endpoint = "shadow"))]
    async fn add_shadow(&self, request: &AddShadowRequest) -> Result<GeneratedImages> {
        let body = ShadowBody {
            file: request.image.to_base64(),
            shadow_intensity: request.intensity,
            shadow_blur: request.blur,
        };
        self.post_images("v1/product/shadow", &body).await
    }

    #[instrument(skip_all, fields(endpoint = "packshot"))]
    async fn create_packshot(&self, request: &PackshotRequest) -> Result<GeneratedImages> {
        let body = PackshotBody {
            file: request.image.to_base64(),
            background_color: &request.background_color,
        };
        self.post_images("v1/product/packshot", &body).await
    }

    /// Result URLs are pre-signed; no credentials are attached.
    #[instrument(skip_all)]
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error("download", e))?;
        let response = check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error("download", e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_single_result_url() {
        let images = parse_images(&json!({"result_url": "https://cdn/x.png"})).unwrap();
        assert_eq!(images.images, vec![ImageOutput::Url("https://cdn/x.png".into())]);
    }

    #[test]
    fn parses_result_urls_list() {
        let images = parse_images(&json!({"result_urls": ["https://a", "https://b"]})).unwrap();
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn parses_nested_result_urls() {
        let value = json!({"result": [{"urls": ["https://a"], "seed": 7}, {"urls": ["https://b"]}]});
        let images = parse_images(&value).unwrap();
        assert_eq!(images.urls().collect::<Vec<_>>(), vec!["https://a", "https://b"]);
    }

    #[test]
    fn decodes_base64_images() {
        let encoded = STANDARD.encode([0x89u8, b'P', b'N', b'G']);
        let images = parse_images(&json!({"result": {"images": [encoded]}})).unwrap();
        assert_eq!(
            images.first(),
            Some(&ImageOutput::Bytes(vec![0x89, b'P', b'N', b'G']))
        );
    }

    #[test]
    fn non_string_image_is_invalid() {
        let err = parse_images(&json!({"result": {"images": [42]}})).unwrap_err();
        assert!(matches!(err, AdsnapError::InvalidResponse(_)));
    }

    #[test]
    fn empty_response_is_invalid() {
        let err = parse_images(&json!({"status": "ok"})).unwrap_err();
        assert!(matches!(err, AdsnapError::InvalidResponse(_)));
    }

    #[test]
    fn application_error_string() {
        let err = check_application_error(StatusCode::OK, &json!({"error": "quota exceeded"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn application_error_object_uses_message() {
        let value = json!({"error": {"code": 17, "message": "content rejected"}});
        let err = check_application_error(StatusCode::OK, &value).unwrap_err();
        assert_eq!(err.to_string(), "content rejected");
    }

    #[test]
    fn null_error_field_is_ok() {
        assert!(check_application_error(StatusCode::OK, &json!({"error": null})).is_ok());
    }

    #[test]
    fn enhanced_prompt_variants() {
        let v = json!({"prompt variations": ["a cinematic red car"]});
        assert_eq!(parse_enhanced_prompt(&v).unwrap(), "a cinematic red car");
        let v = json!({"result": "better prompt"});
        assert_eq!(parse_enhanced_prompt(&v).unwrap(), "better prompt");
        assert!(parse_enhanced_prompt(&json!({})).is_err());
    }

    #[test]
    fn missing_key_is_not_configured() {
        let client = BriaClient::new(Some("   ".to_string())).unwrap();
        assert!(!client.is_configured());
        let client = BriaClient::new(Some("key".to_string())).unwrap();
        assert!(client.is_configured());
    }
}
