//! Vision API client: images:annotate with TEXT_DETECTION.
//!
//! "No text found" and a missing annotation both normalize to an empty
//! string, not an error; the denylist check runs the same path either way.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const VISION_API_BASE: &str = "https://vision.googleapis.com";

/// Language hint sent with every annotate request.
const LANGUAGE_HINT: &str = "ro";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("vision request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("vision api error: {0}")]
    Api(String),
}

/// Client for the vision annotate API.
#[derive(Clone)]
pub struct VisionClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateEntry>,
}

#[derive(Debug, Deserialize)]
struct AnnotateEntry {
    #[serde(rename = "fullTextAnnotation", default)]
    full_text_annotation: Option<FullTextAnnotation>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    #[serde(default)]
    text: String,
}

/// Encode raw image bytes for embedding in the annotate request body.
pub fn encode_image(bytes: &[u8]) -> String {
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
}

impl VisionClient {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| VISION_API_BASE.to_string());
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// POST /v1/images:annotate — run TEXT_DETECTION over one base64-encoded
    /// image. Returns the first entry's full text, or "" when the service
    /// finds no text. The API key travels as a query parameter, not a header.
    pub async fn recognize_text(&self, image_base64: &str) -> Result<String, VisionError> {
        let url = format!("{}/v1/images:annotate", self.base_url);
        let body = json!({
            "requests": [{
                "image": { "content": image_base64 },
                "features": [{ "type": "TEXT_DETECTION" }],
                "imageContext": { "languageHints": [LANGUAGE_HINT] },
            }]
        });
        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VisionError::Api(format!("{} {}", status, body)));
        }
        let data: AnnotateResponse = res.json().await?;
        Ok(extract_text(data))
    }
}

fn extract_text(data: AnnotateResponse) -> String {
    data.responses
        .into_iter()
        .next()
        .and_then(|entry| entry.full_text_annotation)
        .map(|a| a.text)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> AnnotateResponse {
        serde_json::from_str(body).expect("parse annotate response")
    }

    #[test]
    fn extracts_first_entry_text() {
        let data = parse(
            r#"{"responses":[
                {"fullTextAnnotation":{"text":"O cafea buna dimineata","pages":[]}},
                {"fullTextAnnotation":{"text":"second entry is ignored"}}
            ]}"#,
        );
        assert_eq!(extract_text(data), "O cafea buna dimineata");
    }

    #[test]
    fn zero_entries_is_empty_text() {
        let data = parse(r#"{"responses":[]}"#);
        assert_eq!(extract_text(data), "");
    }

    #[test]
    fn missing_responses_field_is_empty_text() {
        let data = parse(r#"{}"#);
        assert_eq!(extract_text(data), "");
    }

    #[test]
    fn entry_without_annotation_is_empty_text() {
        let data = parse(r#"{"responses":[{}]}"#);
        assert_eq!(extract_text(data), "");
    }

    #[test]
    fn encode_image_standard_alphabet() {
        assert_eq!(encode_image(b"decaf"), "ZGVjYWY=");
        assert_eq!(encode_image(b""), "");
    }
}
