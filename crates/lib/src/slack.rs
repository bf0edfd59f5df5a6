//! Slack Web API client: files.info, private downloads, files.delete, chat.postMessage.
//!
//! File APIs use the user-level token (the bot cannot see or delete another
//! user's files); chat.postMessage uses the bot token.

use serde::Deserialize;
use std::time::Duration;

const SLACK_API_BASE: &str = "https://slack.com";

/// Per-request deadline for outbound calls. No retries on failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("slack request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("slack api error: {0}")]
    Api(String),
}

/// Client for the Slack Web API.
#[derive(Clone)]
pub struct SlackClient {
    base_url: String,
    user_token: String,
    bot_token: String,
    client: reqwest::Client,
}

/// Metadata for a shared file, from files.info.
#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    pub id: String,
    pub mimetype: String,
    pub url_private: String,
}

#[derive(Debug, Deserialize)]
struct FileInfoResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    file: Option<FileInfo>,
}

/// Minimal envelope for write calls (files.delete, chat.postMessage).
#[derive(Debug, Deserialize)]
struct ApiAck {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackClient {
    pub fn new(user_token: String, bot_token: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| SLACK_API_BASE.to_string());
        Self {
            base_url,
            user_token,
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    /// POST /api/files.info — fetch MIME type and private download URL for a file.
    pub async fn file_info(&self, file_id: &str) -> Result<FileInfo, SlackError> {
        let url = format!("{}/api/files.info", self.base_url);
        let form = reqwest::multipart::Form::new().text("file", file_id.to_string());
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.user_token)
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SlackError::Api(format!("files.info: {} {}", status, body)));
        }
        let data: FileInfoResponse = res.json().await?;
        if !data.ok {
            return Err(SlackError::Api(format!(
                "files.info returned ok: false ({})",
                data.error.unwrap_or_default()
            )));
        }
        data.file
            .ok_or_else(|| SlackError::Api("files.info response missing file".to_string()))
    }

    /// GET a private file URL (url_private); requires the user token.
    pub async fn download_file(&self, url: &str) -> Result<Vec<u8>, SlackError> {
        let res = self
            .client
            .get(url)
            .bearer_auth(&self.user_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            return Err(SlackError::Api(format!("file download: {}", status)));
        }
        Ok(res.bytes().await?.to_vec())
    }

    /// POST /api/files.delete — remove a file from the workspace.
    pub async fn delete_file(&self, file_id: &str) -> Result<(), SlackError> {
        let url = format!("{}/api/files.delete", self.base_url);
        let form = reqwest::multipart::Form::new().text("file", file_id.to_string());
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.user_token)
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        check_ack("files.delete", res).await
    }

    /// POST /api/chat.postMessage — send a text message to a channel or user id.
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        let url = format!("{}/api/chat.postMessage", self.base_url);
        let form = reqwest::multipart::Form::new()
            .text("channel", channel.to_string())
            .text("text", text.to_string());
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.bot_token)
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        check_ack("chat.postMessage", res).await
    }
}

async fn check_ack(call: &str, res: reqwest::Response) -> Result<(), SlackError> {
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        return Err(SlackError::Api(format!("{}: {} {}", call, status, body)));
    }
    let data: ApiAck = res.json().await?;
    if !data.ok {
        return Err(SlackError::Api(format!(
            "{} returned ok: false ({})",
            call,
            data.error.unwrap_or_default()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_info_response_parses() {
        let data: FileInfoResponse = serde_json::from_str(
            r#"{"ok":true,"file":{"id":"F123","mimetype":"image/png",
                "url_private":"https://files.slack.com/files-pri/T-F123/shot.png",
                "name":"shot.png","size":1024}}"#,
        )
        .expect("parse files.info response");
        assert!(data.ok);
        let file = data.file.expect("file present");
        assert_eq!(file.id, "F123");
        assert_eq!(file.mimetype, "image/png");
        assert!(file.url_private.starts_with("https://files.slack.com/"));
    }

    #[test]
    fn file_info_error_response_parses() {
        let data: FileInfoResponse =
            serde_json::from_str(r#"{"ok":false,"error":"file_not_found"}"#)
                .expect("parse error response");
        assert!(!data.ok);
        assert_eq!(data.error.as_deref(), Some("file_not_found"));
        assert!(data.file.is_none());
    }

    #[test]
    fn base_url_override_strips_trailing_slash() {
        let client = SlackClient::new(
            "xoxp".to_string(),
            "xoxb".to_string(),
            Some("http://127.0.0.1:9999/".to_string()),
        );
        assert_eq!(client.base_url, "http://127.0.0.1:9999");
    }
}
