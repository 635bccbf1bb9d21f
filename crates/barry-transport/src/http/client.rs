//! REST implementation of [`InteractionApi`].

use std::time::Duration;

use async_trait::async_trait;
use barry_core::model::{FileUpload, InteractionResponse, Message, MessagePayload};
use barry_core::{ApiError, ApiResult, InteractionApi};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder, Method, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::{TransportError, TransportResult};

/// Discord API base URL.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Per-request timeout used by [`RestClient::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request body variants.
enum Body {
    Empty,
    Json(Value),
    /// JSON sent as `payload_json` next to `files[i]` parts.
    Multipart(Value, Vec<FileUpload>),
}

impl Body {
    fn with_files(json: Value, files: Vec<FileUpload>) -> Self {
        if files.is_empty() {
            Self::Json(json)
        } else {
            Self::Multipart(json, files)
        }
    }
}

/// Error body returned by Discord.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    retry_after: Option<f64>,
}

/// Discord REST client authenticated with a bot token.
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    authorization: String,
}

impl RestClient {
    /// Creates a client for the public API.
    pub fn new(token: &str) -> TransportResult<Self> {
        Self::with_options(token, DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Creates a client with a custom base URL and request timeout.
    pub fn with_options(token: &str, base_url: &str, timeout: Duration) -> TransportResult<Self> {
        let http = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("DiscordBot (barry, ", env!("CARGO_PKG_VERSION"), ")"))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: format!("Bot {token}"),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request(&self, method: Method, path: &str, body: Body) -> ApiResult<Response> {
        trace!(method = %method, path = %path, "Sending API request");

        let mut request = self
            .http
            .request(method, self.url(path))
            .header("Authorization", &self.authorization);

        request = match body {
            Body::Empty => request,
            Body::Json(json) => request.json(&json),
            Body::Multipart(json, files) => request.multipart(multipart_form(&json, files)?),
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let err = decode_error(status.as_u16(), &text);
        warn!(path = %path, error = %err, "API request failed");
        Err(err)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> ApiResult<T> {
        self.request(method, path, body)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn multipart_form(json: &Value, files: Vec<FileUpload>) -> ApiResult<Form> {
    let mut form = Form::new().text("payload_json", serde_json::to_string(json)?);
    for (i, file) in files.into_iter().enumerate() {
        let part = Part::bytes(file.data).file_name(file.name);
        form = form.part(format!("files[{i}]"), part);
    }
    Ok(form)
}

/// Maps a failed response to an [`ApiError`].
fn decode_error(status: u16, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    if status == 429 {
        return ApiError::RateLimited {
            retry_after: parsed.retry_after.unwrap_or_default(),
        };
    }

    ApiError::Http {
        status,
        code: parsed.code,
        message: parsed.message.unwrap_or_else(|| body.to_string()),
    }
}

#[async_trait]
impl InteractionApi for RestClient {
    async fn create_interaction_response(
        &self,
        interaction_id: &str,
        token: &str,
        response: InteractionResponse,
    ) -> ApiResult<()> {
        debug!(interaction_id = %interaction_id, kind = ?response.kind, "Creating interaction response");
        let body = Body::with_files(response.body(), response.files);
        self.request(
            Method::POST,
            &format!("/interactions/{interaction_id}/{token}/callback"),
            body,
        )
        .await?;
        Ok(())
    }

    async fn create_followup_message(
        &self,
        application_id: &str,
        token: &str,
        payload: MessagePayload,
    ) -> ApiResult<Message> {
        let body = Body::with_files(payload.to_json(), payload.files);
        self.request_json(
            Method::POST,
            &format!("/webhooks/{application_id}/{token}?wait=true"),
            body,
        )
        .await
    }

    async fn get_followup_message(
        &self,
        application_id: &str,
        token: &str,
        message_id: &str,
    ) -> ApiResult<Message> {
        self.request_json(
            Method::GET,
            &format!("/webhooks/{application_id}/{token}/messages/{message_id}"),
            Body::Empty,
        )
        .await
    }

    async fn edit_followup_message(
        &self,
        application_id: &str,
        token: &str,
        message_id: &str,
        payload: MessagePayload,
    ) -> ApiResult<Message> {
        let body = Body::with_files(payload.to_json(), payload.files);
        self.request_json(
            Method::PATCH,
            &format!("/webhooks/{application_id}/{token}/messages/{message_id}"),
            body,
        )
        .await
    }

    async fn delete_followup_message(
        &self,
        application_id: &str,
        token: &str,
        message_id: &str,
    ) -> ApiResult<()> {
        self.request(
            Method::DELETE,
            &format!("/webhooks/{application_id}/{token}/messages/{message_id}"),
            Body::Empty,
        )
        .await?;
        Ok(())
    }

    async fn bulk_overwrite_global_commands(
        &self,
        application_id: &str,
        commands: Vec<Value>,
    ) -> ApiResult<()> {
        self.request(
            Method::PUT,
            &format!("/applications/{application_id}/commands"),
            Body::Json(Value::Array(commands)),
        )
        .await?;
        Ok(())
    }

    async fn bulk_overwrite_guild_commands(
        &self,
        application_id: &str,
        guild_id: &str,
        commands: Vec<Value>,
    ) -> ApiResult<()> {
        self.request(
            Method::PUT,
            &format!("/applications/{application_id}/guilds/{guild_id}/commands"),
            Body::Json(Value::Array(commands)),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_decoded() {
        let err = decode_error(429, r#"{"message": "You are being rate limited.", "retry_after": 1.5}"#);
        assert!(matches!(err, ApiError::RateLimited { retry_after } if retry_after == 1.5));
    }

    #[test]
    fn test_json_error_is_decoded() {
        let err = decode_error(404, r#"{"message": "Unknown Webhook", "code": 10015}"#);
        match err {
            ApiError::Http {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code, Some(10015));
                assert_eq!(message, "Unknown Webhook");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plain_error_keeps_body() {
        let err = decode_error(502, "Bad Gateway");
        assert!(matches!(err, ApiError::Http { code: None, ref message, .. } if message == "Bad Gateway"));
    }

    #[test]
    fn test_files_switch_to_multipart() {
        let json = serde_json::json!({ "content": "hi" });
        assert!(matches!(Body::with_files(json.clone(), Vec::new()), Body::Json(_)));
        assert!(matches!(
            Body::with_files(json, vec![FileUpload::new("a.txt", "a")]),
            Body::Multipart(_, files) if files.len() == 1
        ));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client =
            RestClient::with_options("token", "http://localhost:8080/api/", DEFAULT_REQUEST_TIMEOUT)
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(
            client.url("/applications/1/commands"),
            "http://localhost:8080/api/applications/1/commands"
        );
    }
}
