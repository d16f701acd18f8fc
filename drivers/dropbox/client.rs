//! Dropbox HTTP client / Dropbox HTTP客户端
//!
//! RPC routes take a JSON body on the API host; content routes carry their
//! argument in the `Dropbox-API-Arg` header on the content host.

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::io::StreamReader;

use super::types::{UploadSessionCursor, UploadSessionStartResult};
use super::writer::SessionUpload;
use crate::config::ClientConfig;
use crate::storage::{ByteStream, CommitInfo, ErrorEnvelope};
use crate::utils::header_safe_json;

const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// Dropbox HTTP client / Dropbox HTTP客户端
#[derive(Clone)]
pub struct DropboxClient {
    http: Client,
    config: Arc<ClientConfig>,
}

impl DropboxClient {
    pub fn new(config: ClientConfig) -> reqwest::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Call an RPC route / 调用RPC接口
    pub async fn rpc(&self, route: &str, token: &str, arg: &Value) -> Result<Value, ErrorEnvelope> {
        let url = format!("{}/2/{}", self.config.api_host, route);
        tracing::debug!("Dropbox rpc: {}", route);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(arg)
            .send()
            .await?;

        let response = check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Call a content-upload route / 调用内容上传接口
    pub async fn content_upload(
        &self,
        route: &str,
        token: &str,
        arg: &Value,
        body: Bytes,
    ) -> Result<Value, ErrorEnvelope> {
        let url = format!("{}/2/{}", self.config.content_host, route);
        tracing::debug!("Dropbox upload: {}, {} bytes", route, body.len());

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header(API_ARG_HEADER, header_safe_json(arg))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await?;

        let response = check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Call a content-download route, body left unread / 调用内容下载接口
    pub async fn content_download(
        &self,
        route: &str,
        token: &str,
        arg: &Value,
    ) -> Result<Response, ErrorEnvelope> {
        let url = format!("{}/2/{}", self.config.content_host, route);
        tracing::debug!("Dropbox download: {}", route);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header(API_ARG_HEADER, header_safe_json(arg))
            .send()
            .await?;

        check_response(response).await
    }

    /// Plain GET without auth, for temporary links / 无鉴权GET（临时链接）
    pub async fn get(&self, url: &str) -> Result<Response, ErrorEnvelope> {
        let response = self.http.get(url).send().await?;
        check_response(response).await
    }
}

#[async_trait]
impl SessionUpload for DropboxClient {
    async fn start(&self, token: &str, data: Bytes) -> Result<String, ErrorEnvelope> {
        let value = self
            .content_upload("files/upload_session/start", token, &json!({ "close": false }), data)
            .await?;
        let result: UploadSessionStartResult =
            serde_json::from_value(value).map_err(ErrorEnvelope::native)?;
        Ok(result.session_id)
    }

    async fn append(
        &self,
        token: &str,
        session_id: &str,
        offset: u64,
        data: Bytes,
    ) -> Result<(), ErrorEnvelope> {
        let cursor = UploadSessionCursor {
            session_id: session_id.to_string(),
            offset,
        };
        let arg = json!({ "cursor": cursor, "close": false });
        self.content_upload("files/upload_session/append_v2", token, &arg, data)
            .await?;
        Ok(())
    }

    async fn finish(
        &self,
        token: &str,
        session_id: &str,
        offset: u64,
        commit: &CommitInfo,
        data: Bytes,
    ) -> Result<Value, ErrorEnvelope> {
        let cursor = UploadSessionCursor {
            session_id: session_id.to_string(),
            offset,
        };
        let arg = json!({ "cursor": cursor, "commit": commit });
        self.content_upload("files/upload_session/finish", token, &arg, data)
            .await
    }

    async fn upload(
        &self,
        token: &str,
        commit: &CommitInfo,
        data: Bytes,
    ) -> Result<Value, ErrorEnvelope> {
        let arg = serde_json::to_value(commit).map_err(ErrorEnvelope::native)?;
        self.content_upload("files/upload", token, &arg, data).await
    }
}

/// Turn a non-2xx answer into an error envelope / 将非2xx响应转换为错误包
async fn check_response(response: Response) -> Result<Response, ErrorEnvelope> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await?;
    Err(error_envelope(status.as_u16(), text))
}

/// JSON bodies are kept as objects, anything else as the raw text / JSON保留为对象，其余保留原文
pub fn error_envelope(status: u16, text: String) -> ErrorEnvelope {
    let error = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
    ErrorEnvelope::response(status, error)
}

/// Stream the response body, never loaded into memory / 流式传输响应体
pub fn into_byte_stream(response: Response) -> ByteStream {
    let stream = response.bytes_stream().map_err(std::io::Error::other);
    Box::new(StreamReader::new(Box::pin(stream)))
}
