//! Dropbox driver implementation / Dropbox驱动实现

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, TryStreamExt};
use serde_json::{json, Value};
use tokio_util::io::StreamReader;

use super::client::{into_byte_stream, DropboxClient};
use super::types::{list_folder_arg, to_listing, ListFolderResult};
use super::writer::{SessionUpload, UploadWriter};
use crate::config::ClientConfig;
use crate::normalize::normalize;
use crate::storage::{
    ByteStream, CommitInfo, ErrorEnvelope, ListOptions, Listing, Relocation, StorageDriver,
    TemporaryLink, WriteStream,
};
use crate::utils::to_api_path;

/// Dropbox API v2 driver / Dropbox API v2 驱动
#[derive(Clone)]
pub struct DropboxDriver {
    client: DropboxClient,
}

impl DropboxDriver {
    /// Create a new driver instance / 创建新的驱动实例
    pub fn new(config: ClientConfig) -> reqwest::Result<Self> {
        Ok(Self {
            client: DropboxClient::new(config)?,
        })
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ErrorEnvelope> {
    serde_json::from_value(value).map_err(ErrorEnvelope::native)
}

fn with_api_path(commit: &CommitInfo) -> CommitInfo {
    CommitInfo {
        path: to_api_path(&commit.path),
        ..commit.clone()
    }
}

#[async_trait]
impl StorageDriver for DropboxDriver {
    async fn get_temporary_link(
        &self,
        token: &str,
        path: &str,
    ) -> Result<TemporaryLink, ErrorEnvelope> {
        let arg = json!({ "path": to_api_path(path) });
        let value = self.client.rpc("files/get_temporary_link", token, &arg).await?;
        parse(value)
    }

    async fn fetch(&self, link: &str) -> Result<ByteStream, ErrorEnvelope> {
        let response = self.client.get(link).await?;
        Ok(into_byte_stream(response))
    }

    async fn upload(
        &self,
        token: &str,
        commit: &CommitInfo,
        contents: Bytes,
    ) -> Result<Value, ErrorEnvelope> {
        SessionUpload::upload(&self.client, token, &with_api_path(commit), contents).await
    }

    async fn list_folder(
        &self,
        token: &str,
        path: &str,
        options: &ListOptions,
    ) -> Result<Listing, ErrorEnvelope> {
        let api_path = to_api_path(path);
        let arg = list_folder_arg(&api_path, options);

        let mut page: ListFolderResult =
            parse(self.client.rpc("files/list_folder", token, &arg).await?)?;
        let mut entries = std::mem::take(&mut page.entries);

        while page.has_more {
            let arg = json!({ "cursor": page.cursor });
            page = parse(self.client.rpc("files/list_folder/continue", token, &arg).await?)?;
            entries.append(&mut page.entries);
        }

        tracing::debug!("Dropbox list: path={:?}, entries={}", api_path, entries.len());
        Ok(to_listing(&api_path, entries))
    }

    async fn create_folder(&self, token: &str, path: &str) -> Result<Value, ErrorEnvelope> {
        let arg = json!({ "path": to_api_path(path), "autorename": false });
        self.client.rpc("files/create_folder_v2", token, &arg).await
    }

    async fn copy(&self, token: &str, relocation: &Relocation) -> Result<Value, ErrorEnvelope> {
        let arg = json!({
            "from_path": to_api_path(&relocation.from_path),
            "to_path": to_api_path(&relocation.to_path),
        });
        self.client.rpc("files/copy_v2", token, &arg).await
    }

    async fn move_item(
        &self,
        token: &str,
        relocation: &Relocation,
    ) -> Result<Value, ErrorEnvelope> {
        let arg = json!({
            "from_path": to_api_path(&relocation.from_path),
            "to_path": to_api_path(&relocation.to_path),
        });
        self.client.rpc("files/move_v2", token, &arg).await
    }

    async fn delete(&self, token: &str, path: &str) -> Result<Value, ErrorEnvelope> {
        let arg = json!({ "path": to_api_path(path) });
        self.client.rpc("files/delete_v2", token, &arg).await
    }

    fn open_writer(&self, token: &str, commit: CommitInfo, chunk_size: usize) -> WriteStream {
        Box::new(UploadWriter::new(
            self.client.clone(),
            token.to_string(),
            with_api_path(&commit),
            chunk_size,
        ))
    }

    fn open_reader(&self, token: &str, path: &str) -> ByteStream {
        let client = self.client.clone();
        let token = token.to_string();
        let arg = json!({ "path": to_api_path(path) });

        // Nothing is requested until the reader is first polled
        let body = stream::once(async move {
            let response = client
                .content_download("files/download", &token, &arg)
                .await
                .map_err(|e| std::io::Error::from(normalize(e)))?;
            Ok::<_, std::io::Error>(response.bytes_stream().map_err(std::io::Error::other))
        })
        .try_flatten();

        Box::new(StreamReader::new(Box::pin(body)))
    }
}
