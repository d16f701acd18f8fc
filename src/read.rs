//! Path-type-agnostic read / 不区分类型的读取
//!
//! Tries the path as a folder first; a "not a folder" rejection falls back to
//! a file read. Folders come back as their listing rendered as JSON.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::Cursor;
use tokio::task::JoinHandle;

use crate::check::{check_fn, check_path, check_token, StrArg};
use crate::error::{Error, Result};
use crate::fs::DropboxFs;
use crate::normalize::is_not_folder;
use crate::storage::{ByteStream, ListOptions, Listing};

/// Render a listing as JSON indented by four spaces / 以四空格缩进序列化目录
pub fn render_listing(listing: &Listing) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    listing
        .serialize(&mut serializer)
        .map_err(|e| Error::Transport(Box::new(e)))?;
    Ok(buf)
}

impl DropboxFs {
    /// Read a folder listing or a file / 读取目录或文件
    pub async fn read(&self, token: impl StrArg, path: impl StrArg) -> Result<ByteStream> {
        self.read_with(token, path, &ListOptions::new()).await
    }

    /// Same as [`DropboxFs::read`], options go to the listing call / 选项传给列表调用
    pub async fn read_with(
        &self,
        token: impl StrArg,
        path: impl StrArg,
        options: &ListOptions,
    ) -> Result<ByteStream> {
        let token = check_token(&token)?;
        let path = check_path(&path)?;

        match self.list_folder(token, path, options).await {
            Ok(listing) => {
                let stream: ByteStream = Box::new(Cursor::new(render_listing(&listing)?));
                Ok(stream)
            }
            Err(e) if is_not_folder(&e) => {
                tracing::debug!("read: {} is not a folder, reading as file", path);
                self.get_file(token, path).await
            }
            Err(e) => Err(e),
        }
    }

    /// Callback flavour of [`DropboxFs::read_with`] / 回调形式的读取
    ///
    /// Arguments are checked before anything is spawned; the callback receives
    /// the outcome exactly once. Must be called from within a Tokio runtime.
    pub fn read_with_callback<F>(
        &self,
        token: impl StrArg,
        path: impl StrArg,
        options: ListOptions,
        callback: Option<F>,
    ) -> Result<JoinHandle<()>>
    where
        F: FnOnce(Result<ByteStream>) + Send + 'static,
    {
        let token = check_token(&token)?.to_string();
        let path = check_path(&path)?.to_string();
        let callback = check_fn(callback)?;

        let fs = self.clone();
        Ok(tokio::spawn(async move {
            let outcome = fs.read_with(token, path, &options).await;
            callback(outcome);
        }))
    }
}
