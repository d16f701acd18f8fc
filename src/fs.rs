//! Filesystem-like operations over the remote storage / 类文件系统操作
//!
//! Every operation validates its arguments first, issues one remote call and
//! normalizes whatever the driver rejects with. Successful results are the
//! provider's raw answers.

use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;

use crate::check::{check_from, check_path, check_to, check_token, StrArg};
use crate::config::ClientConfig;
use crate::drivers::dropbox::DropboxDriver;
use crate::error::{Error, Result};
use crate::normalize::{normalize, normalize_create_folder};
use crate::storage::{
    ByteStream, CommitInfo, ListOptions, Listing, Relocation, StorageDriver, WriteStream,
};

/// Uniform filesystem client / 统一文件系统客户端
///
/// Holds no per-call state; the token travels with each call. Cloning is cheap
/// and clones share the underlying driver.
#[derive(Clone)]
pub struct DropboxFs {
    driver: Arc<dyn StorageDriver>,
    chunk_size: usize,
}

impl DropboxFs {
    /// Client backed by the Dropbox HTTP driver / 使用Dropbox HTTP驱动
    pub fn new(config: ClientConfig) -> Result<Self> {
        let chunk_size = config.chunk_size;
        let driver = DropboxDriver::new(config).map_err(|e| Error::Transport(Box::new(e)))?;
        Ok(Self::with_driver(Arc::new(driver), chunk_size))
    }

    /// Client backed by any driver / 使用任意驱动
    pub fn with_driver(driver: Arc<dyn StorageDriver>, chunk_size: usize) -> Self {
        Self { driver, chunk_size }
    }

    /// Read a file: temporary link, then fetch / 读取文件
    pub async fn read_file(&self, token: impl StrArg, path: impl StrArg) -> Result<ByteStream> {
        let token = check_token(&token)?;
        let path = check_path(&path)?;

        self.get_file(token, path).await
    }

    /// Upload a file, always replacing / 上传文件（覆盖）
    pub async fn write_file(
        &self,
        token: impl StrArg,
        path: impl StrArg,
        contents: impl Into<Bytes>,
    ) -> Result<Value> {
        let token = check_token(&token)?;
        let path = check_path(&path)?;

        let commit = CommitInfo::overwrite(path);
        self.driver
            .upload(token, &commit, contents.into())
            .await
            .map_err(normalize)
    }

    /// Open a chunked upload stream / 打开分片上传流
    pub fn create_write_stream(
        &self,
        token: impl StrArg,
        path: impl StrArg,
    ) -> Result<WriteStream> {
        let token = check_token(&token)?;
        let path = check_path(&path)?;

        let commit = CommitInfo::overwrite(path);
        Ok(self.driver.open_writer(token, commit, self.chunk_size))
    }

    /// Open a download stream / 打开下载流
    pub fn create_read_stream(&self, token: impl StrArg, path: impl StrArg) -> Result<ByteStream> {
        let token = check_token(&token)?;
        let path = check_path(&path)?;

        Ok(self.driver.open_reader(token, path))
    }

    /// List a folder / 列出目录
    pub async fn read_dir(&self, token: impl StrArg, path: impl StrArg) -> Result<Listing> {
        self.read_dir_with(token, path, &ListOptions::new()).await
    }

    /// List a folder, options passed through verbatim / 列出目录（选项原样透传）
    pub async fn read_dir_with(
        &self,
        token: impl StrArg,
        path: impl StrArg,
        options: &ListOptions,
    ) -> Result<Listing> {
        let token = check_token(&token)?;
        let path = check_path(&path)?;

        self.list_folder(token, path, options).await
    }

    /// Create a folder; an existing folder yields `Ok(None)` / 创建目录（幂等）
    pub async fn mkdir(&self, token: impl StrArg, path: impl StrArg) -> Result<Option<Value>> {
        let token = check_token(&token)?;
        let path = check_path(&path)?;

        match self.driver.create_folder(token, path).await {
            Ok(receipt) => Ok(Some(receipt)),
            Err(envelope) => match normalize_create_folder(envelope) {
                Some(e) => Err(e),
                None => Ok(None),
            },
        }
    }

    /// Copy / 复制
    pub async fn copy(
        &self,
        token: impl StrArg,
        from: impl StrArg,
        to: impl StrArg,
    ) -> Result<Value> {
        let token = check_token(&token)?;
        let relocation = relocation(&from, &to)?;

        self.driver.copy(token, &relocation).await.map_err(normalize)
    }

    /// Move / 移动
    pub async fn move_to(
        &self,
        token: impl StrArg,
        from: impl StrArg,
        to: impl StrArg,
    ) -> Result<Value> {
        let token = check_token(&token)?;
        let relocation = relocation(&from, &to)?;

        self.driver
            .move_item(token, &relocation)
            .await
            .map_err(normalize)
    }

    /// Delete / 删除
    pub async fn remove(&self, token: impl StrArg, path: impl StrArg) -> Result<Value> {
        let token = check_token(&token)?;
        let path = check_path(&path)?;

        self.driver.delete(token, path).await.map_err(normalize)
    }

    pub(crate) async fn get_file(&self, token: &str, path: &str) -> Result<ByteStream> {
        let link = self
            .driver
            .get_temporary_link(token, path)
            .await
            .map_err(normalize)?;

        self.driver.fetch(&link.link).await.map_err(normalize)
    }

    pub(crate) async fn list_folder(
        &self,
        token: &str,
        path: &str,
        options: &ListOptions,
    ) -> Result<Listing> {
        self.driver
            .list_folder(token, path, options)
            .await
            .map_err(normalize)
    }
}

fn relocation(from: &impl StrArg, to: &impl StrArg) -> Result<Relocation> {
    Ok(Relocation {
        from_path: check_from(from)?.to_string(),
        to_path: check_to(to)?.to_string(),
    })
}
