use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::BoxError;

#[cfg(test)]
pub(crate) mod testing;

/// Pull-based, single-consumer byte stream / 单次消费的字节流
pub type ByteStream = Box<dyn AsyncRead + Unpin + Send>;

/// Chunked upload sink / 分片上传写入器
pub type WriteStream = Box<dyn AsyncWrite + Unpin + Send>;

/// Listing options, passed through to the provider untouched / 列表选项（原样透传）
pub type ListOptions = Map<String, Value>;

/// Folder contents in provider order / 目录内容（保持服务端顺序）
pub type Listing = Vec<ListingEntry>;

/// Entry kind / 条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One item of a listing / 列表条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    /// Provider-defined fields, passed through opaquely / 服务端原始字段
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl ListingEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}

/// Whatever a provider call rejected with / 服务端调用的原始拒绝值
///
/// `Response` mirrors the envelope of the official SDKs:
/// `{"status": <http status>, "error": <parsed body or raw text>}`.
#[derive(Debug)]
pub enum ErrorEnvelope {
    /// Native error from the transport / 原生错误
    Native(BoxError),
    /// Error object returned by the API / API返回的错误对象
    Response(Value),
}

impl ErrorEnvelope {
    pub fn native(e: impl Into<BoxError>) -> Self {
        ErrorEnvelope::Native(e.into())
    }

    /// Build the envelope for a non-2xx answer / 构造非2xx响应的错误包
    pub fn response(status: u16, error: Value) -> Self {
        ErrorEnvelope::Response(serde_json::json!({
            "status": status,
            "error": error,
        }))
    }
}

impl From<reqwest::Error> for ErrorEnvelope {
    fn from(e: reqwest::Error) -> Self {
        ErrorEnvelope::Native(Box::new(e))
    }
}

/// Short-lived download link / 临时下载链接
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporaryLink {
    pub link: String,
}

/// Arguments of copy and move / 复制与移动参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    pub from_path: String,
    pub to_path: String,
}

/// Upload write mode / 上传写入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
pub enum WriteMode {
    Overwrite,
}

/// Upload commit arguments / 上传提交参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub path: String,
    pub mode: WriteMode,
    pub autorename: bool,
    #[serde(default)]
    pub mute: bool,
}

impl CommitInfo {
    /// Replace whatever is at `path` / 覆盖写入
    pub fn overwrite(path: &str) -> Self {
        Self {
            path: path.to_string(),
            mode: WriteMode::Overwrite,
            autorename: false,
            mute: false,
        }
    }
}

/// Remote storage driver contract / 远端存储驱动接口
///
/// One method per remote action. Results are the provider's raw answers,
/// rejections are left unnormalized: the caller decides how to surface them.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Obtain a short-lived link to a file's content / 获取临时链接
    async fn get_temporary_link(
        &self,
        token: &str,
        path: &str,
    ) -> Result<TemporaryLink, ErrorEnvelope>;

    /// Fetch the content behind a temporary link / 拉取链接内容
    async fn fetch(&self, link: &str) -> Result<ByteStream, ErrorEnvelope>;

    /// Upload a whole file / 上传完整文件
    async fn upload(
        &self,
        token: &str,
        commit: &CommitInfo,
        contents: Bytes,
    ) -> Result<Value, ErrorEnvelope>;

    /// List folder entries / 列出目录内容
    async fn list_folder(
        &self,
        token: &str,
        path: &str,
        options: &ListOptions,
    ) -> Result<Listing, ErrorEnvelope>;

    /// Create folder / 创建目录
    async fn create_folder(&self, token: &str, path: &str) -> Result<Value, ErrorEnvelope>;

    /// Copy file or folder / 复制
    async fn copy(&self, token: &str, relocation: &Relocation) -> Result<Value, ErrorEnvelope>;

    /// Move file or folder / 移动
    async fn move_item(
        &self,
        token: &str,
        relocation: &Relocation,
    ) -> Result<Value, ErrorEnvelope>;

    /// Delete file or folder / 删除
    async fn delete(&self, token: &str, path: &str) -> Result<Value, ErrorEnvelope>;

    /// Open a chunked upload writer; nothing is sent before the first chunk / 打开分片写入器
    fn open_writer(&self, token: &str, commit: CommitInfo, chunk_size: usize) -> WriteStream;

    /// Open a lazy download reader; nothing is sent before the first read / 打开惰性读取器
    fn open_reader(&self, token: &str, path: &str) -> ByteStream;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_serialization_order() {
        let mut metadata = Map::new();
        metadata.insert("size".to_string(), json!(5));
        metadata.insert("id".to_string(), json!("id:1"));

        let entry = ListingEntry {
            name: "a.txt".to_string(),
            path: "/dir/a.txt".to_string(),
            kind: EntryKind::File,
            metadata,
        };

        let text = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            text,
            r#"{"name":"a.txt","path":"/dir/a.txt","kind":"file","id":"id:1","size":5}"#
        );
    }

    #[test]
    fn test_write_mode_tag() {
        let commit = CommitInfo::overwrite("/hello");
        assert_eq!(
            serde_json::to_value(&commit).unwrap(),
            json!({
                "path": "/hello",
                "mode": {".tag": "overwrite"},
                "autorename": false,
                "mute": false,
            })
        );
    }

    #[test]
    fn test_response_envelope_shape() {
        match ErrorEnvelope::response(409, json!({"error_summary": "path/not_found/.."})) {
            ErrorEnvelope::Response(body) => {
                assert_eq!(body["status"], 409);
                assert_eq!(body["error"]["error_summary"], "path/not_found/..");
            }
            ErrorEnvelope::Native(_) => panic!("Expected Response variant"),
        }
    }
}
