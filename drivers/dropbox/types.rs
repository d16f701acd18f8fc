//! Dropbox data type definitions / Dropbox数据类型定义

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::{EntryKind, ListOptions, ListingEntry};

/// `files/list_folder` and `files/list_folder/continue` response / 文件列表响应
#[derive(Debug, Deserialize, Default)]
pub struct ListFolderResult {
    #[serde(default)]
    pub entries: Vec<Value>,
    #[serde(default)]
    pub cursor: String,
    #[serde(default)]
    pub has_more: bool,
}

/// `files/upload_session/start` response / 上传会话响应
#[derive(Debug, Deserialize)]
pub struct UploadSessionStartResult {
    pub session_id: String,
}

/// Upload session cursor / 上传会话游标
#[derive(Debug, Clone, Serialize)]
pub struct UploadSessionCursor {
    pub session_id: String,
    pub offset: u64,
}

/// Build the `files/list_folder` argument / 构造列表请求参数
///
/// Options are copied verbatim; the path argument always wins over a
/// `path` key in the options.
pub fn list_folder_arg(api_path: &str, options: &ListOptions) -> Value {
    let mut arg = options.clone();
    arg.insert("path".to_string(), Value::String(api_path.to_string()));
    Value::Object(arg)
}

/// Convert raw entries into a listing, keeping provider order / 转换为列表条目
///
/// `deleted` entries (only present with `include_deleted`) are skipped.
pub fn to_listing(parent: &str, entries: Vec<Value>) -> Vec<ListingEntry> {
    entries
        .into_iter()
        .filter_map(|entry| to_entry(parent, entry))
        .collect()
}

fn to_entry(parent: &str, entry: Value) -> Option<ListingEntry> {
    let mut metadata: Map<String, Value> = match entry {
        Value::Object(map) => map,
        _ => return None,
    };

    let kind = match metadata.remove(".tag").as_ref().and_then(Value::as_str) {
        Some("file") => EntryKind::File,
        Some("folder") => EntryKind::Folder,
        other => {
            tracing::debug!("Dropbox list: skipping entry with tag {:?}", other);
            return None;
        }
    };

    let name = match metadata.remove("name") {
        Some(Value::String(name)) => name,
        _ => return None,
    };

    let path = metadata
        .get("path_display")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}/{}", parent, name));

    Some(ListingEntry {
        name,
        path,
        kind,
        metadata,
    })
}
