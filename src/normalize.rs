//! Error normalization / 错误规范化
//!
//! The provider rejects with three different shapes: a native error, an object
//! whose `error` field is a string, or an object carrying
//! `error.error_summary`. [`classify`] tells them apart once, everything else
//! works on the resulting [`ErrorShape`].

use serde_json::Value;

use crate::error::{BoxError, Error};
use crate::storage::ErrorEnvelope;

/// Summary marker of "folder already exists" / 目录已存在
const FOLDER_CONFLICT_MARKER: &str = "path/conflict/folder/";

/// Summary marker of "path is not a folder" / 路径不是目录
const NOT_FOLDER_MARKER: &str = "path/not_folder/";

/// Rejection shape / 拒绝值的形态
#[derive(Debug)]
pub enum ErrorShape {
    /// Native error / 原生错误
    Native(BoxError),
    /// `{ error: "<text>" }`
    Text(String),
    /// `{ error: { error_summary: "<summary>" } }`
    Summary(String),
    /// None of the above / 无法识别
    Unrecognized(Value),
}

impl ErrorShape {
    pub fn into_error(self) -> Error {
        match self {
            ErrorShape::Native(e) => Error::Transport(e),
            ErrorShape::Text(message) | ErrorShape::Summary(message) => Error::Api(message),
            ErrorShape::Unrecognized(value) => Error::Api(value.to_string()),
        }
    }
}

/// Classify a rejection / 判断拒绝值形态
pub fn classify(envelope: ErrorEnvelope) -> ErrorShape {
    let value = match envelope {
        ErrorEnvelope::Native(e) => return ErrorShape::Native(e),
        ErrorEnvelope::Response(value) => value,
    };

    match value.get("error") {
        Some(Value::String(text)) => ErrorShape::Text(text.clone()),
        Some(error) => match error.get("error_summary").and_then(Value::as_str) {
            Some(summary) => ErrorShape::Summary(summary.to_string()),
            None => ErrorShape::Unrecognized(value),
        },
        None => ErrorShape::Unrecognized(value),
    }
}

/// Normalize any rejection into one error / 将拒绝值规范化为统一错误
pub fn normalize(envelope: ErrorEnvelope) -> Error {
    classify(envelope).into_error()
}

/// Normalize a folder creation rejection / 规范化创建目录的拒绝值
///
/// Returns `None` when the folder already exists, so that creating it twice
/// is not an error.
pub fn normalize_create_folder(envelope: ErrorEnvelope) -> Option<Error> {
    match classify(envelope) {
        ErrorShape::Summary(summary) if is_folder_conflict(&summary) => {
            tracing::debug!("Folder already exists, conflict suppressed: {}", summary);
            None
        }
        shape => Some(shape.into_error()),
    }
}

/// Whether a summary reports an existing folder / 是否为目录已存在冲突
pub fn is_folder_conflict(summary: &str) -> bool {
    summary.contains(FOLDER_CONFLICT_MARKER)
}

/// Whether an error says the path is not a folder / 是否为"不是目录"错误
///
/// This is a substring match on the message, so an unrelated error whose text
/// happens to contain the marker also matches. It is wider than a prefix
/// test: the marker need not start the message.
// TODO: switch to the structured `.tag` path once ErrorShape keeps the error object
pub fn is_not_folder(error: &Error) -> bool {
    error.to_string().contains(NOT_FOLDER_MARKER)
}
