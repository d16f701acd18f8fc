//! Error contract shared by every operation / 所有操作共用的错误类型

use thiserror::Error;

/// Boxed native error coming from the transport / 传输层原生错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Normalized error / 规范化后的错误
///
/// Every failure surfaced by [`crate::DropboxFs`] is exactly one of these.
/// The `Display` output is the bare message, without any prefix.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing argument, raised before any network call / 参数校验失败
    #[error("{0}")]
    Validation(&'static str),

    /// Native transport failure, passed through unchanged / 原生传输错误
    #[error(transparent)]
    Transport(BoxError),

    /// Rejection reported by the remote API / 远端API拒绝
    #[error("{0}")]
    Api(String),
}

impl Error {
    /// Whether the error was raised by argument validation / 是否为参数校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        std::io::Error::other(e)
    }
}

/// Result type for all public operations / 公共操作的结果类型
pub type Result<T> = std::result::Result<T, Error>;
