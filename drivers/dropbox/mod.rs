//! Dropbox storage driver / Dropbox存储驱动
//!
//! Talks to the Dropbox API v2 over HTTP with a caller-supplied bearer token
//! 使用调用方提供的 bearer token 访问 Dropbox API v2
//!
//! Architecture principles / 架构原则:
//! - Driver only maps one call to one remote route / 驱动只做一对一映射
//! - Rejections are returned raw, normalization happens above / 拒绝值原样返回，由上层规范化
//! - Never load files into memory, use streaming / 永远不把文件放内存，使用流式传输

pub mod types;
pub mod client;
pub mod driver;
pub mod writer;

pub use client::DropboxClient;
pub use driver::DropboxDriver;
pub use writer::{SessionUpload, UploadWriter};
