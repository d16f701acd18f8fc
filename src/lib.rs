//! Filesystem-like client over the Dropbox API v2 / Dropbox API v2 类文件系统客户端
//!
//! ```no_run
//! # async fn demo() -> dropbox_fs::Result<()> {
//! use dropbox_fs::{ClientConfig, DropboxFs};
//! use tokio::io::AsyncReadExt;
//!
//! let fs = DropboxFs::new(ClientConfig::default())?;
//! fs.mkdir("token", "/notes").await?;
//! fs.write_file("token", "/notes/a.txt", "hello").await?;
//!
//! let mut body = Vec::new();
//! fs.read("token", "/notes").await?.read_to_end(&mut body).await.ok();
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod config;
pub mod error;
pub mod fs;
pub mod normalize;
pub mod read;
pub mod storage;
pub mod utils;

// Driver modules (point to project root drivers via path attribute) / 驱动模块
#[path = "../drivers/mod.rs"]
pub mod drivers;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use fs::DropboxFs;
pub use storage::{
    ByteStream, EntryKind, ErrorEnvelope, ListOptions, Listing, ListingEntry, StorageDriver,
    WriteStream,
};
