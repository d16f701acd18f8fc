//! In-memory driver for tests / 测试用内存驱动
//!
//! Answers the way the remote API does, including its error summaries, and
//! records every call it receives.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};
use std::io::Cursor;
use std::sync::Mutex;

use super::*;

const LINK_PREFIX: &str = "https://dl.mock.test";

/// A recorded driver call / 已记录的驱动调用
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetTemporaryLink(String),
    Fetch(String),
    Upload(CommitInfo, Vec<u8>),
    ListFolder(String, ListOptions),
    CreateFolder(String),
    Copy(Relocation),
    Move(Relocation),
    Delete(String),
    OpenWriter(CommitInfo, usize),
    OpenReader(String),
}

/// Conflict-style rejection carrying `error_summary` / 带 error_summary 的拒绝值
pub fn summary(summary: &str) -> ErrorEnvelope {
    ErrorEnvelope::response(409, json!({ "error_summary": summary, "error": {} }))
}

#[derive(Default)]
pub struct MockDriver {
    folders: Mutex<BTreeMap<String, Listing>>,
    files: Mutex<BTreeMap<String, Bytes>>,
    calls: Mutex<Vec<(String, Call)>>,
    failures: Mutex<VecDeque<ErrorEnvelope>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(self, path: &str, listing: Listing) -> Self {
        self.folders.lock().unwrap().insert(path.to_string(), listing);
        self
    }

    pub fn with_file(self, path: &str, contents: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), Bytes::copy_from_slice(contents));
        self
    }

    /// The next remote call rejects with `envelope` / 下一次调用返回该拒绝值
    pub fn fail_next(&self, envelope: ErrorEnvelope) {
        self.failures.lock().unwrap().push_back(envelope);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn file(&self, path: &str) -> Option<Bytes> {
        self.files.lock().unwrap().get(path).cloned()
    }

    fn record(&self, token: &str, call: Call) -> Result<(), ErrorEnvelope> {
        self.calls.lock().unwrap().push((token.to_string(), call));
        match self.failures.lock().unwrap().pop_front() {
            Some(envelope) => Err(envelope),
            None => Ok(()),
        }
    }

    fn is_folder(&self, path: &str) -> bool {
        self.folders.lock().unwrap().contains_key(path)
    }

    fn is_file(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}

fn receipt(path: &str) -> Value {
    json!({ "metadata": { "path_display": path } })
}

#[async_trait]
impl StorageDriver for MockDriver {
    async fn get_temporary_link(
        &self,
        token: &str,
        path: &str,
    ) -> Result<TemporaryLink, ErrorEnvelope> {
        self.record(token, Call::GetTemporaryLink(path.to_string()))?;
        if self.is_file(path) {
            Ok(TemporaryLink {
                link: format!("{}{}", LINK_PREFIX, path),
            })
        } else if self.is_folder(path) {
            Err(summary("path/not_file/.."))
        } else {
            Err(summary("path/not_found/.."))
        }
    }

    async fn fetch(&self, link: &str) -> Result<ByteStream, ErrorEnvelope> {
        self.record("", Call::Fetch(link.to_string()))?;
        let path = link.trim_start_matches(LINK_PREFIX);
        match self.file(path) {
            Some(contents) => Ok(Box::new(Cursor::new(contents.to_vec()))),
            None => Err(ErrorEnvelope::response(410, json!("link expired"))),
        }
    }

    async fn upload(
        &self,
        token: &str,
        commit: &CommitInfo,
        contents: Bytes,
    ) -> Result<Value, ErrorEnvelope> {
        self.record(token, Call::Upload(commit.clone(), contents.to_vec()))?;
        let size = contents.len();
        self.files.lock().unwrap().insert(commit.path.clone(), contents);
        Ok(json!({ "path_display": commit.path, "size": size }))
    }

    async fn list_folder(
        &self,
        token: &str,
        path: &str,
        options: &ListOptions,
    ) -> Result<Listing, ErrorEnvelope> {
        self.record(token, Call::ListFolder(path.to_string(), options.clone()))?;
        if let Some(listing) = self.folders.lock().unwrap().get(path) {
            return Ok(listing.clone());
        }
        if self.is_file(path) {
            Err(summary("path/not_folder/.."))
        } else {
            Err(summary("path/not_found/.."))
        }
    }

    async fn create_folder(&self, token: &str, path: &str) -> Result<Value, ErrorEnvelope> {
        self.record(token, Call::CreateFolder(path.to_string()))?;
        let mut folders = self.folders.lock().unwrap();
        if folders.contains_key(path) {
            return Err(summary("path/conflict/folder/.."));
        }
        folders.insert(path.to_string(), Vec::new());
        Ok(receipt(path))
    }

    async fn copy(&self, token: &str, relocation: &Relocation) -> Result<Value, ErrorEnvelope> {
        self.record(token, Call::Copy(relocation.clone()))?;
        match self.file(&relocation.from_path) {
            Some(contents) => {
                self.files
                    .lock()
                    .unwrap()
                    .insert(relocation.to_path.clone(), contents);
                Ok(receipt(&relocation.to_path))
            }
            None => Err(summary("from_lookup/not_found/..")),
        }
    }

    async fn move_item(
        &self,
        token: &str,
        relocation: &Relocation,
    ) -> Result<Value, ErrorEnvelope> {
        self.record(token, Call::Move(relocation.clone()))?;
        let mut files = self.files.lock().unwrap();
        match files.remove(&relocation.from_path) {
            Some(contents) => {
                files.insert(relocation.to_path.clone(), contents);
                Ok(receipt(&relocation.to_path))
            }
            None => Err(summary("from_lookup/not_found/..")),
        }
    }

    async fn delete(&self, token: &str, path: &str) -> Result<Value, ErrorEnvelope> {
        self.record(token, Call::Delete(path.to_string()))?;
        let removed_file = self.files.lock().unwrap().remove(path).is_some();
        let removed_folder = self.folders.lock().unwrap().remove(path).is_some();
        if removed_file || removed_folder {
            Ok(receipt(path))
        } else {
            Err(summary("path_lookup/not_found/.."))
        }
    }

    fn open_writer(&self, token: &str, commit: CommitInfo, chunk_size: usize) -> WriteStream {
        self.calls
            .lock()
            .unwrap()
            .push((token.to_string(), Call::OpenWriter(commit, chunk_size)));
        Box::new(tokio::io::sink())
    }

    fn open_reader(&self, token: &str, path: &str) -> ByteStream {
        self.calls
            .lock()
            .unwrap()
            .push((token.to_string(), Call::OpenReader(path.to_string())));
        let contents = self.file(path).unwrap_or_default();
        Box::new(Cursor::new(contents.to_vec()))
    }
}
