//! Dropbox streaming writer / Dropbox流式写入器
//!
//! Keeps at most one chunk in memory. The first full chunk opens an upload
//! session, later ones are appended at the running offset, shutdown commits
//! the rest. A stream that never exceeded one chunk goes up as one plain upload.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::future::BoxFuture;
use futures::ready;
use serde_json::Value;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

use crate::error::Error;
use crate::normalize::normalize;
use crate::storage::{CommitInfo, ErrorEnvelope};

/// Upload session primitives / 上传会话原语
#[async_trait]
pub trait SessionUpload: Clone + Unpin + Send + Sync + 'static {
    /// Open a session with the first chunk, returns the session id / 开启会话
    async fn start(&self, token: &str, data: Bytes) -> Result<String, ErrorEnvelope>;

    /// Append a chunk at `offset` / 追加分片
    async fn append(
        &self,
        token: &str,
        session_id: &str,
        offset: u64,
        data: Bytes,
    ) -> Result<(), ErrorEnvelope>;

    /// Commit the session with the last bytes / 提交会话
    async fn finish(
        &self,
        token: &str,
        session_id: &str,
        offset: u64,
        commit: &CommitInfo,
        data: Bytes,
    ) -> Result<Value, ErrorEnvelope>;

    /// Single-request upload / 单次上传
    async fn upload(
        &self,
        token: &str,
        commit: &CommitInfo,
        data: Bytes,
    ) -> Result<Value, ErrorEnvelope>;
}

type ChunkFuture = BoxFuture<'static, Result<Option<String>, Error>>;
type CommitFuture = BoxFuture<'static, Result<Value, Error>>;

/// Writer state / 写入器状态
enum WriterState {
    /// Accepting bytes / 接收数据
    Idle,
    /// A chunk is in flight / 分片上传中
    Uploading(ChunkFuture),
    /// Commit in flight / 提交中
    Committing(CommitFuture),
    /// Upload committed / 上传完成
    Done,
    /// Error occurred / 发生错误
    Failed(String),
}

/// Chunked upload writer / 分片上传写入器
pub struct UploadWriter<C: SessionUpload> {
    client: C,
    token: String,
    commit: CommitInfo,
    chunk_size: usize,
    buffer: BytesMut,
    session_id: Option<String>,
    /// Bytes already handed to the session / 已提交到会话的字节数
    offset: u64,
    state: WriterState,
}

impl<C: SessionUpload> UploadWriter<C> {
    pub fn new(client: C, token: String, commit: CommitInfo, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            client,
            token,
            commit,
            chunk_size,
            buffer: BytesMut::with_capacity(chunk_size),
            session_id: None,
            offset: 0,
            state: WriterState::Idle,
        }
    }

    /// Send one full chunk from the buffer / 上传一个完整分片
    fn start_chunk(&mut self) {
        let chunk = self.buffer.split_to(self.chunk_size).freeze();
        let offset = self.offset;
        let client = self.client.clone();
        let token = self.token.clone();

        self.offset += chunk.len() as u64;

        let future: ChunkFuture = match self.session_id.clone() {
            None => Box::pin(async move {
                client.start(&token, chunk).await.map(Some).map_err(normalize)
            }),
            Some(session_id) => Box::pin(async move {
                client
                    .append(&token, &session_id, offset, chunk)
                    .await
                    .map(|_| None)
                    .map_err(normalize)
            }),
        };
        self.state = WriterState::Uploading(future);
    }

    /// Commit whatever is left in the buffer / 提交剩余数据
    fn start_commit(&mut self) {
        let rest = self.buffer.split().freeze();
        let offset = self.offset;
        let client = self.client.clone();
        let token = self.token.clone();
        let commit = self.commit.clone();

        self.offset += rest.len() as u64;
        tracing::debug!(
            "Dropbox writer commit: path={}, total={}",
            commit.path,
            self.offset
        );

        let future: CommitFuture = match self.session_id.clone() {
            None => Box::pin(async move {
                client.upload(&token, &commit, rest).await.map_err(normalize)
            }),
            Some(session_id) => Box::pin(async move {
                client
                    .finish(&token, &session_id, offset, &commit, rest)
                    .await
                    .map_err(normalize)
            }),
        };
        self.state = WriterState::Committing(future);
    }

    /// Drive the in-flight chunk, if any / 推进正在上传的分片
    fn poll_chunk(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.state {
            WriterState::Idle => Poll::Ready(Ok(())),
            WriterState::Uploading(future) => {
                let result = ready!(future.as_mut().poll(cx));
                match result {
                    Ok(session_id) => {
                        if session_id.is_some() {
                            self.session_id = session_id;
                        }
                        self.state = WriterState::Idle;
                        Poll::Ready(Ok(()))
                    }
                    Err(e) => {
                        self.state = WriterState::Failed(e.to_string());
                        Poll::Ready(Err(e.into()))
                    }
                }
            }
            WriterState::Failed(message) => Poll::Ready(Err(io::Error::other(message.clone()))),
            WriterState::Committing(_) | WriterState::Done => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "upload stream already closed",
            ))),
        }
    }
}

impl<C: SessionUpload> AsyncWrite for UploadWriter<C> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        loop {
            ready!(this.poll_chunk(cx))?;

            if this.buffer.len() < this.chunk_size {
                let n = buf.len().min(this.chunk_size - this.buffer.len());
                this.buffer.extend_from_slice(&buf[..n]);
                return Poll::Ready(Ok(n));
            }

            this.start_chunk();
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if matches!(this.state, WriterState::Done) {
            return Poll::Ready(Ok(()));
        }
        this.poll_chunk(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        loop {
            if let WriterState::Committing(future) = &mut this.state {
                let result = ready!(future.as_mut().poll(cx));
                return match result {
                    Ok(_) => {
                        this.state = WriterState::Done;
                        Poll::Ready(Ok(()))
                    }
                    Err(e) => {
                        this.state = WriterState::Failed(e.to_string());
                        Poll::Ready(Err(e.into()))
                    }
                };
            }

            if matches!(this.state, WriterState::Done) {
                return Poll::Ready(Ok(()));
            }

            ready!(this.poll_chunk(cx))?;
            this.start_commit();
        }
    }
}
