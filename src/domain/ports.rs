use crate::utils::error::Result;
use bytes::Bytes;
use futures::Stream;
use std::future::Future;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
    /// Writes `data` and returns the number of bytes written.
    fn write_file(&self, path: &str, data: &[u8]) -> impl Future<Output = Result<u64>> + Send;
    /// Writes `chunks` in order without buffering the whole body. Nothing is
    /// left at `path` when the stream yields an error.
    fn write_stream<St>(&self, path: &str, chunks: St) -> impl Future<Output = Result<u64>> + Send
    where
        St: Stream<Item = Result<Bytes>> + Send;
}

pub trait ClientSettings: Send + Sync {
    fn api_url(&self) -> &str;
    /// Request timeout; `0` is never returned.
    fn timeout_seconds(&self) -> u64;
    fn user_agent(&self) -> &str;
    fn token(&self) -> Option<&str>;
    fn concurrent_downloads(&self) -> usize;
}
