use crate::core::Storage;
use crate::utils::error::Result;
use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Filesystem storage rooted at `base_path`. Absolute paths bypass the root.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        let data = fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<u64> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&full_path, data).await?;
        Ok(data.len() as u64)
    }

    /// Streams into a `.part` sibling and renames it once the body is complete.
    async fn write_stream<St>(&self, path: &str, chunks: St) -> Result<u64>
    where
        St: Stream<Item = Result<Bytes>> + Send,
    {
        let full_path = self.base_path.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut part_name = full_path.as_os_str().to_owned();
        part_name.push(".part");
        let part_path = PathBuf::from(part_name);

        let written = match copy_chunks(&part_path, chunks).await {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&part_path).await;
                return Err(e);
            }
        };
        fs::rename(&part_path, &full_path).await?;
        Ok(written)
    }
}

async fn copy_chunks<St>(path: &Path, chunks: St) -> Result<u64>
where
    St: Stream<Item = Result<Bytes>> + Send,
{
    let mut file = File::create(path).await?;
    let mut written = 0u64;
    pin_mut!(chunks);
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}
