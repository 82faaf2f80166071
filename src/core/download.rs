use crate::core::client::HttpClient;
use crate::domain::model::ReleaseAsset;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ViewerError};
use futures::stream::{self, StreamExt};
use std::path::Path;

/// Size reported for an asset that produced no bytes.
pub const UNKNOWN_ASSET_DEFAULT_SIZE: i64 = -2;
/// Size reported for an asset that could not be downloaded.
pub const INVALID_ASSET_DEFAULT_SIZE: i64 = -1;
pub const DEFAULT_CONCURRENT_DOWNLOADS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOperationStatus {
    Downloaded(u64),
    /// Nothing was written.
    Unknown,
    Error,
}

impl DownloadOperationStatus {
    pub fn was_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded(_))
    }

    pub fn was_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn was_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn bytes(&self) -> i64 {
        match self {
            Self::Downloaded(bytes) => i64::try_from(*bytes).unwrap_or(i64::MAX),
            Self::Unknown => UNKNOWN_ASSET_DEFAULT_SIZE,
            Self::Error => INVALID_ASSET_DEFAULT_SIZE,
        }
    }
}

pub fn all_downloaded(statuses: &[DownloadOperationStatus]) -> bool {
    statuses.iter().all(DownloadOperationStatus::was_downloaded)
}

/// Fetches URLs and writes their bodies through a [`Storage`].
pub struct DownloaderService<S: Storage> {
    storage: S,
    client: HttpClient,
}

impl<S: Storage> DownloaderService<S> {
    pub fn new(storage: S) -> Result<Self> {
        Ok(Self::with_client(storage, HttpClient::default_downloads()?))
    }

    pub fn with_client(storage: S, client: HttpClient) -> Self {
        Self { storage, client }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn to_directory(&self, directory: &str, file_name: &str, url: &str) -> Result<u64> {
        let path = Path::new(directory).join(file_name);
        self.to_file(&path.to_string_lossy(), url).await
    }

    /// Streams the body of `url` into `path` and returns the number of bytes written.
    pub async fn to_file(&self, path: &str, url: &str) -> Result<u64> {
        tracing::debug!("Downloading {} into {}", url, path);
        let response = self.client.inner().get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ViewerError::DownloadError {
                message: format!("{} answered {}", url, status),
            });
        }

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ViewerError::from));
        let written = self.storage.write_stream(path, chunks).await?;
        tracing::debug!("Wrote {} bytes to {}", written, path);
        Ok(written)
    }
}

/// Downloads the assets of a release.
pub struct AssetDownloaderService<S: Storage> {
    downloader: DownloaderService<S>,
    concurrency: usize,
}

impl<S: Storage> AssetDownloaderService<S> {
    pub fn new(downloader: DownloaderService<S>) -> Self {
        Self {
            downloader,
            concurrency: DEFAULT_CONCURRENT_DOWNLOADS,
        }
    }

    /// Number of downloads `download_all` keeps in flight, at least one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn downloader(&self) -> &DownloaderService<S> {
        &self.downloader
    }

    /// Downloads the asset at the 1-based `index` into `directory`.
    pub async fn download(
        &self,
        assets: &[ReleaseAsset],
        directory: &str,
        index: usize,
    ) -> DownloadOperationStatus {
        if index < 1 || index > assets.len() {
            tracing::warn!(
                "Asset index {} is out of range, release has {} assets",
                index,
                assets.len()
            );
            return DownloadOperationStatus::Error;
        }
        self.download_asset(&assets[index - 1], directory).await
    }

    /// Downloads every asset, returning one status per asset in asset order.
    pub async fn download_all(
        &self,
        assets: &[ReleaseAsset],
        directory: &str,
    ) -> Vec<DownloadOperationStatus> {
        stream::iter(assets)
            .map(|asset| self.download_asset(asset, directory))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    pub async fn download_asset(
        &self,
        asset: &ReleaseAsset,
        directory: &str,
    ) -> DownloadOperationStatus {
        if !is_plain_file_name(&asset.name) {
            tracing::warn!("Refusing to write asset with unsafe name '{}'", asset.name);
            return DownloadOperationStatus::Error;
        }

        match self
            .downloader
            .to_directory(directory, &asset.name, &asset.download_url)
            .await
        {
            Ok(0) => DownloadOperationStatus::Unknown,
            Ok(bytes) => {
                tracing::info!("Downloaded {} ({} bytes)", asset.name, bytes);
                DownloadOperationStatus::Downloaded(bytes)
            }
            Err(e) => {
                tracing::error!("Failed to download {}: {}", asset.name, e);
                DownloadOperationStatus::Error
            }
        }
    }
}

/// Asset names come from the API and are joined onto a local directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        chunk_counts: Arc<Mutex<HashMap<String, usize>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
                chunk_counts: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn chunk_count(&self, path: &str) -> usize {
            self.chunk_counts.lock().await.get(path).copied().unwrap_or(0)
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }

        async fn file_count(&self) -> usize {
            self.files.lock().await.len()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ViewerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<u64> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(data.len() as u64)
        }

        async fn write_stream<St>(&self, path: &str, chunks: St) -> Result<u64>
        where
            St: futures::Stream<Item = Result<bytes::Bytes>> + Send,
        {
            let mut data = Vec::new();
            let mut count = 0;
            futures::pin_mut!(chunks);
            while let Some(chunk) = chunks.next().await {
                data.extend_from_slice(&chunk?);
                count += 1;
            }
            self.chunk_counts.lock().await.insert(path.to_string(), count);
            self.write_file(path, &data).await
        }
    }

    fn service(storage: MockStorage) -> AssetDownloaderService<MockStorage> {
        AssetDownloaderService::new(DownloaderService::new(storage).unwrap())
    }

    fn join(directory: &str, name: &str) -> String {
        Path::new(directory).join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_status_sizes() {
        assert_eq!(DownloadOperationStatus::Downloaded(10).bytes(), 10);
        assert_eq!(DownloadOperationStatus::Unknown.bytes(), UNKNOWN_ASSET_DEFAULT_SIZE);
        assert_eq!(DownloadOperationStatus::Error.bytes(), INVALID_ASSET_DEFAULT_SIZE);
        assert!(all_downloaded(&[DownloadOperationStatus::Downloaded(1)]));
        assert!(!all_downloaded(&[
            DownloadOperationStatus::Downloaded(1),
            DownloadOperationStatus::Unknown
        ]));
    }

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("repo-viewer-1.3.4.jar"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("../evil.sh"));
        assert!(!is_plain_file_name("dir\\evil.exe"));
    }

    #[tokio::test]
    async fn test_download_by_index() {
        let server = MockServer::start();
        let asset_mock = server.mock(|when, then| {
            when.method(GET).path("/download/b.jar");
            then.status(200).body("second asset");
        });

        let storage = MockStorage::new();
        let service = service(storage.clone());
        let assets = vec![
            ReleaseAsset::new("a.jar", server.url("/download/a.jar")),
            ReleaseAsset::new("b.jar", server.url("/download/b.jar")),
        ];

        let status = service.download(&assets, "downloads", 2).await;

        asset_mock.assert();
        assert_eq!(status, DownloadOperationStatus::Downloaded(12));
        assert_eq!(
            storage.get_file(&join("downloads", "b.jar")).await.unwrap(),
            b"second asset".to_vec()
        );
    }

    #[tokio::test]
    async fn test_index_out_of_range_is_error() {
        let storage = MockStorage::new();
        let service = service(storage.clone());
        let assets = vec![ReleaseAsset::new("a.jar", "http://127.0.0.1:9/a.jar")];

        assert!(service.download(&assets, "downloads", 0).await.was_error());
        assert!(service.download(&assets, "downloads", 2).await.was_error());
        assert!(service.download(&[], "downloads", 1).await.was_error());
        assert_eq!(storage.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_body_is_unknown() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/empty.txt");
            then.status(200).body("");
        });

        let service = service(MockStorage::new());
        let assets = vec![ReleaseAsset::new("empty.txt", server.url("/empty.txt"))];

        assert!(service.download(&assets, "out", 1).await.was_unknown());
    }

    #[tokio::test]
    async fn test_http_failure_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gone.jar");
            then.status(404);
        });

        let storage = MockStorage::new();
        let service = service(storage.clone());
        let assets = vec![ReleaseAsset::new("gone.jar", server.url("/gone.jar"))];

        assert!(service.download(&assets, "out", 1).await.was_error());
        assert_eq!(storage.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_unsafe_asset_name_is_not_fetched() {
        let server = MockServer::start();
        let asset_mock = server.mock(|when, then| {
            when.method(GET).path("/evil");
            then.status(200).body("x");
        });

        let service = service(MockStorage::new());
        let assets = vec![ReleaseAsset::new("../evil", server.url("/evil"))];

        assert!(service.download(&assets, "out", 1).await.was_error());
        asset_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_download_all_keeps_asset_order() {
        let server = MockServer::start();
        for (name, body) in [("one.bin", "1"), ("two.bin", "22"), ("three.bin", "333")] {
            server.mock(|when, then| {
                when.method(GET).path(format!("/{}", name));
                then.status(200).body(body);
            });
        }
        server.mock(|when, then| {
            when.method(GET).path("/broken.bin");
            then.status(500);
        });

        let storage = MockStorage::new();
        let service = service(storage.clone()).with_concurrency(2);
        let assets: Vec<ReleaseAsset> = ["one.bin", "broken.bin", "two.bin", "three.bin"]
            .iter()
            .map(|name| ReleaseAsset::new(*name, server.url(format!("/{}", name))))
            .collect();

        let statuses = service.download_all(&assets, "all").await;

        assert_eq!(
            statuses,
            vec![
                DownloadOperationStatus::Downloaded(1),
                DownloadOperationStatus::Error,
                DownloadOperationStatus::Downloaded(2),
                DownloadOperationStatus::Downloaded(3),
            ]
        );
        assert!(!all_downloaded(&statuses));
        assert_eq!(storage.file_count().await, 3);
    }

    #[tokio::test]
    async fn test_large_asset_is_written_in_chunks() {
        let body: Vec<u8> = (0..2 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/large.bin");
            then.status(200).body(body.clone());
        });

        let storage = MockStorage::new();
        let service = service(storage.clone());
        let assets = vec![ReleaseAsset::new("large.bin", server.url("/large.bin"))];

        let status = service.download(&assets, "big", 1).await;

        let path = join("big", "large.bin");
        assert_eq!(status, DownloadOperationStatus::Downloaded(body.len() as u64));
        assert!(storage.chunk_count(&path).await > 1);
        assert_eq!(storage.get_file(&path).await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_stalled_asset_host_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow.jar");
            then.status(200)
                .body("late")
                .delay(std::time::Duration::from_secs(3));
        });

        let storage = MockStorage::new();
        let client =
            HttpClient::downloads("repo-viewer-tests", std::time::Duration::from_secs(1)).unwrap();
        let service =
            AssetDownloaderService::new(DownloaderService::with_client(storage.clone(), client));
        let assets = vec![ReleaseAsset::new("slow.jar", server.url("/slow.jar"))];

        let started = std::time::Instant::now();
        let status = service.download(&assets, "out", 1).await;

        assert!(status.was_error());
        assert!(started.elapsed() < std::time::Duration::from_secs(3));
        assert_eq!(storage.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_redirects_are_followed_for_assets() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/releases/download/v1/app.jar");
            then.status(302).header("Location", server.url("/storage/app.jar"));
        });
        server.mock(|when, then| {
            when.method(GET).path("/storage/app.jar");
            then.status(200).body("jar-bytes");
        });

        let storage = MockStorage::new();
        let downloader = DownloaderService::new(storage.clone()).unwrap();
        let written = downloader
            .to_directory("dl", "app.jar", &server.url("/releases/download/v1/app.jar"))
            .await
            .unwrap();

        assert_eq!(written, 9);
        assert_eq!(
            downloader.storage().read_file(&join("dl", "app.jar")).await.unwrap(),
            b"jar-bytes".to_vec()
        );
    }
}
