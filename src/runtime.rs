use crate::utils::error::Result;
use crate::utils::validation::validate_positive_number;
use tokio::runtime::{Builder, Runtime};

pub const WORKER_THREAD_NAME: &str = "repo-viewer-worker";

/// Multi-threaded runtime with a fixed number of workers.
pub fn build_runtime(threads: usize) -> Result<Runtime> {
    validate_positive_number("threads", threads, 1)?;
    let runtime = Builder::new_multi_thread()
        .worker_threads(threads)
        .thread_name(WORKER_THREAD_NAME)
        .enable_all()
        .build()?;
    Ok(runtime)
}
