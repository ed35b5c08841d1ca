use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::project::{ProjectConfig, ProjectError};

/// Opaque identifier for an in-flight load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadRequestId(u64);

/// Result of a completed background load.
pub type LoadResult = Result<ProjectConfig, ProjectError>;

/// Non-blocking project loader.
///
/// Reading and parsing a project file runs on a single-worker tokio
/// runtime. Only the parsed [`ProjectConfig`] crosses back to the calling
/// thread, which builds the tree from it; the worker never touches an
/// assembly tree.
pub struct BackgroundLoader {
    runtime: tokio::runtime::Runtime,
    result_tx: mpsc::Sender<(LoadRequestId, LoadResult)>,
    result_rx: mpsc::Receiver<(LoadRequestId, LoadResult)>,
    next_id: u64,
}

impl BackgroundLoader {
    pub fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("project-loader")
            .enable_all()
            .build()?;

        let (tx, rx) = mpsc::channel();

        Ok(Self {
            runtime,
            result_tx: tx,
            result_rx: rx,
            next_id: 0,
        })
    }

    /// Dispatch a load of `path`. Returns an ID to match the result.
    pub fn load(&mut self, path: &Path) -> LoadRequestId {
        let owned: PathBuf = path.to_owned();
        log::debug!("Loading project {} in background", owned.display());
        self.dispatch(path, async move {
            let read = tokio::fs::read_to_string(&owned).await;
            match read {
                Ok(content) => ProjectConfig::parse(&content, &owned),
                Err(source) => Err(ProjectError::Io {
                    path: owned,
                    source,
                }),
            }
        })
    }

    /// Runs `work` on the runtime and reports its result under a new ID.
    ///
    /// A task that panics or is cancelled still reports, as
    /// [`ProjectError::Aborted`].
    fn dispatch<F>(&mut self, path: &Path, work: F) -> LoadRequestId
    where
        F: Future<Output = LoadResult> + Send + 'static,
    {
        let id = LoadRequestId(self.next_id);
        self.next_id += 1;

        let path: PathBuf = path.to_owned();
        let tx = self.result_tx.clone();
        let task = self.runtime.spawn(work);
        self.runtime.spawn(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    log::error!("Project load task failed: {e}");
                    Err(ProjectError::Aborted {
                        path,
                        reason: e.to_string(),
                    })
                }
            };
            let _ = tx.send((id, result));
        });

        id
    }

    /// Drain all completed results available now.
    pub fn poll_results(&self) -> Vec<(LoadRequestId, LoadResult)> {
        let mut results = Vec::new();
        while let Ok(item) = self.result_rx.try_recv() {
            results.push(item);
        }
        results
    }

    /// Waits up to `timeout` for the next completed result.
    ///
    /// Lets a caller show a loading indicator between waits.
    pub fn wait(&self, timeout: Duration) -> Option<(LoadRequestId, LoadResult)> {
        self.result_rx.recv_timeout(timeout).ok()
    }

    /// Blocks until `request` completes or `deadline` passes.
    ///
    /// `tick` runs after every `interval` without a result. Results of
    /// other requests are dropped. Running out of time is reported as
    /// [`ProjectError::Aborted`].
    pub fn wait_for(
        &self,
        request: LoadRequestId,
        path: &Path,
        deadline: Duration,
        interval: Duration,
        mut tick: impl FnMut(),
    ) -> LoadResult {
        let start = Instant::now();
        loop {
            let remaining = deadline.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                log::warn!("Giving up on {} after {deadline:?}", path.display());
                return Err(ProjectError::Aborted {
                    path: path.to_owned(),
                    reason: format!("no result after {deadline:?}"),
                });
            }
            match self.wait(interval.min(remaining)) {
                Some((id, result)) if id == request => return result,
                Some((id, _)) => log::debug!("Dropping stale load result {id:?}"),
                None => tick(),
            }
        }
    }
}
