use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::error::DownloadError;
use super::fetcher::Fetcher;
use super::models::{DownloadOutcome, DownloadSummary, DownloadTask};
use crate::common::console::Console;

pub const DEFAULT_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(8) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// 下载中的文件先写到 `<dest>.part`，完成后再改名
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// 清理失败任务留下的文件。清理本身失败只记录日志，不影响任务结果
pub async fn remove_partial(dest: &Path) {
    for path in [partial_path(dest), dest.to_path_buf()] {
        ignore_cleanup_error(tokio::fs::remove_file(&path).await, &path);
    }
}

fn ignore_cleanup_error(result: std::io::Result<()>, path: &Path) {
    match result {
        Ok(()) => debug!("已删除残留文件: {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => debug!("删除残留文件失败 {}: {}", path.display(), e),
    }
}

/// 并发下载核心
///
/// 同一时刻最多 `workers` 个任务在传输，其余任务排队等待。
/// 任务之间互不影响，失败的任务只计数，不会中断整个运行。
#[derive(Clone)]
pub struct DownloadCore {
    fetcher: Arc<dyn Fetcher>,
    console: Arc<Console>,
    workers: NonZeroUsize,
    transfer_timeout: Option<Duration>,
}

impl DownloadCore {
    pub fn new(fetcher: Arc<dyn Fetcher>, console: Arc<Console>, workers: NonZeroUsize) -> Self {
        Self {
            fetcher,
            console,
            workers,
            transfer_timeout: None,
        }
    }

    pub fn with_transfer_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// 按顺序提交全部任务，等待所有任务结束后返回汇总
    pub async fn run(&self, tasks: Vec<DownloadTask>) -> DownloadSummary {
        let total = tasks.len();
        info!("提交 {} 个下载任务，并发数 {}", total, self.workers);

        let semaphore = Arc::new(Semaphore::new(self.workers.get()));
        let bar = progress_bar(total as u64);
        self.console.attach_progress(bar.clone());

        let mut join_set = JoinSet::new();
        // 任务 panic 时只能拿到 task id，用它找回任务信息
        let mut running: HashMap<tokio::task::Id, (String, PathBuf)> = HashMap::new();
        let mut outcomes = Vec::with_capacity(total);

        for task in tasks {
            // 提交前先拿许可，保证提交顺序，也保证同时传输的任务数不超过上限。
            // 信号量只在本函数内使用且从不 close，Err 分支实际不会出现，
            // 仍按失败结果处理以保证每个任务都有结果
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    outcomes.push(DownloadOutcome {
                        name: task.name,
                        output_path: task.output_path,
                        result: Err(DownloadError::SemaphoreError),
                    });
                    continue;
                }
            };

            let info = (task.name.clone(), task.output_path.clone());
            let worker = Worker {
                fetcher: Arc::clone(&self.fetcher),
                console: Arc::clone(&self.console),
                transfer_timeout: self.transfer_timeout,
            };
            let handle = join_set.spawn(async move {
                let _permit = permit;
                worker.execute(task).await
            });
            running.insert(handle.id(), info);
        }

        // 按完成顺序收集结果
        while let Some(joined) = join_set.join_next_with_id().await {
            let outcome = match joined {
                Ok((_, outcome)) => outcome,
                Err(join_error) => {
                    let (name, output_path) = running
                        .remove(&join_error.id())
                        .unwrap_or_else(|| ("<unknown>".to_string(), PathBuf::new()));
                    error!("下载任务异常退出: {}, {}", name, join_error);
                    if !output_path.as_os_str().is_empty() {
                        remove_partial(&output_path).await;
                    }
                    self.console
                        .error(format!("下载失败 {}: {}", name, join_error));
                    DownloadOutcome {
                        name,
                        output_path,
                        result: Err(DownloadError::Panicked(join_error.to_string())),
                    }
                }
            };
            bar.inc(1);
            outcomes.push(outcome);
        }

        bar.finish_and_clear();
        self.console.detach_progress();

        let summary = DownloadSummary { outcomes };
        info!(
            "下载结束，成功 {}，失败 {}",
            summary.succeeded(),
            summary.failed()
        );
        summary
    }
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} 个文件",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

// 单个任务的执行者，在自己的 tokio 任务里运行
struct Worker {
    fetcher: Arc<dyn Fetcher>,
    console: Arc<Console>,
    transfer_timeout: Option<Duration>,
}

impl Worker {
    async fn execute(self, task: DownloadTask) -> DownloadOutcome {
        self.console.waiting(format!("开始下载 {} ...", task.name));

        let result = self.transfer(&task).await;
        match &result {
            Ok(bytes) => {
                debug!("{} 写入 {} 字节", task.name, bytes);
                self.console.success(format!("{} 下载完成", task.name));
            }
            Err(e) => {
                remove_partial(&task.output_path).await;
                error!("❌ 下载任务失败: {}, 错误: {}", task.name, e);
                self.console.error(format!("下载失败 {}: {}", task.name, e));
            }
        }

        DownloadOutcome {
            name: task.name,
            output_path: task.output_path,
            result,
        }
    }

    async fn transfer(&self, task: &DownloadTask) -> Result<u64, DownloadError> {
        let part = partial_path(&task.output_path);
        let fetch = self.fetcher.fetch(&task.url, &part);

        let bytes = match self.transfer_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| DownloadError::Timeout(limit))??,
            None => fetch.await?,
        };

        tokio::fs::rename(&part, &task.output_path).await?;
        Ok(bytes)
    }
}
