use std::time::Duration;

use thiserror::Error;

/// 单个下载任务的错误，只影响该任务本身
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP 请求失败，状态码: {0}")]
    Status(u16),

    #[error("下载超时 ({}s)", .0.as_secs())]
    Timeout(Duration),

    #[error("下载任务异常退出: {0}")]
    Panicked(String),

    #[error("信号量错误")]
    SemaphoreError,
}
