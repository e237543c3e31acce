use std::path::PathBuf;

use super::error::DownloadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Manifest, // SHA256SUMS 校验清单，优先提交
    Artifact,
}

/// 一个待下载的文件，提交给下载核心后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub output_path: PathBuf,
    pub name: String,
    pub kind: TaskKind,
}

impl DownloadTask {
    pub fn new(
        url: impl Into<String>,
        output_path: impl Into<PathBuf>,
        name: impl Into<String>,
        kind: TaskKind,
    ) -> Self {
        Self {
            url: url.into(),
            output_path: output_path.into(),
            name: name.into(),
            kind,
        }
    }
}

// --------------------------------------------------------------------

/// 单个任务的结果，每个提交的任务恰好产生一个
#[derive(Debug)]
pub struct DownloadOutcome {
    pub name: String,
    pub output_path: PathBuf,
    pub result: Result<u64, DownloadError>, // 成功时为写入的字节数
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// 全部任务结束后的汇总，outcomes 按完成顺序排列
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub outcomes: Vec<DownloadOutcome>,
}

impl DownloadSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}
