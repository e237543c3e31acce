use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use super::models::Platform;
use crate::downloader::DEFAULT_CONCURRENCY;

pub const DEFAULT_REPO: &str = "astral-sh/python-build-standalone";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";
pub const DEFAULT_TRANSFER_TIMEOUT_SECS: u64 = 600;

/// 发布信息来源（仓库 + API / 下载地址）
#[derive(Clone, PartialEq, Eq)]
pub struct ReleaseSource {
    pub repo: String,
    pub api_base: String,
    pub download_base: String,
    pub token: Option<String>,
}

impl Default for ReleaseSource {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
            token: None,
        }
    }
}

// token 不出现在日志里
impl fmt::Debug for ReleaseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseSource")
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .field("download_base", &self.download_base)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl ReleaseSource {
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/releases/latest",
            self.api_base.trim_end_matches('/'),
            self.repo
        )
    }

    /// 每个版本对应的 SHA256SUMS 清单地址
    pub fn manifest_url(&self, tag: &str) -> String {
        format!(
            "{}/{}/releases/download/{}/SHA256SUMS",
            self.download_base.trim_end_matches('/'),
            self.repo,
            tag
        )
    }
}

// 一次运行的全部配置
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub source: ReleaseSource,
    pub platforms: Vec<Platform>,
    pub workers: NonZeroUsize,
    pub output_dir: PathBuf,
    pub transfer_timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            source: ReleaseSource::default(),
            platforms: Platform::ALL.to_vec(),
            workers: DEFAULT_CONCURRENCY,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            transfer_timeout: Some(Duration::from_secs(DEFAULT_TRANSFER_TIMEOUT_SECS)),
        }
    }
}
