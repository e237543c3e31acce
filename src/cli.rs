use clap::{Parser, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use python_fetch::common::config::{
    DEFAULT_API_BASE, DEFAULT_DOWNLOAD_BASE, DEFAULT_OUTPUT_DIR, DEFAULT_REPO,
    DEFAULT_TRANSFER_TIMEOUT_SECS, FetchConfig, ReleaseSource,
};
use python_fetch::common::models::Platform;
use python_fetch::downloader::DEFAULT_CONCURRENCY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SystemChoice {
    #[value(name = "Linux")]
    Linux,
    #[value(name = "macOS")]
    MacOs,
    #[value(name = "Windows")]
    Windows,
    #[value(name = "all")]
    All,
}

impl SystemChoice {
    pub fn platforms(self) -> Vec<Platform> {
        match self {
            SystemChoice::Linux => vec![Platform::Linux],
            SystemChoice::MacOs => vec![Platform::MacOs],
            SystemChoice::Windows => vec![Platform::Windows],
            SystemChoice::All => Platform::ALL.to_vec(),
        }
    }
}

/// Python 独立构建下载器
#[derive(Parser, Debug)]
#[command(name = "pyfetch")]
#[command(version)]
#[command(about = "下载 python-build-standalone 最新发布的 Python 独立构建", long_about = None)]
pub struct Cli {
    /// 指定下载的系统
    #[arg(long, value_enum, default_value = "all")]
    pub system: SystemChoice,

    /// 并发下载数
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CONCURRENCY)]
    pub workers: NonZeroUsize,

    /// 下载保存目录
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub output_dir: PathBuf,

    /// 单个文件的下载超时（秒），0 表示不限制
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TRANSFER_TIMEOUT_SECS)]
    pub transfer_timeout: u64,

    /// 发布仓库
    #[arg(long, value_name = "OWNER/NAME", default_value = DEFAULT_REPO)]
    pub repo: String,

    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE)]
    #[arg(value_hint = clap::ValueHint::Url)]
    pub api_base: String,

    #[arg(long, value_name = "URL", default_value = DEFAULT_DOWNLOAD_BASE)]
    #[arg(value_hint = clap::ValueHint::Url)]
    pub download_base: String,

    /// GitHub token，用于提高 API 访问频率上限
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// 日志详细程度 (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

impl From<&Cli> for FetchConfig {
    fn from(args: &Cli) -> Self {
        FetchConfig {
            source: ReleaseSource {
                repo: args.repo.clone(),
                api_base: args.api_base.clone(),
                download_base: args.download_base.clone(),
                token: args.github_token.clone().filter(|t| !t.is_empty()),
            },
            platforms: args.system.platforms(),
            workers: args.workers,
            output_dir: args.output_dir.clone(),
            transfer_timeout: (args.transfer_timeout > 0)
                .then(|| Duration::from_secs(args.transfer_timeout)),
        }
    }
}
