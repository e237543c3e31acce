use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::catalog::{CatalogClient, CatalogError, ReleaseCatalog};
use crate::common::config::FetchConfig;
use crate::common::console::Console;
use crate::downloader::{
    DownloadCore, DownloadError, DownloadSummary, Fetcher, HttpFetcher, plan_downloads,
};
use crate::report;

/// 会让整个运行失败的错误。单个文件下载失败不在此列
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("获取发布信息失败: {0}")]
    Catalog(#[from] CatalogError),

    #[error("准备下载目录失败: {0}")]
    Prepare(#[from] std::io::Error),

    #[error("创建下载客户端失败: {0}")]
    Client(#[from] DownloadError),
}

#[derive(Debug)]
pub struct RunReport {
    pub catalog: ReleaseCatalog,
    pub planned: usize,
    pub skipped: usize,
    pub summary: Option<DownloadSummary>, // 没有需要下载的文件时为 None
}

pub async fn run(config: &FetchConfig, console: Arc<Console>) -> Result<RunReport, PipelineError> {
    let fetcher = Arc::new(HttpFetcher::new()?);
    run_with_fetcher(config, console, fetcher).await
}

/// 获取目录 -> 规划任务 -> 并发下载 -> 输出统计
pub async fn run_with_fetcher(
    config: &FetchConfig,
    console: Arc<Console>,
    fetcher: Arc<dyn Fetcher>,
) -> Result<RunReport, PipelineError> {
    let names: Vec<_> = config.platforms.iter().map(|p| p.as_str()).collect();
    console.step(format!("正在获取 Python 版本信息 ({})...", names.join(", ")));

    let catalog = CatalogClient::new(config.source.clone())?
        .build_catalog()
        .await?;
    report::print_catalog(&console, &catalog, &config.platforms);

    let plan = plan_downloads(
        &catalog,
        &config.platforms,
        &config.source,
        &config.output_dir,
    )?;
    report::print_skipped(&console, &plan.skipped);

    let planned = plan.tasks.len();
    let skipped = plan.skipped.len();
    info!("计划下载 {} 个文件，跳过 {} 个", planned, skipped);

    let summary = if plan.is_empty() {
        console.info("没有需要下载的文件");
        None
    } else {
        let core = DownloadCore::new(fetcher, Arc::clone(&console), config.workers)
            .with_transfer_timeout(config.transfer_timeout);
        console.step(format!(
            "准备下载 {} 个文件 (使用 {} 个并发任务)...",
            planned,
            core.workers()
        ));
        let summary = core.run(plan.tasks).await;
        report::print_summary(&console, &summary);
        Some(summary)
    };

    report::print_platform_counts(&console, &catalog, &config.platforms);

    Ok(RunReport {
        catalog,
        planned,
        skipped,
        summary,
    })
}
