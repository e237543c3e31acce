use tracing::warn;

use crate::catalog::ReleaseCatalog;
use crate::common::console::Console;
use crate::common::models::Platform;
use crate::downloader::{DownloadSummary, DownloadTask};

/// 以 JSON 形式输出选中平台的目录
pub fn print_catalog(console: &Console, catalog: &ReleaseCatalog, selected: &[Platform]) {
    match serde_json::to_string_pretty(&catalog.select(selected)) {
        Ok(json) => {
            console.separator();
            console.line(json);
            console.separator();
            console.line("");
        }
        Err(e) => warn!("目录序列化失败: {}", e),
    }
}

pub fn print_skipped(console: &Console, skipped: &[DownloadTask]) {
    for task in skipped {
        console.info(format!("跳过 {} (已存在)", task.name));
    }
}

pub fn print_summary(console: &Console, summary: &DownloadSummary) {
    let message = format!(
        "下载完成! 成功: {}, 失败: {}",
        summary.succeeded(),
        summary.failed()
    );
    console.line("");
    if summary.failed() == 0 {
        console.success(message);
    } else {
        console.warning(message);
    }
}

pub fn print_platform_counts(console: &Console, catalog: &ReleaseCatalog, selected: &[Platform]) {
    console.line("\n统计信息:");
    for platform in Platform::ALL.iter().filter(|p| selected.contains(*p)) {
        console.line(format!(
            "  {}: {} 个文件",
            platform,
            catalog.artifact_count(*platform)
        ));
    }
}
