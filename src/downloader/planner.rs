use std::path::{Path, PathBuf};

use tracing::debug;

use super::models::{DownloadTask, TaskKind};
use crate::catalog::ReleaseCatalog;
use crate::common::config::ReleaseSource;
use crate::common::models::Platform;

/// 每个平台目录下存放文件的子目录名
pub const PLATFORM_SUBDIR: &str = "Python";

/// 规划结果。tasks 中清单任务排在构建产物之前
#[derive(Debug, Default)]
pub struct DownloadPlan {
    pub tasks: Vec<DownloadTask>,
    pub skipped: Vec<DownloadTask>, // 目标文件已存在
}

impl DownloadPlan {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

pub fn platform_dir(output_dir: &Path, platform: Platform) -> PathBuf {
    output_dir.join(platform.as_str()).join(PLATFORM_SUBDIR)
}

pub fn manifest_filename(version: &str) -> String {
    format!("SHA256SUMS-{}.txt", version)
}

/// 根据目录和选中的平台列出需要下载的文件
///
/// 目标路径已存在的文件视为上次运行已经下载完成，放进 `skipped`，
/// 不会再次下载，也不计入成功或失败。
pub fn plan_downloads(
    catalog: &ReleaseCatalog,
    selected: &[Platform],
    source: &ReleaseSource,
    output_dir: &Path,
) -> std::io::Result<DownloadPlan> {
    let mut manifest_tasks = Vec::new();
    let mut artifact_tasks = Vec::new();
    let mut skipped = Vec::new();

    let mut enqueue = |task: DownloadTask, queue: &mut Vec<DownloadTask>| {
        if task.output_path.exists() {
            debug!("跳过 {} (已存在)", task.name);
            skipped.push(task);
        } else {
            queue.push(task);
        }
    };

    for platform in Platform::ALL.iter().filter(|p| selected.contains(*p)) {
        let Some(versions) = catalog.versions(*platform) else {
            continue;
        };

        for (version, artifacts) in versions {
            let folder = platform_dir(output_dir, *platform);
            std::fs::create_dir_all(&folder)?;

            let manifest_name = manifest_filename(version);
            enqueue(
                DownloadTask::new(
                    source.manifest_url(version),
                    folder.join(&manifest_name),
                    manifest_name,
                    TaskKind::Manifest,
                ),
                &mut manifest_tasks,
            );

            for artifact in artifacts {
                enqueue(
                    DownloadTask::new(
                        artifact.url.clone(),
                        folder.join(&artifact.filename),
                        artifact.filename.clone(),
                        TaskKind::Artifact,
                    ),
                    &mut artifact_tasks,
                );
            }
        }
    }

    manifest_tasks.extend(artifact_tasks);
    Ok(DownloadPlan {
        tasks: manifest_tasks,
        skipped,
    })
}
