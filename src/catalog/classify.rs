use tracing::debug;

use super::models::{ArtifactDescriptor, GithubRelease, ReleaseCatalog};
use crate::common::models::Platform;

/// 只下载解压即用的安装包
pub const ARTIFACT_SUFFIX: &str = "install_only.tar.gz";

struct PlatformRule {
    platform: Platform,
    marker: &'static str,
    // (文件名标记, 架构显示名)，按顺序匹配
    architectures: &'static [(&'static str, &'static str)],
}

const PLATFORM_RULES: &[PlatformRule] = &[
    PlatformRule {
        platform: Platform::Linux,
        marker: "unknown-linux-gnu",
        architectures: &[("x86_64", "x86_64"), ("aarch64", "aarch64")],
    },
    PlatformRule {
        platform: Platform::MacOs,
        marker: "apple-darwin",
        architectures: &[("x86_64", "x86_64"), ("aarch64", "aarch64 (Apple Silicon)")],
    },
    PlatformRule {
        platform: Platform::Windows,
        marker: "pc-windows",
        architectures: &[("x86_64", "x86_64"), ("i686", "i686")],
    },
];

/// 根据文件名判断平台和架构，无法识别时返回 None
pub fn classify_asset(name: &str) -> Option<(Platform, &'static str)> {
    if !name.ends_with(ARTIFACT_SUFFIX) {
        return None;
    }

    let rule = PLATFORM_RULES.iter().find(|rule| name.contains(rule.marker))?;
    rule.architectures
        .iter()
        .find(|(marker, _)| name.contains(marker))
        .map(|(_, label)| (rule.platform, *label))
}

/// 把发布信息整理成按平台、版本分组的目录
pub fn classify_release(release: &GithubRelease) -> ReleaseCatalog {
    let mut catalog = ReleaseCatalog::empty();

    let version = release.tag_name.as_str();
    if version.is_empty() {
        debug!("发布信息中没有 tag_name，返回空目录");
        return catalog;
    }

    for asset in &release.assets {
        match classify_asset(&asset.name) {
            Some((platform, architecture)) => catalog.push(
                platform,
                version,
                ArtifactDescriptor {
                    filename: asset.name.clone(),
                    architecture: architecture.to_string(),
                    url: asset.browser_download_url.clone(),
                    sha256: None,
                },
            ),
            None => debug!("忽略资源: {}", asset.name),
        }
    }

    catalog
}
