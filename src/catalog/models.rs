use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::common::models::Platform;

// -----------------------------------------------------------------------------------------------
// GitHub releases/latest 接口返回的数据（只取用到的字段）

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubRelease {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tag_name: String, // 缺失或为 null 时为空串，按没有发布处理
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseAsset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub browser_download_url: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// -----------------------------------------------------------------------------------------------

/// 单个构建产物，以文件名作为标识
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
    pub filename: String,
    pub architecture: String,
    pub url: String,
    pub sha256: Option<String>, // 目前始终为空
}

pub type VersionMap = BTreeMap<String, Vec<ArtifactDescriptor>>;

/// 平台 -> 版本 -> 构建产物列表
///
/// 构建完成后只读。所有平台都一定有对应的键，即使没有任何匹配的产物。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReleaseCatalog {
    platforms: BTreeMap<Platform, VersionMap>,
}

impl Default for ReleaseCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl ReleaseCatalog {
    pub fn empty() -> Self {
        Self {
            platforms: Platform::ALL
                .iter()
                .map(|platform| (*platform, VersionMap::new()))
                .collect(),
        }
    }

    pub fn push(&mut self, platform: Platform, version: &str, artifact: ArtifactDescriptor) {
        self.platforms
            .entry(platform)
            .or_default()
            .entry(version.to_string())
            .or_default()
            .push(artifact);
    }

    pub fn versions(&self, platform: Platform) -> Option<&VersionMap> {
        self.platforms.get(&platform)
    }

    pub fn artifact_count(&self, platform: Platform) -> usize {
        self.versions(platform)
            .map(|versions| versions.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn platforms(&self) -> impl Iterator<Item = (&Platform, &VersionMap)> {
        self.platforms.iter()
    }

    /// 只保留选中的平台（用于输出）
    pub fn select(&self, selected: &[Platform]) -> BTreeMap<Platform, &VersionMap> {
        self.platforms
            .iter()
            .filter(|(platform, _)| selected.contains(*platform))
            .map(|(platform, versions)| (*platform, versions))
            .collect()
    }
}
