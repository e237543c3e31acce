use std::time::Duration;

use reqwest::{
    Client, ClientBuilder,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::{debug, info, warn};

use super::classify::classify_release;
use super::error::CatalogError;
use super::models::{GithubRelease, ReleaseCatalog};
use crate::common::config::ReleaseSource;

/// 获取发布信息的超时时间
pub const CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

pub const CLIENT_USER_AGENT: &str = concat!("python-fetch/", env!("CARGO_PKG_VERSION"));

// 发布信息接口客户端，一次运行只请求一次
#[derive(Debug, Clone)]
pub struct CatalogClient {
    inner: Client,
    source: ReleaseSource,
}

impl CatalogClient {
    pub fn new(source: ReleaseSource) -> Result<Self, CatalogError> {
        let inner = ClientBuilder::new()
            .timeout(CATALOG_TIMEOUT)
            .default_headers(Self::default_headers(&source))
            .build()?;
        Ok(Self { inner, source })
    }

    fn default_headers(source: &ReleaseSource) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        if let Some(token) = &source.token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("GitHub token 含有非法字符，已忽略"),
            }
        }

        headers
    }

    pub async fn fetch_latest_release(&self) -> Result<GithubRelease, CatalogError> {
        let url = self.source.latest_release_url();
        debug!("请求发布信息: {}", url);

        let resp = self.inner.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!("发布信息接口返回非成功状态码: {}", status);
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = resp.bytes().await?;
        let release: GithubRelease = serde_json::from_slice(&body)?;
        info!(
            "最新版本: {}，共 {} 个资源",
            release.tag_name,
            release.assets.len()
        );
        Ok(release)
    }

    /// 获取最新发布并分类。任何失败都不会返回部分结果
    pub async fn build_catalog(&self) -> Result<ReleaseCatalog, CatalogError> {
        let release = self.fetch_latest_release().await?;
        Ok(classify_release(&release))
    }
}
