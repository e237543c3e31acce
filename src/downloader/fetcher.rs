use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, ClientBuilder, StatusCode};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::error::DownloadError;
use crate::catalog::client::CLIENT_USER_AGENT;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// 把一个 URL 的内容写到本地文件
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// 返回写入的字节数。出错时 dest 上可能残留部分内容，由调用方清理
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}

// 基于 reqwest 的流式下载
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    inner: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, DownloadError> {
        // 整体超时由下载核心按任务控制，这里只限制建立连接
        let inner = ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(CLIENT_USER_AGENT)
            .build()?;
        Ok(Self { inner })
    }

    fn check_response_status(response: &reqwest::Response, url: &str) -> Result<(), DownloadError> {
        let status = response.status();
        debug!("Response Status: {}", status);

        match status {
            status if status.is_success() => Ok(()),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                warn!("🚫 {} 返回 {}，可能触发了访问频率限制", url, status);
                Err(DownloadError::Status(status.as_u16()))
            }
            _ => {
                warn!("❌ 非成功状态码: {}，URL: {}", status, url);
                Err(DownloadError::Status(status.as_u16()))
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let response = self.inner.get(url).send().await?;
        Self::check_response_status(&response, url)?;

        debug!("开始写入: {} -> {}", url, dest.display());
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();

        let mut downloaded = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(downloaded)
    }
}
