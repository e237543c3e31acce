use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("网络请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("发布信息接口返回错误状态: {0}")]
    Status(u16),

    #[error("发布信息解析失败: {0}")]
    Decode(#[from] serde_json::Error),
}
