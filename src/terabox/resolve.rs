//! 解析入口：分类 → （分享页）提取 → 镜像探测

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info};

use super::classify::{classify, LinkKind};
use super::extract;
use super::mirror;
use super::types::ResolvedLink;
use crate::config::Config;
use crate::AppState;

/// 解析失败的几种情况。
/// 错误文案就是对外 JSON 的 error 字段，保持稳定，调用方会依赖它
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid link format. Must start with https://data.*")]
    InvalidLinkFormat,
    #[error("Could not extract direct link from share page.")]
    ExtractionFailed,
    #[error("All mirrors returned sign error or failed.")]
    AllMirrorsExhausted,
    #[error("Resolver API request failed.")]
    ApiFailed,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ResolveError {
    /// 预期内的失败返回 HTTP 200（ok:false），内部错误返回 500
    pub fn is_internal(&self) -> bool {
        matches!(self, ResolveError::Internal(_))
    }
}

/// 把用户输入的链接解析成可下载的直链
pub async fn resolve_link(state: &AppState, raw: &str) -> Result<ResolvedLink, ResolveError> {
    let input = raw.trim();
    info!("🔍 开始解析: {}", input);

    let (link, filename) = match classify(input) {
        LinkKind::Direct => (input.to_string(), None),
        LinkKind::SharePage => {
            let (link, filename) = extract_from_share_page(state, input).await?;
            // 提取结果仍需满足 data.* 直链形态
            if classify(&link) != LinkKind::Direct {
                return Err(ResolveError::InvalidLinkFormat);
            }
            (link, filename)
        }
        LinkKind::Unknown => return Err(ResolveError::InvalidLinkFormat),
    };

    debug!("🔗 待探测直链: {}", link);

    mirror::resolve_mirrors(
        &state.probe_client,
        &link,
        &state.config.terabox.mirrors,
        &state.config.terabox.error_marker,
        filename.as_deref(),
    )
    .await
}

/// 抓取分享页并提取直链，顺带提取文件名（探测成功后用作标题）
async fn extract_from_share_page(
    state: &AppState,
    share_url: &str,
) -> Result<(String, Option<String>), ResolveError> {
    info!("🌐 抓取分享页: {}", share_url);

    let resp = state
        .client
        .get(share_url)
        .header("User-Agent", Config::browser_ua())
        .send()
        .await
        .context("抓取分享页失败")?;

    let html = resp.text().await.context("读取分享页响应失败")?;
    debug!("📄 页面长度: {} 字节", html.len());

    let link = extract::extract_direct_link(&html).ok_or(ResolveError::ExtractionFailed)?;
    let filename = extract::extract_filename(&html);

    if let Some(name) = &filename {
        debug!("📝 提取到文件名: {}", name);
    }

    Ok((link, filename))
}
