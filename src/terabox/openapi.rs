//! 外部付费解析 API 代理模式
//!
//! 不做任何本地解析：输入链接原样转发给外部 API，直链和文件名透传给调用方

use serde::Deserialize;
use tracing::{debug, warn};

use super::resolve::ResolveError;
use super::types::ResolvedLink;
use crate::AppState;

/// 外部 API 响应。字段名在不同服务商之间略有差异，宽松反序列化
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default, alias = "direct_link", alias = "dlink")]
    download_link: String,
    #[serde(default, alias = "filename")]
    file_name: String,
}

/// 调用外部解析 API。失败或响应形状不符时统一返回固定错误，不透出服务商细节
pub async fn resolve_via_api(state: &AppState, link: &str) -> Result<ResolvedLink, ResolveError> {
    let api = &state.config.api;

    debug!("🔁 转发到外部解析 API: {}", api.endpoint);

    let resp = state
        .client
        .get(&api.endpoint)
        .query(&[("url", link)])
        .header("x-api-key", &api.api_key)
        .send()
        .await
        .map_err(|e| {
            warn!("❌ 外部 API 请求失败: {}", e);
            ResolveError::ApiFailed
        })?;

    let status = resp.status();
    let text = resp.text().await.map_err(|e| {
        warn!("❌ 读取外部 API 响应失败: {}", e);
        ResolveError::ApiFailed
    })?;

    if !status.is_success() {
        warn!(
            "❌ 外部 API HTTP {}: {}",
            status,
            &text[..text.len().min(200)]
        );
        return Err(ResolveError::ApiFailed);
    }

    let parsed: ApiResponse = match serde_json::from_str(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(
                "❌ 外部 API 响应无法解析: {} (body={})",
                e,
                &text[..text.len().min(200)]
            );
            return Err(ResolveError::ApiFailed);
        }
    };

    if parsed.status != "success" || parsed.download_link.is_empty() {
        warn!("❌ 外部 API 返回失败状态: {}", parsed.status);
        return Err(ResolveError::ApiFailed);
    }

    Ok(ResolvedLink {
        title: if parsed.file_name.is_empty() {
            "Untitled".to_string()
        } else {
            parsed.file_name
        },
        url: parsed.download_link,
    })
}
