//! Web 服务器模块

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{terabox, AppState};

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    /// 缺省时返回 400，而不是交给 axum 的默认拒绝
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolveResponse {
    fn success(title: String, url: String) -> Self {
        Self {
            ok: true,
            video_title: Some(title),
            download_url: Some(url),
            error: None,
        }
    }

    fn failure(error: String) -> Self {
        Self {
            ok: false,
            video_title: None,
            download_url: None,
            error: Some(error),
        }
    }
}

/// 解析端点: GET /?url=...
pub async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveParams>,
) -> (StatusCode, Json<ResolveResponse>) {
    let Some(url) = params.url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ResolveResponse::failure("Missing ?url parameter".to_string())),
        );
    };

    info!("📥 收到解析请求: {}", url);

    let result = if state.config.api.enabled {
        terabox::resolve_via_api(&state, &url).await
    } else {
        terabox::resolve_link(&state, &url).await
    };

    match result {
        Ok(link) => {
            info!("✅ 解析成功: {}", link.title);
            (
                StatusCode::OK,
                Json(ResolveResponse::success(link.title, link.url)),
            )
        }
        Err(e) if e.is_internal() => {
            warn!("❌ 内部错误: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ResolveResponse::failure(e.to_string())),
            )
        }
        Err(e) => {
            info!("❌ 解析失败: {}", e);
            // 预期内的失败（无法识别 / 提取失败 / 镜像耗尽）统一 200 + ok:false
            (StatusCode::OK, Json(ResolveResponse::failure(e.to_string())))
        }
    }
}

/// 健康检查
pub async fn health_handler() -> &'static str {
    "OK"
}

/// 创建 Web 路由
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(resolve_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
