//! 镜像探测
//!
//! 同一份资源在若干个 data.* 域名下都能访问，原始域名签名失效时
//! 逐个换域名重试。列表顺序即优先级，第一个可用的直接返回。

use anyhow::{anyhow, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use super::resolve::ResolveError;
use super::types::ResolvedLink;

/// 单次镜像探测的结果，三种情况显式区分
#[derive(Debug)]
enum ProbeOutcome {
    /// 该镜像可用
    Winner,
    /// 响应不符合要求（状态码 / JSON 错误负载 / 错误标记）
    Disqualified(String),
    /// 网络层失败，跳过该镜像继续
    Transport(reqwest::Error),
}

/// 仅凭状态码和 Content-Type 的初步判定
#[derive(Debug, PartialEq, Eq)]
enum HeaderVerdict {
    Reject(String),
    /// 二进制内容，不用读响应体
    Accept,
    /// 文本内容，需要扫描响应体里的错误标记
    ScanBody,
}

fn header_verdict(status: StatusCode, content_type: Option<&str>) -> HeaderVerdict {
    if !status.is_success() {
        // 重定向不跟随，和 4xx/5xx 一样视为该镜像不可用
        return HeaderVerdict::Reject(format!("HTTP {}", status));
    }
    match content_type {
        Some(ct) if ct.contains("json") => {
            HeaderVerdict::Reject(format!("JSON 错误负载 ({})", ct))
        }
        Some(ct) if ct.starts_with("text/") => HeaderVerdict::ScanBody,
        None => HeaderVerdict::ScanBody,
        _ => HeaderVerdict::Accept,
    }
}

async fn probe_mirror(client: &Client, candidate: &Url, error_marker: &str) -> ProbeOutcome {
    let resp = match client.get(candidate.as_str()).send().await {
        Ok(resp) => resp,
        Err(e) => return ProbeOutcome::Transport(e),
    };

    let status = resp.status();
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match header_verdict(status, content_type.as_deref()) {
        HeaderVerdict::Reject(reason) => ProbeOutcome::Disqualified(reason),
        HeaderVerdict::Accept => ProbeOutcome::Winner,
        HeaderVerdict::ScanBody => {
            let text = match resp.text().await {
                Ok(text) => text,
                Err(e) => return ProbeOutcome::Transport(e),
            };
            if text.contains(error_marker) {
                ProbeOutcome::Disqualified(format!("响应包含错误标记 \"{}\"", error_marker))
            } else {
                ProbeOutcome::Winner
            }
        }
    }
}

/// 按配置顺序逐个探测镜像，返回第一个可用的候选直链。
/// 单个镜像的网络错误只记日志并继续，全部失败才算整体失败
pub async fn resolve_mirrors(
    client: &Client,
    link: &str,
    mirrors: &[String],
    error_marker: &str,
    filename_hint: Option<&str>,
) -> Result<ResolvedLink, ResolveError> {
    let link_url = Url::parse(link).map_err(|_| ResolveError::InvalidLinkFormat)?;

    for mirror in mirrors {
        let candidate = match candidate_url(&link_url, mirror) {
            Ok(url) => url,
            Err(e) => {
                warn!("⚠️ 镜像 {} 构造候选 URL 失败: {}", mirror, e);
                continue;
            }
        };

        debug!("📡 探测镜像: {}", candidate);

        match probe_mirror(client, &candidate, error_marker).await {
            ProbeOutcome::Winner => {
                info!("✅ 镜像可用: {}", mirror);
                let title = derive_title(filename_hint, &candidate);
                return Ok(ResolvedLink {
                    title,
                    url: candidate.into(),
                });
            }
            ProbeOutcome::Disqualified(reason) => {
                debug!("❌ 镜像 {} 不可用: {}", mirror, reason);
            }
            ProbeOutcome::Transport(e) => {
                warn!("⚠️ 镜像 {} 请求失败: {}", mirror, e);
            }
        }
    }

    Err(ResolveError::AllMirrorsExhausted)
}

/// 用镜像域名替换原链接的 host，保留 scheme / path / query。
/// 镜像项允许带端口（host:port）
fn candidate_url(link: &Url, mirror: &str) -> Result<Url> {
    let mut url = link.clone();
    match mirror.split_once(':') {
        Some((host, port)) => {
            url.set_host(Some(host))?;
            let port: u16 = port.parse()?;
            url.set_port(Some(port))
                .map_err(|_| anyhow!("无法设置端口: {}", mirror))?;
        }
        None => {
            url.set_host(Some(mirror))?;
            url.set_port(None)
                .map_err(|_| anyhow!("无法清除端口: {}", mirror))?;
        }
    }
    Ok(url)
}

/// 展示用标题：优先分享页里提取到的文件名，其次取直链路径最后一段，兜底 "Untitled"
fn derive_title(filename_hint: Option<&str>, url: &Url) -> String {
    if let Some(name) = filename_hint {
        if !name.is_empty() {
            return name.to_string();
        }
    }

    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| segment.to_string())
        })
        .unwrap_or_else(|| "Untitled".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_url_replaces_host() {
        let link = Url::parse("https://data.terabox.com/file/abc?x=1").unwrap();
        let candidate = candidate_url(&link, "data.gibibox.com").unwrap();
        assert_eq!(
            candidate.as_str(),
            "https://data.gibibox.com/file/abc?x=1"
        );
    }

    #[test]
    fn test_candidate_url_with_port() {
        let link = Url::parse("http://data.terabox.com/file/abc?x=1").unwrap();
        let candidate = candidate_url(&link, "127.0.0.1:8081").unwrap();
        assert_eq!(candidate.as_str(), "http://127.0.0.1:8081/file/abc?x=1");
    }

    #[test]
    fn test_candidate_url_drops_old_port() {
        let link = Url::parse("https://data.terabox.com:8443/file/abc").unwrap();
        let candidate = candidate_url(&link, "data.1024tera.com").unwrap();
        assert_eq!(candidate.as_str(), "https://data.1024tera.com/file/abc");
    }

    #[test]
    fn test_header_verdict() {
        // 状态码不成功（包括重定向）一律不可用
        assert!(matches!(
            header_verdict(StatusCode::FOUND, Some("text/html")),
            HeaderVerdict::Reject(_)
        ));
        assert!(matches!(
            header_verdict(StatusCode::FORBIDDEN, None),
            HeaderVerdict::Reject(_)
        ));
        // JSON 响应意味着错误负载而不是文件内容
        assert!(matches!(
            header_verdict(StatusCode::OK, Some("application/json")),
            HeaderVerdict::Reject(_)
        ));
        // 二进制内容直接接受
        assert_eq!(
            header_verdict(StatusCode::OK, Some("video/mp4")),
            HeaderVerdict::Accept
        );
        assert_eq!(
            header_verdict(StatusCode::OK, Some("application/octet-stream")),
            HeaderVerdict::Accept
        );
        // 文本内容需要扫描错误标记
        assert_eq!(
            header_verdict(StatusCode::OK, Some("text/html; charset=utf-8")),
            HeaderVerdict::ScanBody
        );
        assert_eq!(header_verdict(StatusCode::OK, None), HeaderVerdict::ScanBody);
    }

    #[test]
    fn test_derive_title_from_hint() {
        let url = Url::parse("https://data.terabox.com/file/abc").unwrap();
        assert_eq!(derive_title(Some("电影.mkv"), &url), "电影.mkv");
        // 空提示退回路径推导
        assert_eq!(derive_title(Some(""), &url), "abc");
    }

    #[test]
    fn test_derive_title_from_path() {
        let url = Url::parse("https://data.terabox.com/file/my%20video.mp4?x=1").unwrap();
        assert_eq!(derive_title(None, &url), "my video.mp4");
    }

    #[test]
    fn test_derive_title_placeholder() {
        let url = Url::parse("https://data.terabox.com/").unwrap();
        assert_eq!(derive_title(None, &url), "Untitled");
    }
}
