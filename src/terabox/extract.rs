//! 分享页 HTML 直链提取
//!
//! 站点页面结构经常变动，提取规则按顺序逐条尝试，第一条命中即返回。
//! 新规则追加到列表末尾即可，调用方不感知具体规则。

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// 单条提取规则：name 仅用于日志；捕获组 1（没有则取整体）为候选直链
struct LinkMatcher {
    name: &'static str,
    re: Regex,
}

fn link_matchers() -> &'static [LinkMatcher] {
    static MATCHERS: OnceLock<Vec<LinkMatcher>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        vec![
            // JSON 字段形态，值里带反斜杠转义或整体百分号编码
            LinkMatcher {
                name: "dlink-field",
                re: Regex::new(r#""dlink"\s*:\s*"((?:https:|https%3A)[^"]+)""#).unwrap(),
            },
            LinkMatcher {
                name: "downloadlink-field",
                re: Regex::new(r#""downloadlink"\s*:\s*"((?:https:|https%3A)[^"]+)""#).unwrap(),
            },
            // 页面里裸露的 data.*/file/ 形态
            LinkMatcher {
                name: "data-file-url",
                re: Regex::new(r#"https://data\.[A-Za-z0-9.-]+/file/[^"'\s\\]+"#).unwrap(),
            },
            // 兜底：任意 data.* 链接
            LinkMatcher {
                name: "data-url",
                re: Regex::new(r#"https://data\.[^"'\s\\]+"#).unwrap(),
            },
        ]
    })
}

/// 从分享页 HTML 中提取直链；所有规则都未命中时返回 None
pub fn extract_direct_link(html: &str) -> Option<String> {
    for matcher in link_matchers() {
        let captured = matcher.re.captures(html).map(|caps| {
            caps.get(1)
                .unwrap_or_else(|| caps.get(0).unwrap())
                .as_str()
        });
        if let Some(raw) = captured {
            debug!("🎯 命中提取规则: {}", matcher.name);
            return Some(normalize_link(raw));
        }
    }
    None
}

/// 把捕获到的原始文本还原成可直接请求的 URL。
/// 页面里会出现三种形态：反斜杠转义（\/）、\u002F 转义、整体百分号编码
pub fn normalize_link(raw: &str) -> String {
    let mut link = raw.replace("\\/", "/");
    if link.contains("\\u002F") || link.contains("\\u002f") {
        link = link.replace("\\u002F", "/").replace("\\u002f", "/");
    }
    if link.starts_with("https%3A") || link.starts_with("http%3A") {
        if let Ok(decoded) = urlencoding::decode(&link) {
            link = decoded.into_owned();
        }
    }
    link
}

/// 从分享页 HTML 中提取文件名（探测成功后用作标题）
pub fn extract_filename(html: &str) -> Option<String> {
    static FILENAME_RES: OnceLock<Vec<Regex>> = OnceLock::new();
    let regexes = FILENAME_RES.get_or_init(|| {
        vec![
            Regex::new(r#""server_filename"\s*:\s*"([^"]+)""#).unwrap(),
            Regex::new(r#""filename"\s*:\s*"([^"]+)""#).unwrap(),
        ]
    });

    for re in regexes {
        if let Some(caps) = re.captures(html) {
            let raw = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let name = urlencoding::decode(raw)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            if !name.is_empty() {
                return Some(name);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_dlink_field() {
        let html = r#"<script>var ctx = {"dlink":"https:\/\/data.example\/file\/1","size":42};</script>"#;
        assert_eq!(
            extract_direct_link(html),
            Some("https://data.example/file/1".to_string())
        );
    }

    #[test]
    fn test_extract_downloadlink_field() {
        let html = r#"{"downloadlink":"https://data.terabox.com/file/abc?sign=xyz"}"#;
        assert_eq!(
            extract_direct_link(html),
            Some("https://data.terabox.com/file/abc?sign=xyz".to_string())
        );
    }

    #[test]
    fn test_extract_raw_data_url() {
        let html = r#"<a href="https://data.1024tera.com/file/video.mp4?fid=1">下载</a>"#;
        assert_eq!(
            extract_direct_link(html),
            Some("https://data.1024tera.com/file/video.mp4?fid=1".to_string())
        );
    }

    #[test]
    fn test_extract_prefers_dlink_over_raw() {
        // 两种形态同时出现时按规则顺序取 dlink
        let html = r#"
            <a href="https://data.other.com/file/raw.bin">x</a>
            {"dlink":"https:\/\/data.example\/file\/preferred"}
        "#;
        assert_eq!(
            extract_direct_link(html),
            Some("https://data.example/file/preferred".to_string())
        );
    }

    #[test]
    fn test_extract_no_match() {
        let html = "<html><body>nothing to see here</body></html>";
        assert_eq!(extract_direct_link(html), None);
    }

    #[test]
    fn test_normalize_escaped_slashes() {
        assert_eq!(
            normalize_link(r"https:\/\/data.terabox.com\/file\/abc"),
            "https://data.terabox.com/file/abc"
        );
        assert_eq!(
            normalize_link(r"https://data.terabox.com/file/abc"),
            "https://data.terabox.com/file/abc"
        );
    }

    #[test]
    fn test_normalize_percent_encoded() {
        assert_eq!(
            normalize_link("https%3A%2F%2Fdata.terabox.com%2Ffile%2Fabc%3Fx%3D1"),
            "https://data.terabox.com/file/abc?x=1"
        );
        // 已经是普通 URL 的保持原样
        assert_eq!(
            normalize_link("https://data.terabox.com/file/abc?x=1"),
            "https://data.terabox.com/file/abc?x=1"
        );
    }

    #[test]
    fn test_extract_filename() {
        let html = r#"{"server_filename":"my%20video.mp4","size":1}"#;
        assert_eq!(extract_filename(html), Some("my video.mp4".to_string()));

        let html = r#"{"filename":"movie.mkv"}"#;
        assert_eq!(extract_filename(html), Some("movie.mkv".to_string()));

        assert_eq!(extract_filename("<html></html>"), None);
    }
}
