//! 输入链接分类（分享页 / data.* 直链 / 无法识别）

use url::Url;

/// 已知的分享页域名（子域名同样匹配）
const SHARE_HOSTS: &[&str] = &[
    "terabox.com",
    "teraboxapp.com",
    "terabox.app",
    "1024tera.com",
    "4funbox.com",
    "gibibox.com",
    "mirrobox.com",
    "nephobox.com",
    "momerybox.com",
    "tibibox.com",
    "freeterabox.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// 分享页：需要先抓取 HTML 提取直链
    SharePage,
    /// data.* 直链：跳过提取，直接进入镜像探测
    Direct,
    /// 无法识别
    Unknown,
}

pub fn classify(raw: &str) -> LinkKind {
    let Ok(url) = Url::parse(raw.trim()) else {
        return LinkKind::Unknown;
    };
    let Some(host) = url.host_str() else {
        return LinkKind::Unknown;
    };

    if url.scheme() == "https" && host.starts_with("data.") {
        return LinkKind::Direct;
    }

    let is_share_host = SHARE_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{h}")));
    // 分享页有 /s/xxx 与 /sharing/link?surl=xxx 两种形态
    let has_share_path = url.path().contains("/s/")
        || url.query().map_or(false, |q| q.contains("surl="));

    if is_share_host && has_share_path {
        LinkKind::SharePage
    } else {
        LinkKind::Unknown
    }
}
