//! 数据类型

/// 解析成功的结果：展示用文件名 + 可直接下载的直链
#[derive(Debug, Clone)]
pub struct ResolvedLink {
    pub title: String,
    pub url: String,
}
