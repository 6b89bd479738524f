//! Terabox 链接解析模块

pub mod classify;
pub mod extract;
pub mod mirror;
pub mod openapi;
pub mod resolve;
pub mod types;

// 导出常用函数
pub use classify::{classify, LinkKind};
pub use extract::{extract_direct_link, extract_filename, normalize_link};
pub use mirror::resolve_mirrors;
pub use openapi::resolve_via_api;
pub use resolve::{resolve_link, ResolveError};
pub use types::ResolvedLink;
