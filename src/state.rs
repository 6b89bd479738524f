//! 最小应用状态（配置 + HTTP Client）

use anyhow::{anyhow, Result};
use reqwest::{redirect, Client};
use std::time::Duration;

use crate::config::Config;

pub struct AppState {
    pub config: Config,
    /// 分享页抓取用，跟随重定向
    pub client: Client,
    /// 镜像探测用，禁止重定向：重定向即视为该镜像不可用
    pub probe_client: Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        if config.api.enabled {
            if config.api.endpoint.is_empty() {
                return Err(anyhow!(
                    "已开启外部 API 模式但未配置 endpoint，请在 config.toml 的 [api] 中设置"
                ));
            }
            if config.api.api_key.is_empty() {
                return Err(anyhow!(
                    "已开启外部 API 模式但未配置 api_key，请设置 TERABOX_API_KEY 环境变量或 [api] api_key"
                ));
            }
        }

        let timeout = Duration::from_secs(config.terabox.http_timeout_secs);

        let client = Client::builder().timeout(timeout).build()?;
        let probe_client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            config,
            client,
            probe_client,
        })
    }
}
