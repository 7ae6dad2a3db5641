use crate::pager::PagerConfig;
use crate::repository::RpcConfig;
use crate::streaming::DEFAULT_BATCH_SIZE;
use anyhow::{bail, Context, Result};
use common::AccountSymbol;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// RPC节点设置
    pub rpc: RpcConfig,
    /// 账户数据源设置
    pub source: SourceConfig,
    /// 分页设置
    pub pager: PagerConfig,
    /// 日志设置
    pub logging: LoggingConfig,
    /// 需要合并历史的账户
    pub accounts: Vec<AccountSymbol>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 单次RPC请求的签名条数
    pub batch_size: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 默认日志级别，`RUST_LOG` 优先
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// 从TOML文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).context("Failed to parse TOML")?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.source.batch_size == 0 {
            bail!("source.batch_size must be greater than 0");
        }
        if self.pager.page_size == 0 {
            bail!("pager.page_size must be greater than 0");
        }
        if self.pager.window_hours <= 0 {
            bail!("pager.window_hours must be positive");
        }
        if self.pager.window().is_none() {
            bail!("pager.window_hours {} is out of range", self.pager.window_hours);
        }
        if self.rpc.url.is_empty() {
            bail!("rpc.url must not be empty");
        }
        if self.accounts.is_empty() {
            bail!("at least one account must be configured");
        }
        if let Some(account) = self.accounts.iter().find(|a| a.account.is_empty()) {
            bail!("account address for symbol {} is empty", account.symbol);
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
