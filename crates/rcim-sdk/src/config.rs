//! 桥接层配置

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::Platform;

/// RCIM 桥接配置
///
/// 各超时为 0 时表示不设期限，调用一直等到原生层回传结果或关闭。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcimConfig {
    /// 原生平台（决定连接状态码的解释方式）
    pub platform: Platform,
    /// 连接结果等待超时（秒）
    pub connect_timeout_secs: u64,
    /// 发送结果等待超时（秒）
    pub send_timeout_secs: u64,
    /// 历史消息查询超时（秒）
    pub history_timeout_secs: u64,
    /// 事件广播缓冲区大小
    pub event_buffer_size: usize,
}

impl Default for RcimConfig {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            connect_timeout_secs: 60,
            send_timeout_secs: 30,
            history_timeout_secs: 30,
            event_buffer_size: 1000,
        }
    }
}

impl RcimConfig {
    pub fn builder() -> RcimConfigBuilder {
        RcimConfigBuilder::new()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    pub fn history_timeout(&self) -> Duration {
        Duration::from_secs(self.history_timeout_secs)
    }
}

/// 配置构建器
pub struct RcimConfigBuilder {
    config: RcimConfig,
}

impl RcimConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RcimConfig::default(),
        }
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.config.platform = platform;
        self
    }

    pub fn connect_timeout(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    pub fn send_timeout(mut self, secs: u64) -> Self {
        self.config.send_timeout_secs = secs;
        self
    }

    pub fn history_timeout(mut self, secs: u64) -> Self {
        self.config.history_timeout_secs = secs;
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.config.event_buffer_size = size;
        self
    }

    pub fn build(self) -> RcimConfig {
        self.config
    }
}

impl Default for RcimConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = RcimConfig::builder()
            .platform(Platform::Ios)
            .connect_timeout(5)
            .send_timeout(7)
            .history_timeout(9)
            .event_buffer_size(32)
            .build();

        assert_eq!(config.platform, Platform::Ios);
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.send_timeout(), Duration::from_secs(7));
        assert_eq!(config.history_timeout(), Duration::from_secs(9));
        assert_eq!(config.event_buffer_size, 32);
    }

    #[test]
    fn test_zero_timeout_is_no_deadline() {
        let config = RcimConfig::builder().connect_timeout(0).history_timeout(0).build();
        assert!(config.connect_timeout().is_zero());
        assert!(config.history_timeout().is_zero());
        assert_eq!(config.send_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_serde() {
        let config = RcimConfig::builder().platform(Platform::Android).build();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["platform"], "android");
        assert_eq!(json["connect_timeout_secs"], 60);
        let back: RcimConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
