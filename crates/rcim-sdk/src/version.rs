//! SDK 版本信息

/// SDK semver，来自 Cargo.toml
///
/// 不手写版本号，用 `env!("CARGO_PKG_VERSION")` 与 Cargo.toml 保持同步。
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 供日志和宿主层展示的版本串
pub fn version_string() -> String {
    format!("rcim-sdk/{}", SDK_VERSION)
}
