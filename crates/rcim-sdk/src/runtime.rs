//! Tokio 运行时辅助
//!
//! 原生回调可能来自任意平台线程，没有当前运行时时退回到进程级共享运行时。

use std::sync::OnceLock;
use tokio::runtime::{Handle, Runtime};

/// 进程级共享运行时
pub fn get_runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();

    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .thread_name("rcim-bridge")
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime")
    })
}

/// 当前运行时句柄，不在运行时内时使用共享运行时
pub fn current_handle() -> Handle {
    Handle::try_current().unwrap_or_else(|_| get_runtime().handle().clone())
}
