//! Callback interfaces
//!
//! 宿主（Kotlin / Swift）实现这些接口：`NativeDelegate` 承载原生 IM 能力，
//! 其余接口接收调用结果和广播事件。

use crate::error::{CallFailure, RcimFfiError};
use crate::types::{ConnectionStatus, HistoryQuery, Message, SentMessage};

/// 原生 IM 能力
///
/// `connect` / `send_message` 只负责提交，结果需要宿主带着同一个 `event_id`
/// 通过 `RcimBridge::dispatch_*` 回传。
#[uniffi::export(callback_interface)]
pub trait NativeDelegate: Send + Sync {
    fn init(&self, app_key: String) -> Result<(), RcimFfiError>;

    fn connect(&self, token: String, event_id: String) -> Result<(), RcimFfiError>;

    fn send_message(&self, message: SentMessage, event_id: String) -> Result<(), RcimFfiError>;

    /// 可以阻塞，桥接层在阻塞线程池上调用
    fn get_history_messages(&self, query: HistoryQuery) -> Result<Vec<Message>, RcimFfiError>;
}

/// connect 结果回调，三者至多触发一个
#[uniffi::export(callback_interface)]
pub trait ConnectCallback: Send + Sync {
    fn on_success(&self, user_id: String);
    fn on_error(&self, failure: CallFailure);
    fn on_token_incorrect(&self);
}

/// 发送结果回调
#[uniffi::export(callback_interface)]
pub trait SendMessageCallback: Send + Sync {
    fn on_success(&self, message: Message);
    fn on_error(&self, failure: CallFailure);
}

#[uniffi::export(callback_interface)]
pub trait ReceiveMessageListener: Send + Sync {
    fn on_message(&self, message: Message);
}

#[uniffi::export(callback_interface)]
pub trait ConnectionStatusListener: Send + Sync {
    fn on_status(&self, status: ConnectionStatus);
}
