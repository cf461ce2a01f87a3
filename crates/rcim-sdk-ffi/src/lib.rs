//! RCIM FFI - Foreign Function Interface for the RCIM bridge SDK
//!
//! This crate exposes the bridge facade to Kotlin (Android) and Swift (iOS)
//! through UniFFI.
//!
//! # Architecture
//!
//! - The host implements `NativeDelegate` on top of the native IM client and
//!   hands it to `RcimBridge::new`.
//! - Results of `connect` / `send_message` come back through the
//!   `dispatch_*` methods, carrying the same `event_id` the bridge generated.
//! - Application code registers type-safe callback interfaces; listeners are
//!   released through the returned `SubscriptionHandle`.

#![allow(clippy::new_without_default)]

mod bridge;
mod callbacks;
mod error;
mod native;
mod types;

pub use bridge::{RcimBridge, SubscriptionHandle};
pub use callbacks::{
    ConnectCallback, ConnectionStatusListener, NativeDelegate, ReceiveMessageListener,
    SendMessageCallback,
};
pub use error::{CallFailure, RcimFfiError};
pub use types::{
    conversation_type_value, default_bridge_config, history_query, message_object_names,
    BridgeConfig, ConnectResultKind, ConnectionStatus, ConversationType, HistoryQuery, Message,
    MessageContent, MessageDirection, MessageObjectNames, Platform, SendResultKind, SentMessage,
};

// Setup UniFFI scaffolding for proc-macro mode
uniffi::setup_scaffolding!();

/// Get SDK version string（来自 rcim-sdk version.rs，单一来源）
#[uniffi::export]
pub fn sdk_version() -> String {
    rcim_sdk::version::SDK_VERSION.to_string()
}
