//! RCIM SDK - 原生即时通讯客户端的桥接门面
//!
//! 应用层通过本 crate 调用原生 IM 客户端：
//! - 🔗 调用转发：init / connect / sendMessage / getHistoryMessages
//! - 🎯 结果关联：每个待应答调用带唯一 eventId，按 ID 匹配原生事件并触发一次回调
//! - ⏱️ 超时与关闭：待应答调用有期限，关闭时统一结束
//! - 📡 事件系统：收到消息、连接状态变化的类型化监听
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rcim_sdk::{RcimClient, RcimConfig, ConversationType, NativeModule, SentMessage, HistoryQuery};
//!
//! // `native` 由宿主基于原生 IM 客户端实现；原生事件经 `client.dispatcher()` 回传
//! async fn run(native: Arc<dyn NativeModule>) -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RcimClient::new(native, RcimConfig::default());
//!
//!     client.init("app-key")?;
//!
//!     // 监听收到的消息，句柄需要保留
//!     let _subscription = client.add_receive_message_listener(|message| {
//!         println!("收到消息: {:?}", message.content);
//!     });
//!
//!     let user_id = client.connect_async("token").await?;
//!     println!("已连接: {}", user_id);
//!
//!     let sent = client
//!         .send_message_async(SentMessage::text(ConversationType::Private, "bob", "Hello"))
//!         .await?;
//!     println!("已发送: {}", sent.message_id);
//!
//!     let history = client
//!         .get_history_messages(HistoryQuery::new(ConversationType::Private, "bob").count(20))
//!         .await?;
//!     println!("历史消息 {} 条", history.len());
//!
//!     client.shutdown();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod native;
pub mod pending;
pub mod runtime;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod version;

pub use client::{EventDispatcher, RcimClient};
pub use config::{RcimConfig, RcimConfigBuilder};
pub use error::{RcimError, Result};
pub use events::{
    ConnectEvent, ConnectEventKind, EventBus, EventListener, EventName, EventStats, NativeEvent,
    SendMessageEvent, SendMessageEventKind, Subscription,
};
pub use model::*;
pub use native::{HistoryQuery, NativeModule, DEFAULT_HISTORY_COUNT, DEFAULT_OLDEST_MESSAGE_ID};
pub use pending::{ConnectCallbacks, CorrelationIds, SendMessageCallback, UNKNOWN_ERROR_CODE};
pub use version::SDK_VERSION;
