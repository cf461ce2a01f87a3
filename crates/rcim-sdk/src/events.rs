//! 事件系统模块 - 原生层 → 桥接层的事件通道
//!
//! 功能包括：
//! - 具名事件通道（连接结果、发送结果、收到消息、连接状态）
//! - 原生 JSON 载荷的解码
//! - 按事件名注册/注销监听器
//! - 全量事件广播订阅
//! - 事件统计

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{RcimError, Result};
use crate::model::Message;

/// 原生事件通道名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    Connect,
    SendMessage,
    ReceiveMessage,
    ConnectionStatus,
}

impl EventName {
    pub const ALL: [EventName; 4] = [
        EventName::Connect,
        EventName::SendMessage,
        EventName::ReceiveMessage,
        EventName::ConnectionStatus,
    ];

    /// 原生层使用的通道名
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Connect => "rcimlib-connect",
            EventName::SendMessage => "rcimlib-send-message",
            EventName::ReceiveMessage => "rcimlib-receive-message",
            EventName::ConnectionStatus => "rcimlib-connection-status",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|n| n.as_str() == name)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 连接结果类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectEventKind {
    Success,
    Error,
    TokenIncorrect,
    #[serde(other)]
    Unknown,
}

/// `rcimlib-connect` 事件载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectEvent {
    pub event_id: String,
    #[serde(rename = "type")]
    pub kind: ConnectEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
}

impl ConnectEvent {
    pub fn success<I: Into<String>, U: Into<String>>(event_id: I, user_id: U) -> Self {
        Self {
            event_id: event_id.into(),
            kind: ConnectEventKind::Success,
            user_id: Some(user_id.into()),
            error_code: None,
        }
    }

    pub fn error<I: Into<String>>(event_id: I, error_code: i32) -> Self {
        Self {
            event_id: event_id.into(),
            kind: ConnectEventKind::Error,
            user_id: None,
            error_code: Some(error_code),
        }
    }

    pub fn token_incorrect<I: Into<String>>(event_id: I) -> Self {
        Self {
            event_id: event_id.into(),
            kind: ConnectEventKind::TokenIncorrect,
            user_id: None,
            error_code: None,
        }
    }
}

/// 发送结果类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SendMessageEventKind {
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

/// `rcimlib-send-message` 事件载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageEvent {
    pub event_id: String,
    #[serde(rename = "type")]
    pub kind: SendMessageEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
    /// 载荷里带了消息但解码失败时的原因
    #[serde(skip)]
    pub message_error: Option<String>,
}

/// 发送结果的外层字段，消息体单独解码
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageReply {
    event_id: String,
    #[serde(rename = "type")]
    kind: SendMessageEventKind,
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    error_code: Option<i32>,
}

impl SendMessageEvent {
    pub fn success<I: Into<String>>(event_id: I, message: Message) -> Self {
        Self {
            event_id: event_id.into(),
            kind: SendMessageEventKind::Success,
            message: Some(message),
            error_code: None,
            message_error: None,
        }
    }

    pub fn error<I: Into<String>>(event_id: I, error_code: i32) -> Self {
        Self {
            event_id: event_id.into(),
            kind: SendMessageEventKind::Error,
            message: None,
            error_code: Some(error_code),
            message_error: None,
        }
    }

    /// 解码原生发送结果
    ///
    /// 只要 eventId 和 type 可读，事件就能关联到调用方；消息体解码失败记在
    /// `message_error` 里，不会让整个事件丢失。
    pub fn from_reply(payload: serde_json::Value) -> Result<Self> {
        let reply: SendMessageReply = serde_json::from_value(payload)?;
        let (message, message_error) = match reply.message {
            None | Some(serde_json::Value::Null) => (None, None),
            Some(raw) => match serde_json::from_value::<Message>(raw) {
                Ok(message) => (Some(message), None),
                Err(e) => {
                    warn!("Send-message reply {} carries an undecodable message: {}", reply.event_id, e);
                    (None, Some(e.to_string()))
                }
            },
        };
        Ok(Self {
            event_id: reply.event_id,
            kind: reply.kind,
            message,
            error_code: reply.error_code,
            message_error,
        })
    }
}

/// 原生层发出的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    Connect(ConnectEvent),
    SendMessage(SendMessageEvent),
    /// 广播，无 eventId
    ReceiveMessage(Message),
    /// 广播，原始平台状态码
    ConnectionStatus(i32),
}

impl NativeEvent {
    pub fn name(&self) -> EventName {
        match self {
            NativeEvent::Connect(_) => EventName::Connect,
            NativeEvent::SendMessage(_) => EventName::SendMessage,
            NativeEvent::ReceiveMessage(_) => EventName::ReceiveMessage,
            NativeEvent::ConnectionStatus(_) => EventName::ConnectionStatus,
        }
    }

    /// 关联 ID（仅请求/应答类事件有）
    pub fn event_id(&self) -> Option<&str> {
        match self {
            NativeEvent::Connect(e) => Some(&e.event_id),
            NativeEvent::SendMessage(e) => Some(&e.event_id),
            _ => None,
        }
    }

    /// 从原生层的 (通道名, JSON 载荷) 解码
    pub fn from_json(name: &str, payload: serde_json::Value) -> Result<Self> {
        let event_name =
            EventName::parse(name).ok_or_else(|| RcimError::UnknownEvent(name.to_string()))?;
        let event = match event_name {
            EventName::Connect => NativeEvent::Connect(serde_json::from_value(payload)?),
            EventName::SendMessage => NativeEvent::SendMessage(SendMessageEvent::from_reply(payload)?),
            EventName::ReceiveMessage => NativeEvent::ReceiveMessage(serde_json::from_value(payload)?),
            EventName::ConnectionStatus => NativeEvent::ConnectionStatus(serde_json::from_value(payload)?),
        };
        Ok(event)
    }
}

/// 事件监听器类型
pub type EventListener = Arc<dyn Fn(&NativeEvent) + Send + Sync>;

/// 事件统计信息
#[derive(Debug, Clone, Default)]
pub struct EventStats {
    /// 总事件数
    pub total_events: u64,
    /// 按通道分组的事件数
    pub events_by_name: HashMap<EventName, u64>,
    /// 监听器数量
    pub listener_count: usize,
    /// 最后事件时间（UTC 毫秒时间戳）
    pub last_event_time: Option<i64>,
}

/// 事件总线：按事件名分发给监听器，同时广播给所有订阅者
pub struct EventBus {
    /// 广播发送器
    sender: broadcast::Sender<NativeEvent>,
    /// 事件名 -> (token, 监听器)
    listeners: RwLock<HashMap<EventName, Vec<(u64, EventListener)>>>,
    next_token: AtomicU64,
    stats: RwLock<EventStats>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));

        Self {
            sender,
            listeners: RwLock::new(HashMap::new()),
            next_token: AtomicU64::new(0),
            stats: RwLock::new(EventStats::default()),
        }
    }

    /// 发布事件
    pub fn emit(&self, event: NativeEvent) {
        let name = event.name();
        debug!("Emitting event: {}", name);

        {
            let mut stats = self.stats.write();
            stats.total_events += 1;
            *stats.events_by_name.entry(name).or_insert(0) += 1;
            stats.last_event_time = Some(chrono::Utc::now().timestamp_millis());
        }

        if let Err(e) = self.sender.send(event.clone()) {
            debug!("Failed to broadcast event (no active receivers): {}", e);
        }

        // 先复制出监听器再调用，允许监听器在回调中注销自己
        let targets: Vec<EventListener> = self
            .listeners
            .read()
            .get(&name)
            .map(|list| list.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default();

        for listener in targets {
            listener(&event);
        }
    }

    /// 订阅全部事件
    pub fn subscribe(&self) -> broadcast::Receiver<NativeEvent> {
        self.sender.subscribe()
    }

    /// 添加事件监听器，返回的订阅句柄负责注销
    pub fn add_listener<F>(self: &Arc<Self>, name: EventName, listener: F) -> Subscription
    where
        F: Fn(&NativeEvent) + Send + Sync + 'static,
    {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed) + 1;
        {
            let mut listeners = self.listeners.write();
            listeners.entry(name).or_default().push((token, Arc::new(listener)));
            self.stats.write().listener_count = listeners.values().map(|v| v.len()).sum();
        }

        info!("Added listener #{} for event: {}", token, name);
        Subscription {
            bus: Arc::downgrade(self),
            name,
            token,
            removed: AtomicBool::new(false),
        }
    }

    /// 按 token 移除监听器
    pub fn remove_listener(&self, name: EventName, token: u64) -> bool {
        // 监听器闭包在锁外释放，闭包里可能还持有其他订阅句柄
        let detached = {
            let mut listeners = self.listeners.write();
            let detached = listeners.get_mut(&name).and_then(|list| {
                let pos = list.iter().position(|(t, _)| *t == token)?;
                Some(list.remove(pos))
            });
            if detached.is_some() {
                self.stats.write().listener_count = listeners.values().map(|v| v.len()).sum();
            }
            detached
        };

        match detached {
            Some(_) => {
                info!("Removed listener #{} for event: {}", token, name);
                true
            }
            None => false,
        }
    }

    /// 移除所有监听器
    pub fn clear_listeners(&self) {
        let detached = std::mem::take(&mut *self.listeners.write());
        self.stats.write().listener_count = 0;
        drop(detached);

        info!("Cleared all event listeners");
    }

    pub fn listener_count(&self, name: EventName) -> usize {
        self.listeners.read().get(&name).map(|v| v.len()).unwrap_or(0)
    }

    /// 获取事件统计
    pub fn get_stats(&self) -> EventStats {
        self.stats.read().clone()
    }

    /// 获取活跃广播订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// 监听器订阅句柄
///
/// 调用方需要持有它；`remove()` 显式注销，丢弃句柄时也会注销。
#[must_use = "dropping the subscription removes the listener"]
pub struct Subscription {
    bus: Weak<EventBus>,
    name: EventName,
    token: u64,
    removed: AtomicBool,
}

impl Subscription {
    pub fn event_name(&self) -> EventName {
        self.name
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn is_active(&self) -> bool {
        !self.removed.load(Ordering::SeqCst)
    }

    /// 注销监听器；重复调用返回 false
    pub fn remove(&self) -> bool {
        if self.removed.swap(true, Ordering::SeqCst) {
            return false;
        }
        match self.bus.upgrade() {
            Some(bus) => bus.remove_listener(self.name, self.token),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.is_active() {
            debug!("Auto-removing listener #{} on drop", self.token);
            self.remove();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("token", &self.token)
            .field("active", &self.is_active())
            .finish()
    }
}
