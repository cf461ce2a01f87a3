//! 桥接门面
//!
//! 应用层调用 → 转发给原生模块（需要应答的调用附带关联 ID）→ 原生层完成实际工作
//! → 以具名事件回传 → 按关联 ID 匹配并触发调用方回调。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::config::RcimConfig;
use crate::error::{RcimError, Result};
use crate::events::{EventBus, EventName, EventStats, NativeEvent, Subscription};
use crate::model::{ConnectionStatus, Message, SentMessage};
use crate::native::{HistoryQuery, NativeModule};
use crate::pending::{ConnectCallbacks, CorrelationIds, PendingCall, PendingRequests, SendMessageCallback};
use crate::runtime;

/// 所有门面入口打 debug 日志（仅 RUST_LOG=debug 时输出）
macro_rules! sdk_log {
    ($name:expr) => {
        debug!("rcim bridge->{}()", $name);
    };
}

/// 原生层回传事件的入口
///
/// 原生层（或 FFI 宿主）持有它，把每个原生事件交给 `dispatch`。
#[derive(Clone)]
pub struct EventDispatcher {
    bus: Arc<EventBus>,
    pending: Arc<PendingRequests>,
}

impl EventDispatcher {
    /// 分发一个原生事件：先按关联 ID 结束待应答调用，再广播
    pub fn dispatch(&self, event: NativeEvent) {
        match &event {
            NativeEvent::Connect(e) => {
                if !self.pending.resolve_connect(e) {
                    debug!("No pending connect call for event {}", e.event_id);
                }
            }
            NativeEvent::SendMessage(e) => {
                if !self.pending.resolve_send(e) {
                    debug!("No pending send-message call for event {}", e.event_id);
                }
            }
            NativeEvent::ReceiveMessage(_) | NativeEvent::ConnectionStatus(_) => {}
        }
        self.bus.emit(event);
    }

    /// 分发原生层发出的原始 (通道名, JSON) 事件
    pub fn dispatch_json(&self, name: &str, payload: serde_json::Value) -> Result<()> {
        match NativeEvent::from_json(name, payload) {
            Ok(event) => {
                self.dispatch(event);
                Ok(())
            }
            Err(e) => {
                warn!("Dropping undecodable native event {}: {}", name, e);
                Err(e)
            }
        }
    }
}

/// RCIM 桥接客户端
pub struct RcimClient {
    native: Arc<dyn NativeModule>,
    config: RcimConfig,
    bus: Arc<EventBus>,
    pending: Arc<PendingRequests>,
    shutting_down: AtomicBool,
}

impl RcimClient {
    pub fn new(native: Arc<dyn NativeModule>, config: RcimConfig) -> Self {
        info!("Initializing RCIM bridge (platform: {})", config.platform);
        Self {
            native,
            bus: Arc::new(EventBus::new(config.event_buffer_size)),
            pending: Arc::new(PendingRequests::new(runtime::current_handle())),
            config,
            shutting_down: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &RcimConfig {
        &self.config
    }

    /// 交给原生层的事件入口
    pub fn dispatcher(&self) -> EventDispatcher {
        EventDispatcher {
            bus: self.bus.clone(),
            pending: self.pending.clone(),
        }
    }

    /// 初始化 SDK，只需要调用一次；app key 原样转发，不做校验
    pub fn init(&self, app_key: &str) -> Result<()> {
        sdk_log!("init");
        self.ensure_running()?;
        self.native.init(app_key)?;
        info!("RCIM SDK initialized");
        Ok(())
    }

    /// 连接服务器
    ///
    /// 成功、失败、token 错误三种结果至多触发一个回调，且只触发一次；
    /// 超过 `connect_timeout` 未收到结果时以 `RcimError::Timeout` 结束。
    /// 返回本次调用的关联 ID。
    pub fn connect(&self, token: &str, callbacks: ConnectCallbacks) -> String {
        sdk_log!("connect");
        let event_id = CorrelationIds::next();
        if self.ensure_running().is_err() {
            callbacks.resolve(Err(RcimError::ShuttingDown));
            return event_id;
        }

        // 先登记再发起原生调用，原生层可能同步回传结果
        self.pending.register(
            &event_id,
            PendingCall::Connect(callbacks),
            self.config.connect_timeout(),
        );
        if let Err(e) = self.native.connect(token, &event_id) {
            warn!("Native connect rejected: {}", e);
            self.pending.cancel(&event_id, e);
        }
        event_id
    }

    /// 连接服务器，返回用户 ID
    pub async fn connect_async(&self, token: &str) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        self.connect(
            token,
            ConnectCallbacks::from_result(move |result| {
                let _ = tx.send(result);
            }),
        );
        await_outcome(
            rx,
            RcimError::UnknownEvent("connect reply carried an unknown type".to_string()),
        )
        .await
    }

    /// 发送消息
    ///
    /// 没有回调时只提交，不登记任何监听；有回调时在匹配的 success / error 事件到达后
    /// 触发一次，其他类型的匹配事件不会结束调用。返回本次调用的关联 ID。
    pub fn send_message(&self, message: SentMessage, callback: Option<SendMessageCallback>) -> String {
        sdk_log!("send_message");
        let event_id = CorrelationIds::next();
        if self.ensure_running().is_err() {
            if let Some(callback) = callback {
                callback.resolve(Err(RcimError::ShuttingDown));
            }
            return event_id;
        }

        let tracked = callback.is_some();
        if let Some(callback) = callback {
            self.pending.register(
                &event_id,
                PendingCall::SendMessage(callback),
                self.config.send_timeout(),
            );
        }
        if let Err(e) = self.native.send_message(&message, &event_id) {
            warn!("Native send_message rejected: {}", e);
            if tracked {
                self.pending.cancel(&event_id, e);
            }
        }
        event_id
    }

    /// 发送消息并等待结果
    pub async fn send_message_async(&self, message: SentMessage) -> Result<Message> {
        let (tx, rx) = oneshot::channel();
        self.send_message(
            message,
            Some(SendMessageCallback::from_result(move |result| {
                let _ = tx.send(result);
            })),
        );
        await_outcome(rx, RcimError::Abandoned).await
    }

    /// 添加收到消息的监听，每条广播消息按到达顺序触发一次
    ///
    /// 返回的句柄需要由调用方持有，`remove()` 或丢弃后停止接收。
    #[must_use = "dropping the subscription removes the listener"]
    pub fn add_receive_message_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        sdk_log!("add_receive_message_listener");
        self.bus.add_listener(EventName::ReceiveMessage, move |event| {
            if let NativeEvent::ReceiveMessage(message) = event {
                listener(message);
            }
        })
    }

    /// 添加连接状态监听
    ///
    /// 状态码不做跨平台统一，按配置的平台解释并保留原始数值。
    #[must_use = "dropping the subscription removes the listener"]
    pub fn add_connection_status_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        sdk_log!("add_connection_status_listener");
        let platform = self.config.platform;
        self.bus.add_listener(EventName::ConnectionStatus, move |event| {
            if let NativeEvent::ConnectionStatus(code) = event {
                listener(ConnectionStatus::from_code(platform, *code));
            }
        })
    }

    /// 获取历史消息，参数原样转发给原生层
    pub async fn get_history_messages(&self, query: HistoryQuery) -> Result<Vec<Message>> {
        sdk_log!("get_history_messages");
        self.ensure_running()?;
        let timeout = self.config.history_timeout();
        if timeout.is_zero() {
            return self.native.get_history_messages(&query).await;
        }
        match tokio::time::timeout(timeout, self.native.get_history_messages(&query)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "get_history_messages({}, {}) timed out after {:?}",
                    query.conversation_type, query.target_id, timeout
                );
                Err(RcimError::timeout(timeout))
            }
        }
    }

    /// 订阅全部原生事件
    pub fn subscribe_events(&self) -> broadcast::Receiver<NativeEvent> {
        self.bus.subscribe()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn event_stats(&self) -> EventStats {
        self.bus.get_stats()
    }

    /// 关闭：结束所有待应答调用并移除全部监听
    pub fn shutdown(&self) {
        sdk_log!("shutdown");
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let cancelled = self.pending.cancel_all();
        self.bus.clear_listeners();
        info!("RCIM bridge shut down ({} pending calls cancelled)", cancelled);
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shutting_down.load(Ordering::SeqCst) {
            Err(RcimError::ShuttingDown)
        } else {
            Ok(())
        }
    }
}

/// 等待回调结果；回调未触发就被释放时返回 `dropped`
async fn await_outcome<T>(rx: oneshot::Receiver<Result<T>>, dropped: RcimError) -> Result<T> {
    rx.await.map_err(|_| dropped)?
}

impl Drop for RcimClient {
    fn drop(&mut self) {
        self.pending.cancel_all();
    }
}
