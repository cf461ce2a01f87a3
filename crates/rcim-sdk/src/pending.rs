//! 待应答调用表
//!
//! connect / sendMessage 这类调用的结果由原生层以事件回传，事件里带着发起调用时
//! 生成的关联 ID（eventId）。每个待应答调用在表中登记一项：
//! - 收到匹配事件时按 ID 直接查表（O(1)），触发回调后移除
//! - 超过期限仍未收到时以超时结束
//! - 客户端关闭时统一以 `ShuttingDown` 结束

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{RcimError, Result};
use crate::events::{ConnectEvent, ConnectEventKind, SendMessageEvent, SendMessageEventKind};
use crate::model::Message;

/// 原生层未给出错误码时使用的占位值
pub const UNKNOWN_ERROR_CODE: i32 = -1;

/// 关联 ID 生成器：进程内单调递增，保证不重复
pub struct CorrelationIds;

impl CorrelationIds {
    pub fn next() -> String {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NEXT.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

type SuccessFn<T> = Box<dyn FnOnce(T) + Send>;
type ErrorFn = Box<dyn FnOnce(RcimError) + Send>;

enum ConnectHandler {
    Split {
        on_success: Option<SuccessFn<String>>,
        on_error: Option<ErrorFn>,
        on_token_incorrect: Option<Box<dyn FnOnce() + Send>>,
    },
    Unified(Box<dyn FnOnce(Result<String>) + Send>),
}

/// connect 的回调集合，三种结果至多触发一个
pub struct ConnectCallbacks {
    handler: ConnectHandler,
}

impl ConnectCallbacks {
    pub fn new() -> Self {
        Self {
            handler: ConnectHandler::Split {
                on_success: None,
                on_error: None,
                on_token_incorrect: None,
            },
        }
    }

    /// 用一个闭包接收全部结果（token 错误以 `RcimError::TokenIncorrect` 表示）
    pub fn from_result<F>(f: F) -> Self
    where
        F: FnOnce(Result<String>) + Send + 'static,
    {
        Self {
            handler: ConnectHandler::Unified(Box::new(f)),
        }
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(String) + Send + 'static,
    {
        if let ConnectHandler::Split { on_success, .. } = &mut self.handler {
            *on_success = Some(Box::new(f));
        }
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(RcimError) + Send + 'static,
    {
        if let ConnectHandler::Split { on_error, .. } = &mut self.handler {
            *on_error = Some(Box::new(f));
        }
        self
    }

    pub fn on_token_incorrect<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        if let ConnectHandler::Split { on_token_incorrect, .. } = &mut self.handler {
            *on_token_incorrect = Some(Box::new(f));
        }
        self
    }

    pub(crate) fn resolve(self, outcome: Result<String>) {
        match self.handler {
            ConnectHandler::Unified(f) => f(outcome),
            ConnectHandler::Split {
                on_success,
                on_error,
                on_token_incorrect,
            } => match outcome {
                Ok(user_id) => {
                    if let Some(f) = on_success {
                        f(user_id);
                    }
                }
                Err(RcimError::TokenIncorrect) => {
                    if let Some(f) = on_token_incorrect {
                        f();
                    }
                }
                Err(e) => {
                    if let Some(f) = on_error {
                        f(e);
                    }
                }
            },
        }
    }
}

impl Default for ConnectCallbacks {
    fn default() -> Self {
        Self::new()
    }
}

enum SendHandler {
    Split {
        success: Option<SuccessFn<Message>>,
        error: Option<ErrorFn>,
    },
    Unified(Box<dyn FnOnce(Result<Message>) + Send>),
}

/// sendMessage 的回调
pub struct SendMessageCallback {
    handler: SendHandler,
}

impl SendMessageCallback {
    pub fn new() -> Self {
        Self {
            handler: SendHandler::Split {
                success: None,
                error: None,
            },
        }
    }

    pub fn from_result<F>(f: F) -> Self
    where
        F: FnOnce(Result<Message>) + Send + 'static,
    {
        Self {
            handler: SendHandler::Unified(Box::new(f)),
        }
    }

    pub fn success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Message) + Send + 'static,
    {
        if let SendHandler::Split { success, .. } = &mut self.handler {
            *success = Some(Box::new(f));
        }
        self
    }

    pub fn error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(RcimError) + Send + 'static,
    {
        if let SendHandler::Split { error, .. } = &mut self.handler {
            *error = Some(Box::new(f));
        }
        self
    }

    pub(crate) fn resolve(self, outcome: Result<Message>) {
        match self.handler {
            SendHandler::Unified(f) => f(outcome),
            SendHandler::Split { success, error } => match outcome {
                Ok(message) => {
                    if let Some(f) = success {
                        f(message);
                    }
                }
                Err(e) => {
                    if let Some(f) = error {
                        f(e);
                    }
                }
            },
        }
    }
}

impl Default for SendMessageCallback {
    fn default() -> Self {
        Self::new()
    }
}

/// 待应答调用的种类
pub enum PendingCall {
    Connect(ConnectCallbacks),
    SendMessage(SendMessageCallback),
}

impl PendingCall {
    pub fn kind(&self) -> &'static str {
        match self {
            PendingCall::Connect(_) => "connect",
            PendingCall::SendMessage(_) => "send-message",
        }
    }

    fn resolve_err(self, err: RcimError) {
        match self {
            PendingCall::Connect(cb) => cb.resolve(Err(err)),
            PendingCall::SendMessage(cb) => cb.resolve(Err(err)),
        }
    }
}

struct PendingEntry {
    call: PendingCall,
    timer: Option<JoinHandle<()>>,
    registered_at: Instant,
}

impl PendingEntry {
    fn finish(self, err: RcimError) {
        if let Some(timer) = self.timer {
            timer.abort();
        }
        self.call.resolve_err(err);
    }
}

/// 待应答调用表
pub struct PendingRequests {
    entries: Mutex<HashMap<String, PendingEntry>>,
    runtime: Handle,
}

impl PendingRequests {
    pub fn new(runtime: Handle) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            runtime,
        }
    }

    /// 登记一个待应答调用，并启动期限计时
    pub fn register(self: &Arc<Self>, event_id: &str, call: PendingCall, timeout: Duration) {
        let kind = call.kind();
        let replaced = self.entries.lock().insert(
            event_id.to_string(),
            PendingEntry {
                call,
                timer: None,
                registered_at: Instant::now(),
            },
        );
        if let Some(old) = replaced {
            warn!("Pending call {} replaced an existing entry", event_id);
            old.finish(RcimError::ShuttingDown);
        }
        if timeout.is_zero() {
            debug!("Registered pending {} call without deadline: {}", kind, event_id);
            return;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        let id = event_id.to_string();
        let timer = self.runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(table) = weak.upgrade() {
                table.expire(&id, timeout);
            }
        });

        let mut entries = self.entries.lock();
        match entries.get_mut(event_id) {
            Some(entry) => entry.timer = Some(timer),
            None => timer.abort(),
        }
        debug!("Registered pending {} call: {}", kind, event_id);
    }

    /// 处理 connect 结果事件，返回是否命中待应答调用
    pub fn resolve_connect(&self, event: &ConnectEvent) -> bool {
        let entry = {
            let mut entries = self.entries.lock();
            let matched = matches!(
                entries.get(&event.event_id),
                Some(PendingEntry { call: PendingCall::Connect(_), .. })
            );
            if matched {
                entries.remove(&event.event_id)
            } else {
                None
            }
        };
        let Some(entry) = entry else {
            return false;
        };
        if let Some(timer) = &entry.timer {
            timer.abort();
        }

        let PendingCall::Connect(callbacks) = entry.call else {
            return false;
        };
        let outcome = match event.kind {
            ConnectEventKind::Success => Ok(event.user_id.clone().unwrap_or_default()),
            ConnectEventKind::Error => Err(RcimError::Native {
                code: event.error_code.unwrap_or(UNKNOWN_ERROR_CODE),
            }),
            ConnectEventKind::TokenIncorrect => Err(RcimError::TokenIncorrect),
            ConnectEventKind::Unknown => {
                // 匹配但类型未知：移除监听，不触发任何回调
                warn!("Connect reply {} has unknown type, dropping callbacks", event.event_id);
                return true;
            }
        };
        debug!(
            "Connect call {} resolved after {:?}",
            event.event_id,
            entry.registered_at.elapsed()
        );
        callbacks.resolve(outcome);
        true
    }

    /// 处理发送结果事件；只有 success / error 会结束调用
    pub fn resolve_send(&self, event: &SendMessageEvent) -> bool {
        if event.kind == SendMessageEventKind::Unknown {
            debug!("Ignoring send-message reply {} with unknown type", event.event_id);
            return false;
        }

        let entry = {
            let mut entries = self.entries.lock();
            let matched = matches!(
                entries.get(&event.event_id),
                Some(PendingEntry { call: PendingCall::SendMessage(_), .. })
            );
            if matched {
                entries.remove(&event.event_id)
            } else {
                None
            }
        };
        let Some(entry) = entry else {
            return false;
        };
        if let Some(timer) = &entry.timer {
            timer.abort();
        }

        let PendingCall::SendMessage(callback) = entry.call else {
            return false;
        };
        let outcome = match event.kind {
            SendMessageEventKind::Success => match (&event.message, &event.message_error) {
                (Some(message), _) => Ok(message.clone()),
                (None, Some(reason)) => Err(RcimError::Serialization(format!(
                    "send-message reply {} carries an undecodable message: {}",
                    event.event_id, reason
                ))),
                (None, None) => Err(RcimError::Serialization(format!(
                    "send-message reply {} carries no message",
                    event.event_id
                ))),
            },
            _ => Err(RcimError::Native {
                code: event.error_code.unwrap_or(UNKNOWN_ERROR_CODE),
            }),
        };
        callback.resolve(outcome);
        true
    }

    /// 以指定错误结束某个调用
    pub fn cancel(&self, event_id: &str, err: RcimError) -> bool {
        let entry = self.entries.lock().remove(event_id);
        match entry {
            Some(entry) => {
                debug!("Cancelled pending call {}: {}", event_id, err);
                entry.finish(err);
                true
            }
            None => false,
        }
    }

    fn expire(&self, event_id: &str, after: Duration) {
        let entry = self.entries.lock().remove(event_id);
        if let Some(entry) = entry {
            warn!("Pending {} call {} timed out after {:?}", entry.call.kind(), event_id, after);
            // 计时任务就是当前任务，不需要 abort
            entry.call.resolve_err(RcimError::timeout(after));
        }
    }

    /// 结束所有待应答调用
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<PendingEntry> = self.entries.lock().drain().map(|(_, e)| e).collect();
        let count = drained.len();
        for entry in drained {
            entry.finish(RcimError::ShuttingDown);
        }
        if count > 0 {
            info!("Cancelled {} pending calls", count);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.entries.lock().contains_key(event_id)
    }
}

impl fmt::Debug for PendingRequests {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequests").field("len", &self.len()).finish()
    }
}
