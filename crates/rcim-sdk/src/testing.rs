//! 原生模块测试替身
//!
//! 记录所有出站调用，历史消息结果可预先设定；事件回传由测试代码通过
//! `RcimClient::dispatcher()` 手动注入。

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::error::{RcimError, Result};
use crate::model::{ConversationType, Message, MessageContent, MessageDirection, SentMessage, TextMessage};
use crate::native::{HistoryQuery, NativeModule};

/// 一次出站调用的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    Init { app_key: String },
    Connect { token: String, event_id: String },
    SendMessage { message: SentMessage, event_id: String },
    GetHistoryMessages(HistoryQuery),
}

impl NativeCall {
    pub fn event_id(&self) -> Option<&str> {
        match self {
            NativeCall::Connect { event_id, .. } | NativeCall::SendMessage { event_id, .. } => Some(event_id),
            _ => None,
        }
    }
}

/// 原生模块测试替身
#[derive(Default)]
pub struct MockNativeModule {
    calls: Mutex<Vec<NativeCall>>,
    history: Mutex<Vec<Message>>,
    history_delay: Mutex<Option<Duration>>,
    reject_reason: Mutex<Option<String>>,
}

impl MockNativeModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有已记录的调用（按发生顺序）
    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// 最近一次带关联 ID 的调用所用的 eventId
    pub fn last_event_id(&self) -> Option<String> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find_map(|c| c.event_id().map(str::to_string))
    }

    /// 设定 get_history_messages 的返回值
    pub fn set_history(&self, messages: Vec<Message>) {
        *self.history.lock() = messages;
    }

    /// 让 get_history_messages 延迟返回
    pub fn set_history_delay(&self, delay: Option<Duration>) {
        *self.history_delay.lock() = delay;
    }

    /// 之后的提交类调用都返回 `Rejected`
    pub fn reject_calls<S: Into<String>>(&self, reason: Option<S>) {
        *self.reject_reason.lock() = reason.map(Into::into);
    }

    fn record(&self, call: NativeCall) -> Result<()> {
        self.calls.lock().push(call);
        match self.reject_reason.lock().clone() {
            Some(reason) => Err(RcimError::Rejected(reason)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NativeModule for MockNativeModule {
    fn init(&self, app_key: &str) -> Result<()> {
        self.record(NativeCall::Init {
            app_key: app_key.to_string(),
        })
    }

    fn connect(&self, token: &str, event_id: &str) -> Result<()> {
        self.record(NativeCall::Connect {
            token: token.to_string(),
            event_id: event_id.to_string(),
        })
    }

    fn send_message(&self, message: &SentMessage, event_id: &str) -> Result<()> {
        self.record(NativeCall::SendMessage {
            message: message.clone(),
            event_id: event_id.to_string(),
        })
    }

    async fn get_history_messages(&self, query: &HistoryQuery) -> Result<Vec<Message>> {
        self.calls.lock().push(NativeCall::GetHistoryMessages(query.clone()));
        let delay = *self.history_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.history.lock().clone())
    }
}

/// 构造一条单聊文本消息
pub fn text_message(message_id: i64, sender: &str, text: &str) -> Message {
    Message {
        conversation_type: ConversationType::Private,
        message_id,
        message_uid: format!("UID-{}", message_id),
        message_direction: MessageDirection::Receive,
        sender_user_id: sender.to_string(),
        sent_time: 1_700_000_000_000 + message_id,
        target_id: sender.to_string(),
        received_time: 1_700_000_000_100 + message_id,
        content: MessageContent::Text(TextMessage::new(text)),
        extra: None,
    }
}
