//! 原生模块能力接口
//!
//! 真正的连接、收发、持久化都由平台原生 SDK 完成，这里只定义桥接层
//! 需要调用的出站方法。结果通过 [`crate::client::EventDispatcher`] 以事件形式回传。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ConversationType, Message, SentMessage};

/// 默认起始消息 ID：-1 表示从最新一条开始
pub const DEFAULT_OLDEST_MESSAGE_ID: i64 = -1;
/// 默认每页条数
pub const DEFAULT_HISTORY_COUNT: i32 = 10;

/// 历史消息查询参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub conversation_type: ConversationType,
    pub target_id: String,
    /// 消息对象名过滤，空字符串表示不过滤
    pub object_name: String,
    pub oldest_message_id: i64,
    pub count: i32,
}

impl HistoryQuery {
    pub fn new<S: Into<String>>(conversation_type: ConversationType, target_id: S) -> Self {
        Self {
            conversation_type,
            target_id: target_id.into(),
            object_name: String::new(),
            oldest_message_id: DEFAULT_OLDEST_MESSAGE_ID,
            count: DEFAULT_HISTORY_COUNT,
        }
    }

    pub fn object_name<S: Into<String>>(mut self, object_name: S) -> Self {
        self.object_name = object_name.into();
        self
    }

    pub fn oldest_message_id(mut self, oldest_message_id: i64) -> Self {
        self.oldest_message_id = oldest_message_id;
        self
    }

    pub fn count(mut self, count: i32) -> Self {
        self.count = count;
        self
    }
}

/// 原生模块需要实现的出站调用
///
/// 除历史消息外都是"提交即返回"：返回 `Err` 只表示调用没能提交，
/// 调用的真实结果稍后以事件回传。
#[async_trait]
pub trait NativeModule: Send + Sync {
    /// SDK 初始化
    fn init(&self, app_key: &str) -> Result<()>;

    /// 连接服务器，结果通过 `rcimlib-connect` 事件回传
    fn connect(&self, token: &str, event_id: &str) -> Result<()>;

    /// 发送消息，结果通过 `rcimlib-send-message` 事件回传
    fn send_message(&self, message: &SentMessage, event_id: &str) -> Result<()>;

    /// 获取历史消息
    async fn get_history_messages(&self, query: &HistoryQuery) -> Result<Vec<Message>>;
}
