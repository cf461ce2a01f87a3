//! FFI 数据类型
//!
//! 与核心库的数据结构一一对应，跨边界按值传递（不走 JSON）。

use rcim_sdk::model;
use rcim_sdk::{native as sdk_native, RcimConfig};

// ============================================================================
// Enums
// ============================================================================

/// 会话类型（数值与原生层一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum ConversationType {
    Private,
    Discussion,
    Group,
    Chatroom,
    CustomerService,
    System,
    AppService,
    PublicService,
    PushService,
}

impl From<model::ConversationType> for ConversationType {
    fn from(t: model::ConversationType) -> Self {
        match t {
            model::ConversationType::Private => Self::Private,
            model::ConversationType::Discussion => Self::Discussion,
            model::ConversationType::Group => Self::Group,
            model::ConversationType::Chatroom => Self::Chatroom,
            model::ConversationType::CustomerService => Self::CustomerService,
            model::ConversationType::System => Self::System,
            model::ConversationType::AppService => Self::AppService,
            model::ConversationType::PublicService => Self::PublicService,
            model::ConversationType::PushService => Self::PushService,
        }
    }
}

impl From<ConversationType> for model::ConversationType {
    fn from(t: ConversationType) -> Self {
        match t {
            ConversationType::Private => Self::Private,
            ConversationType::Discussion => Self::Discussion,
            ConversationType::Group => Self::Group,
            ConversationType::Chatroom => Self::Chatroom,
            ConversationType::CustomerService => Self::CustomerService,
            ConversationType::System => Self::System,
            ConversationType::AppService => Self::AppService,
            ConversationType::PublicService => Self::PublicService,
            ConversationType::PushService => Self::PushService,
        }
    }
}

/// 会话类型对应的原生数值
#[uniffi::export]
pub fn conversation_type_value(conversation_type: ConversationType) -> i32 {
    model::ConversationType::from(conversation_type).value()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum MessageDirection {
    Send,
    Receive,
}

impl From<model::MessageDirection> for MessageDirection {
    fn from(d: model::MessageDirection) -> Self {
        match d {
            model::MessageDirection::Send => Self::Send,
            model::MessageDirection::Receive => Self::Receive,
        }
    }
}

impl From<MessageDirection> for model::MessageDirection {
    fn from(d: MessageDirection) -> Self {
        match d {
            MessageDirection::Send => Self::Send,
            MessageDirection::Receive => Self::Receive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum Platform {
    Ios,
    Android,
}

impl From<model::Platform> for Platform {
    fn from(p: model::Platform) -> Self {
        match p {
            model::Platform::Ios => Self::Ios,
            model::Platform::Android => Self::Android,
        }
    }
}

impl From<Platform> for model::Platform {
    fn from(p: Platform) -> Self {
        match p {
            Platform::Ios => Self::Ios,
            Platform::Android => Self::Android,
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// 消息内容
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum MessageContent {
    Text {
        content: String,
        extra: Option<String>,
    },
    Image {
        local: String,
        remote: Option<String>,
        thumbnail: Option<String>,
        /// 原生层传来的 isFull 原文，例如 "true"
        is_full: Option<String>,
        extra: Option<String>,
    },
    File {
        local: String,
        remote: Option<String>,
        name: Option<String>,
        size: Option<i64>,
        file_type: Option<String>,
        extra: Option<String>,
    },
}

impl From<model::MessageContent> for MessageContent {
    fn from(content: model::MessageContent) -> Self {
        match content {
            model::MessageContent::Text(t) => Self::Text {
                content: t.content,
                extra: t.extra,
            },
            model::MessageContent::Image(i) => Self::Image {
                local: i.local,
                remote: i.remote,
                thumbnail: i.thumbnail,
                is_full: i.is_full.as_ref().map(model::FullImageFlag::as_text),
                extra: i.extra,
            },
            model::MessageContent::File(f) => Self::File {
                local: f.local,
                remote: f.remote,
                name: f.name,
                size: f.size,
                file_type: f.file_type,
                extra: f.extra,
            },
        }
    }
}

impl From<MessageContent> for model::MessageContent {
    fn from(content: MessageContent) -> Self {
        match content {
            MessageContent::Text { content, extra } => {
                model::MessageContent::Text(model::TextMessage { content, extra })
            }
            MessageContent::Image {
                local,
                remote,
                thumbnail,
                is_full,
                extra,
            } => model::MessageContent::Image(model::ImageMessage {
                local,
                remote,
                thumbnail,
                is_full: is_full.map(model::FullImageFlag::Text),
                extra,
            }),
            MessageContent::File {
                local,
                remote,
                name,
                size,
                file_type,
                extra,
            } => model::MessageContent::File(model::FileMessage {
                local,
                remote,
                name,
                size,
                file_type,
                extra,
            }),
        }
    }
}

/// 收发的消息
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct Message {
    pub conversation_type: ConversationType,
    pub message_id: i64,
    pub message_uid: String,
    pub message_direction: MessageDirection,
    pub sender_user_id: String,
    pub sent_time: i64,
    pub target_id: String,
    pub received_time: i64,
    pub content: MessageContent,
    pub extra: Option<String>,
}

impl From<model::Message> for Message {
    fn from(m: model::Message) -> Self {
        Self {
            conversation_type: m.conversation_type.into(),
            message_id: m.message_id,
            message_uid: m.message_uid,
            message_direction: m.message_direction.into(),
            sender_user_id: m.sender_user_id,
            sent_time: m.sent_time,
            target_id: m.target_id,
            received_time: m.received_time,
            content: m.content.into(),
            extra: m.extra,
        }
    }
}

impl From<Message> for model::Message {
    fn from(m: Message) -> Self {
        Self {
            conversation_type: m.conversation_type.into(),
            message_id: m.message_id,
            message_uid: m.message_uid,
            message_direction: m.message_direction.into(),
            sender_user_id: m.sender_user_id,
            sent_time: m.sent_time,
            target_id: m.target_id,
            received_time: m.received_time,
            content: m.content.into(),
            extra: m.extra,
        }
    }
}

/// 待发送的文本消息
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct SentMessage {
    pub conversation_type: ConversationType,
    pub target_id: String,
    pub content: String,
    pub extra: Option<String>,
    pub push_content: String,
    pub push_data: String,
}

impl From<model::SentMessage> for SentMessage {
    fn from(m: model::SentMessage) -> Self {
        Self {
            conversation_type: m.conversation_type.into(),
            target_id: m.target_id,
            content: m.content.content,
            extra: m.content.extra,
            push_content: m.push_content,
            push_data: m.push_data,
        }
    }
}

impl From<SentMessage> for model::SentMessage {
    fn from(m: SentMessage) -> Self {
        Self {
            conversation_type: m.conversation_type.into(),
            target_id: m.target_id,
            content: model::TextMessage {
                content: m.content,
                extra: m.extra,
            },
            push_content: m.push_content,
            push_data: m.push_data,
        }
    }
}

/// 消息对象名表
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct MessageObjectNames {
    pub text: String,
    pub image: String,
    pub file: String,
}

/// 当前平台的消息对象名表（iOS 上为空）
#[uniffi::export]
pub fn message_object_names(platform: Platform) -> Option<MessageObjectNames> {
    model::MessageObjectNames::for_platform(platform.into()).map(|names| MessageObjectNames {
        text: names.text.as_str().to_string(),
        image: names.image.as_str().to_string(),
        file: names.file.as_str().to_string(),
    })
}

// ============================================================================
// History / status / config
// ============================================================================

/// 历史消息查询参数
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct HistoryQuery {
    pub conversation_type: ConversationType,
    pub target_id: String,
    pub object_name: String,
    pub oldest_message_id: i64,
    pub count: i32,
}

impl From<sdk_native::HistoryQuery> for HistoryQuery {
    fn from(q: sdk_native::HistoryQuery) -> Self {
        Self {
            conversation_type: q.conversation_type.into(),
            target_id: q.target_id,
            object_name: q.object_name,
            oldest_message_id: q.oldest_message_id,
            count: q.count,
        }
    }
}

impl From<HistoryQuery> for sdk_native::HistoryQuery {
    fn from(q: HistoryQuery) -> Self {
        Self {
            conversation_type: q.conversation_type.into(),
            target_id: q.target_id,
            object_name: q.object_name,
            oldest_message_id: q.oldest_message_id,
            count: q.count,
        }
    }
}

/// 带默认值的历史消息查询（不过滤类型、从最新一条开始、10 条）
#[uniffi::export]
pub fn history_query(conversation_type: ConversationType, target_id: String) -> HistoryQuery {
    sdk_native::HistoryQuery::new(conversation_type.into(), target_id).into()
}

/// 连接状态（平台标签 + 原始状态码）
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ConnectionStatus {
    pub platform: Platform,
    pub code: i32,
    /// 已知状态码的名称，未知时为空
    pub label: Option<String>,
}

impl From<model::ConnectionStatus> for ConnectionStatus {
    fn from(status: model::ConnectionStatus) -> Self {
        let label = match status {
            model::ConnectionStatus::Ios(s) => Some(format!("{:?}", s)),
            model::ConnectionStatus::Android(s) => Some(format!("{:?}", s)),
            model::ConnectionStatus::Unrecognized { .. } => None,
        };
        Self {
            platform: status.platform().into(),
            code: status.code(),
            label,
        }
    }
}

/// 桥接配置
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct BridgeConfig {
    pub platform: Platform,
    pub connect_timeout_secs: u64,
    pub send_timeout_secs: u64,
    pub history_timeout_secs: u64,
    pub event_buffer_size: u32,
}

impl From<RcimConfig> for BridgeConfig {
    fn from(c: RcimConfig) -> Self {
        Self {
            platform: c.platform.into(),
            connect_timeout_secs: c.connect_timeout_secs,
            send_timeout_secs: c.send_timeout_secs,
            history_timeout_secs: c.history_timeout_secs,
            event_buffer_size: u32::try_from(c.event_buffer_size).unwrap_or(u32::MAX),
        }
    }
}

impl From<BridgeConfig> for RcimConfig {
    fn from(c: BridgeConfig) -> Self {
        RcimConfig::builder()
            .platform(c.platform.into())
            .connect_timeout(c.connect_timeout_secs)
            .send_timeout(c.send_timeout_secs)
            .history_timeout(c.history_timeout_secs)
            .event_buffer_size(c.event_buffer_size as usize)
            .build()
    }
}

/// 默认配置（平台按编译目标推断）
#[uniffi::export]
pub fn default_bridge_config() -> BridgeConfig {
    RcimConfig::default().into()
}

/// 原生连接结果类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum ConnectResultKind {
    Success,
    Error,
    TokenIncorrect,
}

/// 原生发送结果类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum SendResultKind {
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_type_values() {
        assert_eq!(conversation_type_value(ConversationType::Private), 1);
        assert_eq!(conversation_type_value(ConversationType::PushService), 9);
    }

    #[test]
    fn test_history_query_defaults() {
        let query = history_query(ConversationType::Group, "g1".to_string());
        assert_eq!(query.object_name, "");
        assert_eq!(query.oldest_message_id, -1);
        assert_eq!(query.count, 10);
    }

    #[test]
    fn test_connection_status_labels() {
        let status = ConnectionStatus::from(model::ConnectionStatus::from_code(model::Platform::Ios, 31004));
        assert_eq!(status.platform, Platform::Ios);
        assert_eq!(status.code, 31004);
        assert_eq!(status.label.as_deref(), Some("TokenIncorrect"));

        let status = ConnectionStatus::from(model::ConnectionStatus::from_code(model::Platform::Android, 42));
        assert_eq!(status.label, None);
        assert_eq!(status.code, 42);
    }

    #[test]
    fn test_object_names() {
        let names = message_object_names(Platform::Android).unwrap();
        assert_eq!(names.text, "RC:TxtMsg");
        assert_eq!(names.file, "RC:FileMsg");
        assert!(message_object_names(Platform::Ios).is_none());
    }

    #[test]
    fn test_image_flag_text_crosses_boundary() {
        let content: model::MessageContent = serde_json::from_value(serde_json::json!({
            "type": "image",
            "local": "/a.jpg",
            "isFull": "true"
        }))
        .unwrap();

        let mirrored = MessageContent::from(content.clone());
        match &mirrored {
            MessageContent::Image { is_full, .. } => assert_eq!(is_full.as_deref(), Some("true")),
            other => panic!("expected image, got {:?}", other),
        }
        assert_eq!(model::MessageContent::from(mirrored), content);
    }

    #[test]
    fn test_bridge_config_round_trip() {
        let config = BridgeConfig {
            platform: Platform::Ios,
            connect_timeout_secs: 5,
            send_timeout_secs: 6,
            history_timeout_secs: 7,
            event_buffer_size: 64,
        };
        let core_config = RcimConfig::from(config.clone());
        assert_eq!(core_config.send_timeout_secs, 6);
        assert_eq!(BridgeConfig::from(core_config), config);
    }
}
