//! 消息数据结构
//!
//! 字段名与原生层发出的 JSON 完全一致（camelCase，内容以 `type` 区分），
//! 桥接层只负责转发，从不修改消息。

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::conversation::{ConversationType, MessageDirection};
use super::Platform;

/// 文本消息内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

impl TextMessage {
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            extra: None,
        }
    }

    pub fn with_extra<S: Into<String>>(mut self, extra: S) -> Self {
        self.extra = Some(extra.into());
        self
    }
}

/// 图片消息内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMessage {
    /// 本地路径
    pub local: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    /// 缩略图路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// 是否发送原图，保留原生层给出的写法
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_full: Option<FullImageFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

impl ImageMessage {
    pub fn is_full_image(&self) -> bool {
        self.is_full.as_ref().map_or(false, FullImageFlag::is_set)
    }
}

/// isFull 字段
///
/// 原生层一般传字符串，部分版本传布尔值或数字；原样回写。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FullImageFlag {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl FullImageFlag {
    pub fn is_set(&self) -> bool {
        match self {
            FullImageFlag::Bool(b) => *b,
            FullImageFlag::Number(n) => *n != 0,
            FullImageFlag::Text(s) => s.eq_ignore_ascii_case("true") || s == "1",
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            FullImageFlag::Bool(b) => b.to_string(),
            FullImageFlag::Number(n) => n.to_string(),
            FullImageFlag::Text(s) => s.clone(),
        }
    }
}

/// 文件消息内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMessage {
    pub local: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 文件大小（字节）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

/// 消息内容（按 `type` 字段区分的封闭集合）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text(TextMessage),
    Image(ImageMessage),
    File(FileMessage),
}

impl MessageContent {
    /// `type` 判别字段的取值
    pub fn kind(&self) -> &'static str {
        match self {
            MessageContent::Text(_) => "text",
            MessageContent::Image(_) => "image",
            MessageContent::File(_) => "file",
        }
    }

    pub fn extra(&self) -> Option<&str> {
        match self {
            MessageContent::Text(m) => m.extra.as_deref(),
            MessageContent::Image(m) => m.extra.as_deref(),
            MessageContent::File(m) => m.extra.as_deref(),
        }
    }

    /// 对应的原生消息对象名
    pub fn object_name(&self) -> MessageObjectName {
        match self {
            MessageContent::Text(_) => MessageObjectName::Text,
            MessageContent::Image(_) => MessageObjectName::Image,
            MessageContent::File(_) => MessageObjectName::File,
        }
    }
}

/// 一条收发的消息（由原生层产生，只读）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub conversation_type: ConversationType,
    /// 本地消息 ID
    pub message_id: i64,
    /// 服务端分配的消息 UID
    #[serde(rename = "messageUId", default)]
    pub message_uid: String,
    pub message_direction: MessageDirection,
    pub sender_user_id: String,
    /// 发送时间（毫秒）
    pub sent_time: i64,
    /// 目标（会话）ID
    pub target_id: String,
    /// 接收时间（毫秒）
    pub received_time: i64,
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

/// 待发送的消息，由调用方构造，发送时消费一次
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub conversation_type: ConversationType,
    pub target_id: String,
    #[serde(serialize_with = "serialize_text", deserialize_with = "deserialize_text")]
    pub content: TextMessage,
    /// 推送通知显示内容
    #[serde(default)]
    pub push_content: String,
    /// 推送附加数据
    #[serde(default)]
    pub push_data: String,
}

impl SentMessage {
    pub fn text<T: Into<String>, C: Into<String>>(
        conversation_type: ConversationType,
        target_id: T,
        content: C,
    ) -> Self {
        Self {
            conversation_type,
            target_id: target_id.into(),
            content: TextMessage::new(content),
            push_content: String::new(),
            push_data: String::new(),
        }
    }

    pub fn with_push<C: Into<String>, D: Into<String>>(mut self, push_content: C, push_data: D) -> Self {
        self.push_content = push_content.into();
        self.push_data = push_data.into();
        self
    }
}

/// 原生消息对象名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageObjectName {
    Text,
    Image,
    File,
}

impl MessageObjectName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageObjectName::Text => "RC:TxtMsg",
            MessageObjectName::Image => "RC:ImgMsg",
            MessageObjectName::File => "RC:FileMsg",
        }
    }
}

impl std::fmt::Display for MessageObjectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 按平台选择的消息对象名表
///
/// 目前只有 Android 原生层公开了这张表，iOS 上返回 `None`，调用方需要自行分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageObjectNames {
    pub text: MessageObjectName,
    pub image: MessageObjectName,
    pub file: MessageObjectName,
}

impl MessageObjectNames {
    pub fn for_platform(platform: Platform) -> Option<Self> {
        match platform {
            Platform::Android => Some(Self {
                text: MessageObjectName::Text,
                image: MessageObjectName::Image,
                file: MessageObjectName::File,
            }),
            Platform::Ios => None,
        }
    }
}

fn serialize_text<S: Serializer>(text: &TextMessage, serializer: S) -> Result<S::Ok, S::Error> {
    MessageContent::Text(text.clone()).serialize(serializer)
}

fn deserialize_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TextMessage, D::Error> {
    match MessageContent::deserialize(deserializer)? {
        MessageContent::Text(text) => Ok(text),
        other => Err(serde::de::Error::custom(format!(
            "sent message content must be text, got {}",
            other.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_message_json() -> serde_json::Value {
        json!({
            "conversationType": 1,
            "messageId": 42,
            "messageUId": "BKQ3-2I9P-0M64-B3K1",
            "messageDirection": 2,
            "senderUserId": "alice",
            "sentTime": 1_560_000_000_000i64,
            "targetId": "alice",
            "receivedTime": 1_560_000_000_500i64,
            "content": { "type": "text", "content": "hello" },
        })
    }

    #[test]
    fn test_decode_native_message() {
        let message: Message = serde_json::from_value(sample_message_json()).unwrap();
        assert_eq!(message.conversation_type, ConversationType::Private);
        assert_eq!(message.message_id, 42);
        assert_eq!(message.message_uid, "BKQ3-2I9P-0M64-B3K1");
        assert_eq!(message.message_direction, MessageDirection::Receive);
        assert_eq!(message.content, MessageContent::Text(TextMessage::new("hello")));
        assert_eq!(message.extra, None);
    }

    #[test]
    fn test_encode_keeps_native_field_names() {
        let message: Message = serde_json::from_value(sample_message_json()).unwrap();
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["messageUId"], "BKQ3-2I9P-0M64-B3K1");
        assert_eq!(value["senderUserId"], "alice");
        assert_eq!(value["content"]["type"], "text");
        assert!(value.get("extra").is_none());
    }

    #[test]
    fn test_image_content_flag_variants() {
        let as_bool: MessageContent =
            serde_json::from_value(json!({ "type": "image", "local": "/a.jpg", "isFull": true })).unwrap();
        let as_text: MessageContent =
            serde_json::from_value(json!({ "type": "image", "local": "/a.jpg", "isFull": "true" })).unwrap();
        let missing: MessageContent =
            serde_json::from_value(json!({ "type": "image", "local": "/a.jpg" })).unwrap();

        for (content, expected) in [(as_bool, true), (as_text, true), (missing, false)] {
            match content {
                MessageContent::Image(image) => assert_eq!(image.is_full_image(), expected),
                other => panic!("expected image, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_image_flag_keeps_wire_form() {
        for raw in [json!("true"), json!("0"), json!(false), json!(1)] {
            let input = json!({ "type": "image", "local": "/a.jpg", "isFull": raw.clone() });
            let content: MessageContent = serde_json::from_value(input.clone()).unwrap();
            assert_eq!(serde_json::to_value(&content).unwrap(), input);
        }

        let missing: MessageContent =
            serde_json::from_value(json!({ "type": "image", "local": "/a.jpg" })).unwrap();
        assert!(serde_json::to_value(&missing).unwrap().get("isFull").is_none());

        assert!(!FullImageFlag::Text("0".to_string()).is_set());
        assert_eq!(FullImageFlag::Bool(true).as_text(), "true");
    }

    #[test]
    fn test_file_content() {
        let content: MessageContent = serde_json::from_value(json!({
            "type": "file",
            "local": "/tmp/report.pdf",
            "name": "report.pdf",
            "size": 2048,
            "fileType": "pdf",
            "extra": "x",
        }))
        .unwrap();
        assert_eq!(content.kind(), "file");
        assert_eq!(content.extra(), Some("x"));
        assert_eq!(content.object_name().as_str(), "RC:FileMsg");
        match content {
            MessageContent::File(file) => {
                assert_eq!(file.size, Some(2048));
                assert_eq!(file.file_type.as_deref(), Some("pdf"));
            }
            other => panic!("expected file, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_content_type_rejected() {
        let result: Result<MessageContent, _> =
            serde_json::from_value(json!({ "type": "voice", "local": "/a.amr" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_sent_message_wire_shape() {
        let message = SentMessage::text(ConversationType::Group, "group-1", "hi all")
            .with_push("new message", "{\"k\":1}");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["conversationType"], 3);
        assert_eq!(value["targetId"], "group-1");
        assert_eq!(value["content"], json!({ "type": "text", "content": "hi all" }));
        assert_eq!(value["pushContent"], "new message");

        let back: SentMessage = serde_json::from_value(value).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_sent_message_rejects_non_text() {
        let result: Result<SentMessage, _> = serde_json::from_value(json!({
            "conversationType": 1,
            "targetId": "bob",
            "content": { "type": "image", "local": "/a.jpg" },
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_object_names_per_platform() {
        let android = MessageObjectNames::for_platform(Platform::Android).unwrap();
        assert_eq!(android.text.as_str(), "RC:TxtMsg");
        assert_eq!(android.image.as_str(), "RC:ImgMsg");
        assert_eq!(android.file.as_str(), "RC:FileMsg");
        assert!(MessageObjectNames::for_platform(Platform::Ios).is_none());
    }
}
