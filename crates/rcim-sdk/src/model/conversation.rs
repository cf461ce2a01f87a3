//! 会话类型与消息方向
//!
//! 数值与原生 SDK 的线上取值一一对应，属于对外契约，禁止重新编号。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RcimError;

/// 会话类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
#[repr(i32)]
pub enum ConversationType {
    /// 单聊
    Private = 1,
    /// 讨论组
    Discussion = 2,
    /// 群组
    Group = 3,
    /// 聊天室
    Chatroom = 4,
    /// 客服
    CustomerService = 5,
    /// 系统会话
    System = 6,
    /// 应用公众服务
    AppService = 7,
    /// 公众服务
    PublicService = 8,
    /// 推送服务
    PushService = 9,
}

impl ConversationType {
    pub const ALL: [ConversationType; 9] = [
        ConversationType::Private,
        ConversationType::Discussion,
        ConversationType::Group,
        ConversationType::Chatroom,
        ConversationType::CustomerService,
        ConversationType::System,
        ConversationType::AppService,
        ConversationType::PublicService,
        ConversationType::PushService,
    ];

    pub fn value(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for ConversationType {
    type Error = RcimError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        ConversationType::ALL
            .iter()
            .copied()
            .find(|t| t.value() == value)
            .ok_or_else(|| RcimError::InvalidArgument(format!("unknown conversation type: {}", value)))
    }
}

impl From<ConversationType> for i32 {
    fn from(t: ConversationType) -> Self {
        t.value()
    }
}

impl fmt::Display for ConversationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversationType::Private => "PRIVATE",
            ConversationType::Discussion => "DISCUSSION",
            ConversationType::Group => "GROUP",
            ConversationType::Chatroom => "CHATROOM",
            ConversationType::CustomerService => "CUSTOMER_SERVICE",
            ConversationType::System => "SYSTEM",
            ConversationType::AppService => "APP_SERVICE",
            ConversationType::PublicService => "PUBLIC_SERVICE",
            ConversationType::PushService => "PUSH_SERVICE",
        };
        write!(f, "{}", name)
    }
}

/// 消息方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
#[repr(i32)]
pub enum MessageDirection {
    Send = 1,
    Receive = 2,
}

impl TryFrom<i32> for MessageDirection {
    type Error = RcimError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MessageDirection::Send),
            2 => Ok(MessageDirection::Receive),
            other => Err(RcimError::InvalidArgument(format!("unknown message direction: {}", other))),
        }
    }
}

impl From<MessageDirection> for i32 {
    fn from(d: MessageDirection) -> Self {
        d as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_type_wire_values() {
        // 与原生 SDK 对齐的取值表
        let expected = [
            (ConversationType::Private, 1),
            (ConversationType::Discussion, 2),
            (ConversationType::Group, 3),
            (ConversationType::Chatroom, 4),
            (ConversationType::CustomerService, 5),
            (ConversationType::System, 6),
            (ConversationType::AppService, 7),
            (ConversationType::PublicService, 8),
            (ConversationType::PushService, 9),
        ];
        for (t, v) in expected {
            assert_eq!(t.value(), v);
            assert_eq!(ConversationType::try_from(v).unwrap(), t);
        }
    }

    #[test]
    fn test_conversation_type_rejects_unknown() {
        assert!(ConversationType::try_from(0).is_err());
        assert!(ConversationType::try_from(10).is_err());
    }

    #[test]
    fn test_serialized_as_integer() {
        let json = serde_json::to_string(&ConversationType::Group).unwrap();
        assert_eq!(json, "3");
        let parsed: ConversationType = serde_json::from_str("8").unwrap();
        assert_eq!(parsed, ConversationType::PublicService);
        assert!(serde_json::from_str::<ConversationType>("42").is_err());
    }

    #[test]
    fn test_message_direction_values() {
        assert_eq!(i32::from(MessageDirection::Send), 1);
        assert_eq!(i32::from(MessageDirection::Receive), 2);
        assert_eq!(serde_json::to_string(&MessageDirection::Receive).unwrap(), "2");
    }
}
