//! 跨边界共享的数据结构：消息、会话类型、连接状态

pub mod connection_status;
pub mod conversation;
pub mod message;

pub use connection_status::{ConnectionStatus, ConnectionStatusAndroid, ConnectionStatusIos, Platform};
pub use conversation::{ConversationType, MessageDirection};
pub use message::{
    FileMessage, FullImageFlag, ImageMessage, Message, MessageContent, MessageObjectName, MessageObjectNames,
    SentMessage, TextMessage,
};
