//! RcimBridge - 暴露给宿主的桥接对象

use std::sync::Arc;
use tracing::{debug, info};

use rcim_sdk::runtime::get_runtime;
use rcim_sdk::{
    ConnectCallbacks, ConnectEvent, EventDispatcher, NativeEvent, RcimClient, SendMessageEvent,
    Subscription,
};

use crate::callbacks::{
    ConnectCallback, ConnectionStatusListener, NativeDelegate, ReceiveMessageListener,
    SendMessageCallback,
};
use crate::error::{CallFailure, RcimFfiError};
use crate::native::ForeignNative;
use crate::types::{
    BridgeConfig, ConnectResultKind, HistoryQuery, Message, SendResultKind, SentMessage,
};

macro_rules! bridge_ffi_log {
    ($name:expr) => {
        debug!("rcim ffi->{}()", $name);
    };
}

/// 监听器句柄
///
/// `remove()` 显式注销；宿主释放该对象时也会注销。
#[derive(uniffi::Object)]
pub struct SubscriptionHandle {
    inner: Subscription,
}

#[uniffi::export]
impl SubscriptionHandle {
    /// 注销监听器，重复调用返回 false
    pub fn remove(&self) -> bool {
        self.inner.remove()
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }
}

/// 桥接对象
#[derive(uniffi::Object)]
pub struct RcimBridge {
    client: RcimClient,
    dispatcher: EventDispatcher,
}

#[uniffi::export]
impl RcimBridge {
    #[uniffi::constructor]
    pub fn new(delegate: Box<dyn NativeDelegate>, config: BridgeConfig) -> Arc<Self> {
        bridge_ffi_log!("new");
        let native = Arc::new(ForeignNative::new(Arc::from(delegate)));
        // 宿主线程上没有运行时，待应答调用的计时任务落在共享运行时上
        let client = RcimClient::new(native, config.into());
        let dispatcher = client.dispatcher();
        info!("RCIM bridge created");
        Arc::new(Self { client, dispatcher })
    }

    pub fn init(&self, app_key: String) -> Result<(), RcimFfiError> {
        bridge_ffi_log!("init");
        self.client.init(&app_key).map_err(Into::into)
    }

    /// 连接服务器，返回本次调用的 eventId
    pub fn connect(&self, token: String, callback: Box<dyn ConnectCallback>) -> String {
        bridge_ffi_log!("connect");
        let callback: Arc<dyn ConnectCallback> = Arc::from(callback);
        let (on_success, on_error, on_token) = (callback.clone(), callback.clone(), callback);
        self.client.connect(
            &token,
            ConnectCallbacks::new()
                .on_success(move |user_id| on_success.on_success(user_id))
                .on_error(move |e| on_error.on_error(CallFailure::from(&e)))
                .on_token_incorrect(move || on_token.on_token_incorrect()),
        )
    }

    /// 发送消息，不关心结果
    pub fn send_message(&self, message: SentMessage) -> String {
        bridge_ffi_log!("send_message");
        self.client.send_message(message.into(), None)
    }

    /// 发送消息并接收一次结果
    pub fn send_message_with_callback(
        &self,
        message: SentMessage,
        callback: Box<dyn SendMessageCallback>,
    ) -> String {
        bridge_ffi_log!("send_message_with_callback");
        let callback: Arc<dyn SendMessageCallback> = Arc::from(callback);
        let on_error = callback.clone();
        self.client.send_message(
            message.into(),
            Some(
                rcim_sdk::SendMessageCallback::new()
                    .success(move |m| callback.on_success(m.into()))
                    .error(move |e| on_error.on_error(CallFailure::from(&e))),
            ),
        )
    }

    #[must_use = "dropping the subscription removes the listener"]
    pub fn add_receive_message_listener(
        &self,
        listener: Box<dyn ReceiveMessageListener>,
    ) -> Arc<SubscriptionHandle> {
        bridge_ffi_log!("add_receive_message_listener");
        let listener: Arc<dyn ReceiveMessageListener> = Arc::from(listener);
        let inner = self
            .client
            .add_receive_message_listener(move |message| listener.on_message(message.clone().into()));
        Arc::new(SubscriptionHandle { inner })
    }

    #[must_use = "dropping the subscription removes the listener"]
    pub fn add_connection_status_listener(
        &self,
        listener: Box<dyn ConnectionStatusListener>,
    ) -> Arc<SubscriptionHandle> {
        bridge_ffi_log!("add_connection_status_listener");
        let listener: Arc<dyn ConnectionStatusListener> = Arc::from(listener);
        let inner = self
            .client
            .add_connection_status_listener(move |status| listener.on_status(status.into()));
        Arc::new(SubscriptionHandle { inner })
    }

    /// 获取历史消息
    ///
    /// Runs inside our static Tokio runtime via block_on, so it must not be
    /// called from a runtime thread.
    pub fn get_history_messages(&self, query: HistoryQuery) -> Result<Vec<Message>, RcimFfiError> {
        bridge_ffi_log!("get_history_messages");
        let messages = get_runtime().block_on(self.client.get_history_messages(query.into()))?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    // ------------------------------------------------------------------
    // 原生事件回传
    // ------------------------------------------------------------------

    pub fn dispatch_connect(
        &self,
        event_id: String,
        kind: ConnectResultKind,
        user_id: Option<String>,
        error_code: Option<i32>,
    ) {
        let mut event = match kind {
            ConnectResultKind::Success => ConnectEvent::success(event_id, user_id.unwrap_or_default()),
            ConnectResultKind::Error => ConnectEvent::error(event_id, 0),
            ConnectResultKind::TokenIncorrect => ConnectEvent::token_incorrect(event_id),
        };
        event.error_code = error_code;
        self.dispatcher.dispatch(NativeEvent::Connect(event));
    }

    pub fn dispatch_send_message(
        &self,
        event_id: String,
        kind: SendResultKind,
        message: Option<Message>,
        error_code: Option<i32>,
    ) {
        let mut event = SendMessageEvent::error(event_id, 0);
        if kind == SendResultKind::Success {
            event.kind = rcim_sdk::SendMessageEventKind::Success;
        }
        event.message = message.map(Into::into);
        event.error_code = error_code;
        self.dispatcher.dispatch(NativeEvent::SendMessage(event));
    }

    pub fn dispatch_receive_message(&self, message: Message) {
        self.dispatcher.dispatch(NativeEvent::ReceiveMessage(message.into()));
    }

    pub fn dispatch_connection_status(&self, code: i32) {
        self.dispatcher.dispatch(NativeEvent::ConnectionStatus(code));
    }

    /// 原生层以 (事件名, JSON 字符串) 回传
    pub fn dispatch_json(&self, name: String, payload: String) -> Result<(), RcimFfiError> {
        let value: serde_json::Value = serde_json::from_str(&payload)
            .map_err(|e| RcimFfiError::invalid_parameter("payload", &e.to_string()))?;
        self.dispatcher.dispatch_json(&name, value).map_err(Into::into)
    }

    pub fn pending_count(&self) -> u64 {
        self.client.pending_count() as u64
    }

    pub fn shutdown(&self) {
        bridge_ffi_log!("shutdown");
        self.client.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConnectionStatus, ConversationType, MessageContent, MessageDirection, Platform};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingDelegate {
        calls: Mutex<Vec<String>>,
        history: Mutex<Vec<Message>>,
    }

    impl NativeDelegate for Arc<RecordingDelegate> {
        fn init(&self, app_key: String) -> Result<(), RcimFfiError> {
            self.calls.lock().push(format!("init:{}", app_key));
            Ok(())
        }

        fn connect(&self, token: String, event_id: String) -> Result<(), RcimFfiError> {
            self.calls.lock().push(format!("connect:{}:{}", token, event_id));
            Ok(())
        }

        fn send_message(&self, message: SentMessage, event_id: String) -> Result<(), RcimFfiError> {
            self.calls.lock().push(format!("send:{}:{}", message.content, event_id));
            if message.content.is_empty() {
                return Err(RcimFfiError::rejected("empty message"));
            }
            Ok(())
        }

        fn get_history_messages(&self, query: HistoryQuery) -> Result<Vec<Message>, RcimFfiError> {
            self.calls.lock().push(format!("history:{}:{}", query.target_id, query.count));
            Ok(self.history.lock().clone())
        }
    }

    #[derive(Default)]
    struct Outcomes(Mutex<Vec<String>>);

    impl ConnectCallback for Arc<Outcomes> {
        fn on_success(&self, user_id: String) {
            self.0.lock().push(format!("success:{}", user_id));
        }
        fn on_error(&self, failure: CallFailure) {
            self.0.lock().push(format!("error:{:?}", failure.code));
        }
        fn on_token_incorrect(&self) {
            self.0.lock().push("token".to_string());
        }
    }

    impl SendMessageCallback for Arc<Outcomes> {
        fn on_success(&self, message: Message) {
            self.0.lock().push(format!("sent:{}", message.message_id));
        }
        fn on_error(&self, failure: CallFailure) {
            self.0.lock().push(format!("failed:{}", failure.message));
        }
    }

    impl ReceiveMessageListener for Arc<Outcomes> {
        fn on_message(&self, message: Message) {
            self.0.lock().push(format!("received:{}", message.message_id));
        }
    }

    impl ConnectionStatusListener for Arc<Outcomes> {
        fn on_status(&self, status: ConnectionStatus) {
            self.0.lock().push(format!("status:{}:{:?}", status.code, status.label));
        }
    }

    fn bridge() -> (Arc<RecordingDelegate>, Arc<RcimBridge>) {
        let delegate = Arc::new(RecordingDelegate::default());
        let config = BridgeConfig {
            platform: Platform::Android,
            connect_timeout_secs: 60,
            send_timeout_secs: 60,
            history_timeout_secs: 5,
            event_buffer_size: 16,
        };
        let bridge = RcimBridge::new(Box::new(delegate.clone()), config);
        (delegate, bridge)
    }

    fn message(id: i64) -> Message {
        Message {
            conversation_type: ConversationType::Private,
            message_id: id,
            message_uid: format!("UID-{}", id),
            message_direction: MessageDirection::Send,
            sender_user_id: "me".to_string(),
            sent_time: 1_700_000_000_000,
            target_id: "bob".to_string(),
            received_time: 0,
            content: MessageContent::Text {
                content: "hi".to_string(),
                extra: None,
            },
            extra: None,
        }
    }

    fn text(content: &str) -> SentMessage {
        SentMessage {
            conversation_type: ConversationType::Private,
            target_id: "bob".to_string(),
            content: content.to_string(),
            extra: None,
            push_content: String::new(),
            push_data: String::new(),
        }
    }

    #[test]
    fn test_connect_round_trip() {
        let (delegate, bridge) = bridge();
        let outcomes = Arc::new(Outcomes::default());

        bridge.init("key".to_string()).unwrap();
        let event_id = bridge.connect("tok".to_string(), Box::new(outcomes.clone()));
        assert_eq!(bridge.pending_count(), 1);

        bridge.dispatch_connect("other".to_string(), ConnectResultKind::Success, Some("x".to_string()), None);
        bridge.dispatch_connect(event_id.clone(), ConnectResultKind::Error, None, Some(30001));
        bridge.dispatch_connect(event_id.clone(), ConnectResultKind::Success, Some("me".to_string()), None);

        assert_eq!(*outcomes.0.lock(), vec!["error:Some(30001)".to_string()]);
        assert_eq!(
            *delegate.calls.lock(),
            vec!["init:key".to_string(), format!("connect:tok:{}", event_id)]
        );
        assert_eq!(bridge.pending_count(), 0);
    }

    #[test]
    fn test_send_with_and_without_callback() {
        let (_delegate, bridge) = bridge();
        let outcomes = Arc::new(Outcomes::default());

        bridge.send_message(text("fire and forget"));
        assert_eq!(bridge.pending_count(), 0);

        let event_id = bridge.send_message_with_callback(text("hello"), Box::new(outcomes.clone()));
        bridge.dispatch_send_message(event_id, SendResultKind::Success, Some(message(5)), None);

        bridge.send_message_with_callback(text(""), Box::new(outcomes.clone()));

        let log = outcomes.0.lock().clone();
        assert_eq!(log[0], "sent:5");
        assert!(log[1].starts_with("failed:"));
        assert!(log[1].contains("empty message"));
        assert_eq!(bridge.pending_count(), 0);
    }

    #[test]
    fn test_listeners_and_handles() {
        let (_delegate, bridge) = bridge();
        let outcomes = Arc::new(Outcomes::default());

        let messages = bridge.add_receive_message_listener(Box::new(outcomes.clone()));
        let status = bridge.add_connection_status_listener(Box::new(outcomes.clone()));

        bridge.dispatch_receive_message(message(1));
        bridge.dispatch_connection_status(3);
        bridge
            .dispatch_json("rcimlib-connection-status".to_string(), "99".to_string())
            .unwrap();

        assert!(messages.remove());
        assert!(!messages.is_active());
        drop(status);
        bridge.dispatch_receive_message(message(2));
        bridge.dispatch_connection_status(0);

        assert_eq!(
            *outcomes.0.lock(),
            vec![
                "received:1".to_string(),
                "status:3:Some(\"KickedOfflineByOtherClient\")".to_string(),
                "status:99:None".to_string(),
            ]
        );
    }

    #[test]
    fn test_history_through_delegate() {
        let (delegate, bridge) = bridge();
        *delegate.history.lock() = vec![message(1), message(2)];

        let mut query = crate::types::history_query(ConversationType::Private, "bob".to_string());
        query.count = 2;
        let history = bridge.get_history_messages(query).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[1].message_id, 2);
        assert!(delegate.calls.lock().contains(&"history:bob:2".to_string()));
    }

    #[test]
    fn test_dispatch_json_errors() {
        let (_delegate, bridge) = bridge();
        assert!(matches!(
            bridge.dispatch_json("rcimlib-connect".to_string(), "not json".to_string()),
            Err(RcimFfiError::InvalidParameter { .. })
        ));
        assert!(matches!(
            bridge.dispatch_json("rcimlib-nope".to_string(), "{}".to_string()),
            Err(RcimFfiError::UnknownEvent { .. })
        ));
    }

    #[test]
    fn test_shutdown_fails_pending() {
        let (_delegate, bridge) = bridge();
        let outcomes = Arc::new(Outcomes::default());
        bridge.connect("tok".to_string(), Box::new(outcomes.clone()));

        bridge.shutdown();
        assert_eq!(*outcomes.0.lock(), vec!["error:None".to_string()]);
        assert_eq!(bridge.init("key".to_string()), Err(RcimFfiError::ShuttingDown));
    }
}
