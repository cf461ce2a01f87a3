//! 宿主实现的原生能力适配到核心库的 `NativeModule`

use async_trait::async_trait;
use std::sync::Arc;

use rcim_sdk::{HistoryQuery, Message, NativeModule, RcimError, Result, SentMessage};

use crate::callbacks::NativeDelegate;
use crate::types;

pub(crate) struct ForeignNative {
    delegate: Arc<dyn NativeDelegate>,
}

impl ForeignNative {
    pub(crate) fn new(delegate: Arc<dyn NativeDelegate>) -> Self {
        Self { delegate }
    }
}

#[async_trait]
impl NativeModule for ForeignNative {
    fn init(&self, app_key: &str) -> Result<()> {
        self.delegate.init(app_key.to_string()).map_err(Into::into)
    }

    fn connect(&self, token: &str, event_id: &str) -> Result<()> {
        self.delegate
            .connect(token.to_string(), event_id.to_string())
            .map_err(Into::into)
    }

    fn send_message(&self, message: &SentMessage, event_id: &str) -> Result<()> {
        self.delegate
            .send_message(message.clone().into(), event_id.to_string())
            .map_err(Into::into)
    }

    async fn get_history_messages(&self, query: &HistoryQuery) -> Result<Vec<Message>> {
        let delegate = self.delegate.clone();
        let query: types::HistoryQuery = query.clone().into();
        let messages = tokio::task::spawn_blocking(move || delegate.get_history_messages(query))
            .await
            .map_err(|e| RcimError::Rejected(format!("history task failed: {}", e)))??;
        Ok(messages.into_iter().map(Into::into).collect())
    }
}
