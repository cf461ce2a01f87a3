use std::time::Duration;

/// SDK 错误类型
///
/// 原生层只会上报数字错误码，其余变体是桥接层自身产生的结果
/// （超时、提交失败、关闭中等）。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RcimError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 原生层回报的错误码（不做任何解释，原样透传）
    #[error("Native error (code: {code})")]
    Native { code: i32 },

    #[error("Token incorrect or expired")]
    TokenIncorrect,

    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// 原生层拒绝了调用提交（调用本身未发出）
    #[error("Native call rejected: {0}")]
    Rejected(String),

    #[error("Client is shutting down")]
    ShuttingDown,

    /// 回调在给出结果前被释放
    #[error("Call was abandoned without a result")]
    Abandoned,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}

impl From<serde_json::Error> for RcimError {
    fn from(error: serde_json::Error) -> Self {
        RcimError::Serialization(error.to_string())
    }
}

impl RcimError {
    pub fn timeout(after: Duration) -> Self {
        RcimError::Timeout {
            timeout_ms: after.as_millis() as u64,
        }
    }

    /// 获取原生错误码（如果这是一个原生错误）
    pub fn code(&self) -> Option<i32> {
        match self {
            RcimError::Native { code } => Some(*code),
            _ => None,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, RcimError::Native { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RcimError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, RcimError>;
