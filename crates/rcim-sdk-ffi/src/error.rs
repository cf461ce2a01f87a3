//! Error types for FFI layer
//!
//! These errors are designed to be simple and cross-language friendly.

use rcim_sdk::RcimError;

/// Main error type for FFI operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum RcimFfiError {
    #[error("Invalid parameter: {msg}")]
    InvalidParameter { msg: String },

    #[error("Native error (code: {code})")]
    Native { code: i32 },

    #[error("Token incorrect or expired")]
    TokenIncorrect,

    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// 宿主拒绝了调用提交
    #[error("Native call rejected: {reason}")]
    Rejected { reason: String },

    #[error("Bridge is shutting down")]
    ShuttingDown,

    #[error("Call was abandoned without a result")]
    Abandoned,

    #[error("Serialization error: {msg}")]
    Serialization { msg: String },

    #[error("Unknown event: {name}")]
    UnknownEvent { name: String },
}

impl RcimFfiError {
    pub fn invalid_parameter(field: &str, msg: &str) -> Self {
        tracing::error!("Invalid parameter {}: {}", field, msg);
        Self::InvalidParameter {
            msg: format!("{}: {}", field, msg),
        }
    }

    pub fn rejected<T: std::fmt::Display>(reason: T) -> Self {
        let reason = reason.to_string();
        tracing::error!("Native call rejected: {}", reason);
        Self::Rejected { reason }
    }
}

/// 保证错误文案非空，避免 Kotlin/iOS 上显示空白
fn ensure_non_empty(s: String, fallback: &'static str) -> String {
    if s.trim().is_empty() {
        fallback.to_string()
    } else {
        s
    }
}

impl From<RcimError> for RcimFfiError {
    fn from(error: RcimError) -> Self {
        tracing::error!("SDK error: {:?}", error);

        match error {
            RcimError::InvalidArgument(msg) => Self::InvalidParameter {
                msg: ensure_non_empty(msg, "invalid argument"),
            },
            RcimError::Native { code } => Self::Native { code },
            RcimError::TokenIncorrect => Self::TokenIncorrect,
            RcimError::Timeout { timeout_ms } => Self::Timeout { timeout_ms },
            RcimError::Rejected(reason) => Self::Rejected {
                reason: ensure_non_empty(reason, "native call rejected"),
            },
            RcimError::ShuttingDown => Self::ShuttingDown,
            RcimError::Abandoned => Self::Abandoned,
            RcimError::Serialization(msg) => Self::Serialization {
                msg: ensure_non_empty(msg, "serialization error"),
            },
            RcimError::UnknownEvent(name) => Self::UnknownEvent { name },
        }
    }
}

/// 宿主实现的原生能力返回的错误，回到核心库
impl From<RcimFfiError> for RcimError {
    fn from(error: RcimFfiError) -> Self {
        match error {
            RcimFfiError::InvalidParameter { msg } => RcimError::InvalidArgument(msg),
            RcimFfiError::Native { code } => RcimError::Native { code },
            RcimFfiError::TokenIncorrect => RcimError::TokenIncorrect,
            RcimFfiError::Timeout { timeout_ms } => RcimError::Timeout { timeout_ms },
            RcimFfiError::Rejected { reason } => RcimError::Rejected(reason),
            RcimFfiError::ShuttingDown => RcimError::ShuttingDown,
            RcimFfiError::Abandoned => RcimError::Abandoned,
            RcimFfiError::Serialization { msg } => RcimError::Serialization(msg),
            RcimFfiError::UnknownEvent { name } => RcimError::UnknownEvent(name),
        }
    }
}

/// 宿主回调抛出未声明的异常时
impl From<uniffi::UnexpectedUniFFICallbackError> for RcimFfiError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::rejected(ensure_non_empty(error.reason, "unexpected callback error"))
    }
}

/// 交给外部回调的失败信息
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct CallFailure {
    /// 原生错误码（桥接层自身的失败没有错误码）
    pub code: Option<i32>,
    pub message: String,
    pub timed_out: bool,
}

impl From<&RcimError> for CallFailure {
    fn from(error: &RcimError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
            timed_out: error.is_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        assert_eq!(
            RcimFfiError::from(RcimError::Native { code: 30002 }),
            RcimFfiError::Native { code: 30002 }
        );
        assert_eq!(
            RcimFfiError::from(RcimError::Rejected(" ".to_string())),
            RcimFfiError::Rejected {
                reason: "native call rejected".to_string()
            }
        );
        assert_eq!(
            RcimError::from(RcimFfiError::Timeout { timeout_ms: 10 }),
            RcimError::Timeout { timeout_ms: 10 }
        );
        assert_eq!(RcimFfiError::from(RcimError::Abandoned), RcimFfiError::Abandoned);
        assert_eq!(RcimError::from(RcimFfiError::Abandoned), RcimError::Abandoned);
    }

    #[test]
    fn test_call_failure() {
        let failure = CallFailure::from(&RcimError::Native { code: 405 });
        assert_eq!(failure.code, Some(405));
        assert!(!failure.timed_out);

        let failure = CallFailure::from(&RcimError::Timeout { timeout_ms: 5000 });
        assert_eq!(failure.code, None);
        assert!(failure.timed_out);
        assert!(failure.message.contains("5000"));
    }
}
