//! 连接状态
//!
//! iOS 与 Android 原生层各自定义了一套互不相交的状态码，这里不做语义统一：
//! 状态总是带着平台标签，并且始终保留原始数值。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 原生平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    /// 根据编译目标推断平台，非移动端默认按 Android 状态码解释
    pub fn current() -> Self {
        if cfg!(any(target_os = "ios", target_os = "macos")) {
            Platform::Ios
        } else {
            Platform::Android
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => write!(f, "ios"),
            Platform::Android => write!(f, "android"),
        }
    }
}

/// iOS 连接状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ConnectionStatusIos {
    Unknown = -1,
    Connected = 0,
    NetworkUnavailable = 1,
    AirplaneMode = 2,
    Cellular2G = 3,
    Cellular3G4G = 4,
    Wifi = 5,
    KickedOfflineByOtherClient = 6,
    LoginOnWeb = 7,
    ServerInvalid = 8,
    ValidateInvalid = 9,
    Connecting = 10,
    Unconnected = 11,
    SignUp = 12,
    TokenIncorrect = 31004,
    DisconnException = 31011,
}

impl ConnectionStatusIos {
    pub const ALL: [ConnectionStatusIos; 16] = [
        ConnectionStatusIos::Unknown,
        ConnectionStatusIos::Connected,
        ConnectionStatusIos::NetworkUnavailable,
        ConnectionStatusIos::AirplaneMode,
        ConnectionStatusIos::Cellular2G,
        ConnectionStatusIos::Cellular3G4G,
        ConnectionStatusIos::Wifi,
        ConnectionStatusIos::KickedOfflineByOtherClient,
        ConnectionStatusIos::LoginOnWeb,
        ConnectionStatusIos::ServerInvalid,
        ConnectionStatusIos::ValidateInvalid,
        ConnectionStatusIos::Connecting,
        ConnectionStatusIos::Unconnected,
        ConnectionStatusIos::SignUp,
        ConnectionStatusIos::TokenIncorrect,
        ConnectionStatusIos::DisconnException,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.code() == code)
    }
}

/// Android 连接状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ConnectionStatusAndroid {
    NetworkUnavailable = -1,
    Connected = 0,
    Connecting = 1,
    Disconnected = 2,
    KickedOfflineByOtherClient = 3,
    TokenIncorrect = 4,
    ServerInvalid = 5,
}

impl ConnectionStatusAndroid {
    pub const ALL: [ConnectionStatusAndroid; 7] = [
        ConnectionStatusAndroid::NetworkUnavailable,
        ConnectionStatusAndroid::Connected,
        ConnectionStatusAndroid::Connecting,
        ConnectionStatusAndroid::Disconnected,
        ConnectionStatusAndroid::KickedOfflineByOtherClient,
        ConnectionStatusAndroid::TokenIncorrect,
        ConnectionStatusAndroid::ServerInvalid,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.code() == code)
    }
}

/// 连接状态（带平台标签的原始状态码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    Ios(ConnectionStatusIos),
    Android(ConnectionStatusAndroid),
    /// 当前平台表中没有的状态码，原样保留
    Unrecognized { platform: Platform, code: i32 },
}

impl ConnectionStatus {
    /// 按平台解释原生状态码
    pub fn from_code(platform: Platform, code: i32) -> Self {
        let known = match platform {
            Platform::Ios => ConnectionStatusIos::from_code(code).map(ConnectionStatus::Ios),
            Platform::Android => ConnectionStatusAndroid::from_code(code).map(ConnectionStatus::Android),
        };
        known.unwrap_or(ConnectionStatus::Unrecognized { platform, code })
    }

    /// 原生层上报的原始数值
    pub fn code(&self) -> i32 {
        match self {
            ConnectionStatus::Ios(s) => s.code(),
            ConnectionStatus::Android(s) => s.code(),
            ConnectionStatus::Unrecognized { code, .. } => *code,
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            ConnectionStatus::Ios(_) => Platform::Ios,
            ConnectionStatus::Android(_) => Platform::Android,
            ConnectionStatus::Unrecognized { platform, .. } => *platform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ios_codes_are_stable() {
        let expected = [
            (ConnectionStatusIos::Unknown, -1),
            (ConnectionStatusIos::Connected, 0),
            (ConnectionStatusIos::NetworkUnavailable, 1),
            (ConnectionStatusIos::AirplaneMode, 2),
            (ConnectionStatusIos::Cellular2G, 3),
            (ConnectionStatusIos::Cellular3G4G, 4),
            (ConnectionStatusIos::Wifi, 5),
            (ConnectionStatusIos::KickedOfflineByOtherClient, 6),
            (ConnectionStatusIos::LoginOnWeb, 7),
            (ConnectionStatusIos::ServerInvalid, 8),
            (ConnectionStatusIos::ValidateInvalid, 9),
            (ConnectionStatusIos::Connecting, 10),
            (ConnectionStatusIos::Unconnected, 11),
            (ConnectionStatusIos::SignUp, 12),
            (ConnectionStatusIos::TokenIncorrect, 31004),
            (ConnectionStatusIos::DisconnException, 31011),
        ];
        for (status, code) in expected {
            assert_eq!(status.code(), code);
            assert_eq!(ConnectionStatusIos::from_code(code), Some(status));
        }
    }

    #[test]
    fn test_android_codes_are_stable() {
        let expected = [
            (ConnectionStatusAndroid::NetworkUnavailable, -1),
            (ConnectionStatusAndroid::Connected, 0),
            (ConnectionStatusAndroid::Connecting, 1),
            (ConnectionStatusAndroid::Disconnected, 2),
            (ConnectionStatusAndroid::KickedOfflineByOtherClient, 3),
            (ConnectionStatusAndroid::TokenIncorrect, 4),
            (ConnectionStatusAndroid::ServerInvalid, 5),
        ];
        for (status, code) in expected {
            assert_eq!(status.code(), code);
            assert_eq!(ConnectionStatusAndroid::from_code(code), Some(status));
        }
    }

    #[test]
    fn test_same_code_differs_per_platform() {
        // 码值 1 在两个平台上含义完全不同
        assert_eq!(
            ConnectionStatus::from_code(Platform::Ios, 1),
            ConnectionStatus::Ios(ConnectionStatusIos::NetworkUnavailable)
        );
        assert_eq!(
            ConnectionStatus::from_code(Platform::Android, 1),
            ConnectionStatus::Android(ConnectionStatusAndroid::Connecting)
        );
    }

    #[test]
    fn test_unrecognized_code_is_preserved() {
        let status = ConnectionStatus::from_code(Platform::Android, 31004);
        assert_eq!(
            status,
            ConnectionStatus::Unrecognized { platform: Platform::Android, code: 31004 }
        );
        assert_eq!(status.code(), 31004);
        assert_eq!(status.platform(), Platform::Android);
    }
}
