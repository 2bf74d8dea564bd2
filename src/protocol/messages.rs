//! 클라이언트-서버 메시지 프로토콜 정의

use crate::room::RoomState;
use serde::{Deserialize, Serialize};

/// 전송 계층이 부여하는 연결 식별자
pub type ConnectionId = String;

/// 클라이언트 → 서버 메시지
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ClientMessage {
    // Connection
    Heartbeat,

    // Room Management
    #[serde(rename_all = "camelCase")]
    Join { room_id: String, username: String },
    #[serde(rename_all = "camelCase")]
    Leave { room_id: String },

    // Editing
    #[serde(rename_all = "camelCase")]
    CodeChange {
        room_id: String,
        file_id: String,
        code: String,
    },
    #[serde(rename_all = "camelCase")]
    FileSwitch { room_id: String, file_id: String },

    // Chat
    #[serde(rename_all = "camelCase")]
    SendMessage { room_id: String, message: String },
}

/// 서버 → 클라이언트 메시지
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerMessage {
    // Connection
    #[serde(rename_all = "camelCase")]
    Connected { connection_id: ConnectionId },
    HeartbeatAck,
    Error { code: String, message: String },

    // Room Events
    #[serde(rename_all = "camelCase")]
    Joined {
        clients: Vec<ClientInfo>,
        username: String,
        connection_id: ConnectionId,
    },
    SyncFiles(RoomState),
    #[serde(rename_all = "camelCase")]
    Disconnected {
        connection_id: ConnectionId,
        username: Option<String>,
    },

    // Editing
    #[serde(rename_all = "camelCase")]
    CodeChange {
        file_id: String,
        code: String,
        sender_id: ConnectionId,
    },
    #[serde(rename_all = "camelCase")]
    FileSwitch { file_id: String },

    // Chat
    #[serde(rename_all = "camelCase")]
    ReceiveMessage {
        message: String,
        username: Option<String>,
        sender_id: ConnectionId,
    },
}

/// 방 참가자 정보 (JOINED 명단 항목)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub connection_id: ConnectionId,
    pub username: Option<String>,
}

/// 수신 프레임 디코딩 실패
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("binary frames are not supported")]
    Binary,
}

impl DecodeError {
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::Malformed(_) => "malformed-event",
            DecodeError::Binary => "unsupported-frame",
        }
    }
}

impl ClientMessage {
    /// 텍스트 프레임을 한 번만 디코딩
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl ServerMessage {
    pub fn error(err: &DecodeError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
