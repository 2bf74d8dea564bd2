//! 핸들러 모듈

pub mod chat;
pub mod connection;
pub mod editor;
pub mod room;

pub use chat::*;
pub use connection::*;
pub use editor::*;
pub use room::*;

use crate::protocol::ClientMessage;
use crate::state::AppState;
use std::sync::Arc;

/// 디코딩된 클라이언트 이벤트를 해당 핸들러로 전달
///
/// 한 연결의 이벤트는 도착 순서대로 하나씩 처리된다.
pub async fn dispatch(state: &Arc<AppState>, connection_id: &str, msg: ClientMessage) {
    match msg {
        ClientMessage::Heartbeat => {
            handle_heartbeat(state, connection_id);
        }
        ClientMessage::Join { room_id, username } => {
            handle_join_room(state.clone(), connection_id, &room_id, &username).await;
        }
        ClientMessage::Leave { room_id } => {
            handle_leave_room(state.clone(), connection_id, &room_id).await;
        }
        ClientMessage::CodeChange {
            room_id,
            file_id,
            code,
        } => {
            handle_code_change(state.clone(), connection_id, &room_id, &file_id, &code).await;
        }
        ClientMessage::FileSwitch { room_id, file_id } => {
            handle_file_switch(state.clone(), connection_id, &room_id, &file_id).await;
        }
        ClientMessage::SendMessage { room_id, message } => {
            handle_send_message(state.clone(), connection_id, &room_id, &message).await;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{connect, drain, new_state};
    use super::*;
    use crate::protocol::{ClientInfo, ServerMessage};
    use crate::room::RoomState;

    use serde_json::{json, Value};

    fn decode(text: &str) -> ClientMessage {
        ClientMessage::decode(text).unwrap()
    }

    /// 와이어 형식 그대로 인코딩한 뒤 디코딩해서 전달
    async fn send(state: &Arc<AppState>, connection_id: &str, event: &str, payload: Value) {
        let frame = json!({ "type": event, "payload": payload }).to_string();
        dispatch(state, connection_id, decode(&frame)).await;
    }

    #[tokio::test]
    async fn test_two_user_session_end_to_end() {
        let state = new_state();
        let (a, mut rx_a) = connect(&state).await;
        let (b, mut rx_b) = connect(&state).await;

        send(&state, &a, "join", json!({"roomId": "r1", "username": "alice"})).await;
        {
            let room = state.rooms.get("r1").unwrap();
            let room = room.lock().await;
            assert_eq!(room.state, RoomState::with_default_files());
        }
        drain(&mut rx_a);

        send(&state, &b, "join", json!({"roomId": "r1", "username": "bob"})).await;
        let roster = vec![
            ClientInfo {
                connection_id: a.clone(),
                username: Some("alice".to_string()),
            },
            ClientInfo {
                connection_id: b.clone(),
                username: Some("bob".to_string()),
            },
        ];
        let joined = ServerMessage::Joined {
            clients: roster,
            username: "bob".to_string(),
            connection_id: b.clone(),
        };
        assert_eq!(drain(&mut rx_a), vec![joined.clone()]);
        assert_eq!(
            drain(&mut rx_b),
            vec![joined, ServerMessage::SyncFiles(RoomState::with_default_files())]
        );

        let edit = json!({"roomId": "r1", "fileId": "index.js", "code": "let x=1"});
        send(&state, &b, "code-change", edit).await;
        assert_eq!(
            drain(&mut rx_a),
            vec![ServerMessage::CodeChange {
                file_id: "index.js".to_string(),
                code: "let x=1".to_string(),
                sender_id: b.clone(),
            }]
        );
        assert!(drain(&mut rx_b).is_empty());

        let switch = json!({"roomId": "r1", "fileId": "style.css"});
        send(&state, &a, "file-switch", switch).await;
        let switch = ServerMessage::FileSwitch {
            file_id: "style.css".to_string(),
        };
        assert_eq!(drain(&mut rx_a), vec![switch.clone()]);
        assert_eq!(drain(&mut rx_b), vec![switch]);
        {
            let room = state.rooms.get("r1").unwrap();
            let room = room.lock().await;
            assert_eq!(room.state.active_file_id, "style.css");
            assert_eq!(room.state.files["index.js"].content, "let x=1");
        }

        handle_disconnect(state.clone(), &a).await;
        assert_eq!(
            drain(&mut rx_b),
            vec![ServerMessage::Disconnected {
                connection_id: a.clone(),
                username: Some("alice".to_string()),
            }]
        );
        assert!(state.identities.username(&a).is_none());
    }

    #[tokio::test]
    async fn test_dispatch_chat_and_heartbeat() {
        let state = new_state();
        let (a, mut rx_a) = connect(&state).await;
        let (b, mut rx_b) = connect(&state).await;
        send(&state, &a, "join", json!({"roomId": "r1", "username": "alice"})).await;
        send(&state, &b, "join", json!({"roomId": "r1", "username": "bob"})).await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        let chat = json!({"roomId": "r1", "message": "hello"});
        send(&state, &a, "send-message", chat).await;
        dispatch(&state, &a, decode(r#"{"type":"heartbeat"}"#)).await;

        assert_eq!(drain(&mut rx_a), vec![ServerMessage::HeartbeatAck]);
        assert_eq!(
            drain(&mut rx_b),
            vec![ServerMessage::ReceiveMessage {
                message: "hello".to_string(),
                username: Some("alice".to_string()),
                sender_id: a.clone(),
            }]
        );
    }

    #[tokio::test]
    async fn test_dispatch_leave() {
        let state = new_state();
        let (a, _rx_a) = connect(&state).await;
        send(&state, &a, "join", json!({"roomId": "r1", "username": "alice"})).await;
        send(&state, &a, "leave", json!({"roomId": "r1"})).await;
        assert_eq!(state.gateway.member_count("r1"), 0);
        assert!(state.rooms.get("r1").is_some());
    }
}
