//! 파일 편집 / 활성 파일 전환 핸들러

use crate::config::SwitchPolicy;
use crate::gateway::Scope;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

/// 코드 변경 처리 (last-writer-wins)
///
/// 없는 방이나 파일이면 조용히 버린다. 보낸 사람에게는 되돌려 보내지 않는다.
pub async fn handle_code_change(
    state: Arc<AppState>,
    sender_id: &str,
    room_id: &str,
    file_id: &str,
    code: &str,
) {
    let Some(room) = state.rooms.get(room_id) else {
        tracing::debug!(
            sender_id = %sender_id,
            room_id = %room_id,
            "Code change for unknown room dropped"
        );
        return;
    };

    let mut room = room.lock().await;
    if !room.state.apply_edit(file_id, code) {
        tracing::debug!(
            sender_id = %sender_id,
            room_id = %room_id,
            file_id = %file_id,
            "Code change for unknown file dropped"
        );
        return;
    }
    room.touch();

    let delivered = state.gateway.emit_to_room(
        room_id,
        Scope::Others(sender_id),
        ServerMessage::CodeChange {
            file_id: file_id.to_string(),
            code: code.to_string(),
            sender_id: sender_id.to_string(),
        },
    );

    tracing::debug!(
        sender_id = %sender_id,
        room_id = %room_id,
        file_id = %file_id,
        bytes = code.len(),
        delivered = delivered,
        "Relayed code change"
    );
}

/// 활성 파일 전환 처리
///
/// 보낸 사람을 포함한 방 전체에 FILE_SWITCH를 보낸다.
pub async fn handle_file_switch(
    state: Arc<AppState>,
    sender_id: &str,
    room_id: &str,
    file_id: &str,
) {
    let room = state.rooms.get(room_id);
    let mut guard = match &room {
        Some(room) => Some(room.lock().await),
        None => None,
    };

    let known = guard.as_ref().is_some_and(|room| room.state.has_file(file_id));
    if !known {
        match state.config.room.switch_policy {
            SwitchPolicy::Guarded => {
                tracing::debug!(
                    sender_id = %sender_id,
                    room_id = %room_id,
                    file_id = %file_id,
                    "File switch to unknown file rejected"
                );
                return;
            }
            SwitchPolicy::Permissive => {
                tracing::warn!(
                    sender_id = %sender_id,
                    room_id = %room_id,
                    file_id = %file_id,
                    "Active file points at a file the room does not track"
                );
            }
        }
    }

    if let Some(room) = guard.as_mut() {
        room.state.switch_active(file_id);
        room.touch();
    }

    let delivered = state.gateway.emit_to_room(
        room_id,
        Scope::All,
        ServerMessage::FileSwitch {
            file_id: file_id.to_string(),
        },
    );

    tracing::debug!(
        sender_id = %sender_id,
        room_id = %room_id,
        file_id = %file_id,
        delivered = delivered,
        "Relayed file switch"
    );
}
