//! 방 관리 핸들러

use crate::gateway::Scope;
use crate::protocol::{ClientInfo, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// 방 참여 처리
///
/// 방이 없으면 기본 파일 세트로 만든다. 방 락을 쥔 채로 멤버 전체에 JOINED를,
/// 참여자에게만 SYNC_FILES를 보내므로 스냅샷 도중 다른 편집이 끼어들 수 없다.
pub async fn handle_join_room(
    state: Arc<AppState>,
    connection_id: &str,
    room_id: &str,
    username: &str,
) {
    if !state.gateway.is_connected(connection_id) {
        tracing::debug!(connection_id = %connection_id, "Join from unknown connection ignored");
        return;
    }

    state.identities.register(connection_id, username);

    let (room, created) = state.rooms.get_or_create(room_id);
    if created {
        tracing::info!(room_id = %room_id, "Room created");
    }

    let mut room = room.lock().await;
    room.touch();
    state.gateway.join(connection_id, room_id);

    let clients = roster(&state, room_id);
    let user_count = clients.len();

    state.gateway.emit_to_room(
        room_id,
        Scope::All,
        ServerMessage::Joined {
            clients,
            username: username.to_string(),
            connection_id: connection_id.to_string(),
        },
    );
    if !room.state.active_is_valid() {
        tracing::warn!(
            room_id = %room_id,
            active_file_id = %room.state.active_file_id,
            "Syncing room whose active file is not tracked"
        );
    }
    state
        .gateway
        .emit_to(connection_id, ServerMessage::SyncFiles(room.snapshot()));

    tracing::info!(
        connection_id = %connection_id,
        room_id = %room_id,
        username = %username,
        user_count = user_count,
        "User joined room"
    );
}

/// 방 나가기 처리 (연결은 유지)
pub async fn handle_leave_room(state: Arc<AppState>, connection_id: &str, room_id: &str) {
    if !state.gateway.is_member(connection_id, room_id) {
        tracing::debug!(
            connection_id = %connection_id,
            room_id = %room_id,
            "Leave for a room not joined ignored"
        );
        return;
    }

    let username = state.identities.username(connection_id);
    leave_room_internal(&state, connection_id, room_id, username).await;
}

/// 방 나가기 내부 로직
///
/// 남은 멤버에게 DISCONNECTED를 보낸 뒤 멤버십을 제거한다. 방 상태는 지우지 않는다.
pub async fn leave_room_internal(
    state: &AppState,
    connection_id: &str,
    room_id: &str,
    username: Option<String>,
) {
    let room = state.rooms.get(room_id);
    let mut guard = match &room {
        Some(room) => Some(room.lock().await),
        None => None,
    };

    state.gateway.emit_to_room(
        room_id,
        Scope::Others(connection_id),
        ServerMessage::Disconnected {
            connection_id: connection_id.to_string(),
            username,
        },
    );
    state.gateway.leave(connection_id, room_id);

    if let Some(room) = guard.as_mut() {
        room.touch();
    }

    tracing::info!(
        connection_id = %connection_id,
        room_id = %room_id,
        remaining = state.gateway.member_count(room_id),
        "User left room"
    );
}

/// 참여 순서대로의 방 명단
fn roster(state: &AppState, room_id: &str) -> Vec<ClientInfo> {
    state
        .gateway
        .members(room_id)
        .into_iter()
        .map(|connection_id| ClientInfo {
            username: state.identities.username(&connection_id),
            connection_id,
        })
        .collect()
}

/// 멤버가 없고 유휴 시간이 지난 방 정리
pub async fn cleanup_idle_rooms(state: Arc<AppState>) -> usize {
    let grace = state.config.room.idle_grace();
    let evicted = state
        .rooms
        .reap(grace, |room_id| state.gateway.member_count(room_id) == 0);

    if evicted > 0 {
        tracing::info!(
            evicted_rooms = evicted,
            remaining_rooms = state.rooms.len(),
            "Cleanup completed"
        );
    }
    evicted
}

/// 빈 방 정리 스케줄러. 설정에서 켠 경우에만 띄우며, 기본은 방을 영구 보관한다.
pub fn spawn_room_reaper(state: Arc<AppState>) -> Option<JoinHandle<()>> {
    if !state.config.room.reaper_enabled {
        return None;
    }

    let period = state.config.room.reaper_interval();
    tracing::info!(
        interval_secs = period.as_secs(),
        idle_grace_secs = state.config.room.idle_grace_secs,
        "Room reaper started"
    );
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            cleanup_idle_rooms(state.clone()).await;
        }
    }))
}
