//! 채팅 핸들러

use crate::gateway::Scope;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

/// 채팅 메시지 중계. 서버는 기록을 남기지 않으며 보낸 사람은 로컬에서 직접 추가한다.
pub async fn handle_send_message(
    state: Arc<AppState>,
    sender_id: &str,
    room_id: &str,
    message: &str,
) {
    let username = state.identities.username(sender_id);

    let delivered = state.gateway.emit_to_room(
        room_id,
        Scope::Others(sender_id),
        ServerMessage::ReceiveMessage {
            message: message.to_string(),
            username,
            sender_id: sender_id.to_string(),
        },
    );

    tracing::debug!(
        sender_id = %sender_id,
        room_id = %room_id,
        delivered = delivered,
        "Relayed chat message"
    );
}
