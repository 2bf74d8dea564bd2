//! 연결 핸들러

use crate::protocol::{ClientMessage, DecodeError, ServerMessage};
use crate::state::AppState;
use axum::extract::ws::Message;
use futures::{Stream, StreamExt};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// 새 연결 처리
pub async fn handle_connection(
    state: Arc<AppState>,
    sender: UnboundedSender<ServerMessage>,
) -> String {
    let connection_id = Uuid::new_v4().to_string();

    state.gateway.register(&connection_id, sender);
    state.gateway.emit_to(
        &connection_id,
        ServerMessage::Connected {
            connection_id: connection_id.clone(),
        },
    );

    tracing::info!(connection_id = %connection_id, "New connection established");
    connection_id
}

/// 연결 해제 처리
///
/// 멤버십이 아직 남아 있는 상태에서 참여 중인 모든 방에 DISCONNECTED를 알린 뒤
/// 사용자명과 연결을 제거한다. 방 상태 자체는 건드리지 않는다.
pub async fn handle_disconnect(state: Arc<AppState>, connection_id: &str) {
    let username = state.identities.username(connection_id);

    for room_id in state.gateway.rooms_of(connection_id) {
        crate::handlers::room::leave_room_internal(
            &state,
            connection_id,
            &room_id,
            username.clone(),
        )
        .await;
    }

    state.identities.remove(connection_id);
    state.gateway.unregister(connection_id);
    tracing::info!(connection_id = %connection_id, "Connection closed");
}

/// Heartbeat 처리
pub fn handle_heartbeat(state: &AppState, connection_id: &str) {
    state.gateway.emit_to(connection_id, ServerMessage::HeartbeatAck);
}

/// 수신 프레임 하나 처리
///
/// 잘못된 프레임은 보낸 연결에만 ERROR로 답하고 계속 읽는다.
/// Close 프레임이나 수신 오류면 `Break`를 돌려준다.
pub async fn handle_frame(
    state: &Arc<AppState>,
    connection_id: &str,
    frame: Result<Message, axum::Error>,
) -> ControlFlow<()> {
    let decoded = match frame {
        Ok(Message::Text(text)) => ClientMessage::decode(&text),
        Ok(Message::Binary(_)) => Err(DecodeError::Binary),
        Ok(Message::Close(_)) => return ControlFlow::Break(()),
        Ok(_) => return ControlFlow::Continue(()),
        Err(e) => {
            tracing::debug!(
                connection_id = %connection_id,
                error = %e,
                "WebSocket receive error"
            );
            return ControlFlow::Break(());
        }
    };

    match decoded {
        Ok(msg) => crate::handlers::dispatch(state, connection_id, msg).await,
        Err(e) => {
            tracing::warn!(
                connection_id = %connection_id,
                error = %e,
                "Rejected client frame"
            );
            state
                .gateway
                .emit_to(connection_id, ServerMessage::error(&e));
        }
    }
    ControlFlow::Continue(())
}

/// 수신 루프. 도착 순서대로 하나씩 처리하고, 끝나면 연결 해제를 수행한다.
pub async fn handle_incoming<S>(state: Arc<AppState>, connection_id: &str, mut frames: S)
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(frame) = frames.next().await {
        if handle_frame(&state, connection_id, frame).await.is_break() {
            break;
        }
    }

    handle_disconnect(state, connection_id).await;
}
