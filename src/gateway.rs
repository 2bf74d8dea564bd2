//! 연결 채널 추상화: 방 멤버십, 단일 연결 전송, 방 브로드캐스트

use crate::protocol::{ConnectionId, ServerMessage};
use dashmap::DashMap;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

/// 방 브로드캐스트 대상 범위
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// 보낸 사람 포함 방 전체
    All,
    /// 지정한 연결을 제외한 나머지
    Others(&'a str),
}

/// 살아 있는 연결 하나
#[derive(Debug)]
struct Connection {
    sender: UnboundedSender<ServerMessage>,
    rooms: Vec<String>,
    connected_at: Instant,
}

#[derive(Debug, Default)]
pub struct Gateway {
    connections: DashMap<ConnectionId, Connection>,
    /// 방 ID → 참여 순서대로의 멤버 목록
    members: DashMap<String, Vec<ConnectionId>>,
}

impl Gateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, connection_id: &str, sender: UnboundedSender<ServerMessage>) {
        self.connections.insert(
            connection_id.to_string(),
            Connection {
                sender,
                rooms: Vec::new(),
                connected_at: Instant::now(),
            },
        );
    }

    /// 연결 제거. 남아 있던 멤버십도 함께 정리한다.
    pub fn unregister(&self, connection_id: &str) {
        if let Some((_, connection)) = self.connections.remove(connection_id) {
            for room_id in &connection.rooms {
                self.remove_member(room_id, connection_id);
            }
            tracing::debug!(
                connection_id = %connection_id,
                lifetime_secs = connection.connected_at.elapsed().as_secs(),
                "Connection unregistered"
            );
        }
    }

    pub fn is_connected(&self, connection_id: &str) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// 방 참여. 이미 멤버면 아무것도 하지 않는다.
    pub fn join(&self, connection_id: &str, room_id: &str) {
        let Some(mut connection) = self.connections.get_mut(connection_id) else {
            tracing::debug!(connection_id = %connection_id, "Join from unknown connection ignored");
            return;
        };
        if !connection.rooms.iter().any(|r| r == room_id) {
            connection.rooms.push(room_id.to_string());
        }
        drop(connection);

        let mut members = self.members.entry(room_id.to_string()).or_default();
        if !members.iter().any(|m| m == connection_id) {
            members.push(connection_id.to_string());
        }
    }

    /// 방 나가기. 멤버였으면 true.
    pub fn leave(&self, connection_id: &str, room_id: &str) -> bool {
        if let Some(mut connection) = self.connections.get_mut(connection_id) {
            connection.rooms.retain(|r| r != room_id);
        }
        self.remove_member(room_id, connection_id)
    }

    fn remove_member(&self, room_id: &str, connection_id: &str) -> bool {
        let mut removed = false;
        if let Some(mut members) = self.members.get_mut(room_id) {
            let before = members.len();
            members.retain(|m| m != connection_id);
            removed = members.len() != before;
        }
        self.members.remove_if(room_id, |_, members| members.is_empty());
        removed
    }

    pub fn is_member(&self, connection_id: &str, room_id: &str) -> bool {
        self.members
            .get(room_id)
            .map(|members| members.iter().any(|m| m == connection_id))
            .unwrap_or(false)
    }

    pub fn members(&self, room_id: &str) -> Vec<ConnectionId> {
        self.members
            .get(room_id)
            .map(|members| members.clone())
            .unwrap_or_default()
    }

    pub fn member_count(&self, room_id: &str) -> usize {
        self.members.get(room_id).map(|m| m.len()).unwrap_or(0)
    }

    pub fn rooms_of(&self, connection_id: &str) -> Vec<String> {
        self.connections
            .get(connection_id)
            .map(|connection| connection.rooms.clone())
            .unwrap_or_default()
    }

    /// 특정 연결에게 메시지 전송
    pub fn emit_to(&self, connection_id: &str, message: ServerMessage) {
        if let Some(connection) = self.connections.get(connection_id) {
            if connection.sender.send(message).is_err() {
                tracing::debug!(
                    connection_id = %connection_id,
                    "Send to closed connection dropped"
                );
            }
        }
    }

    /// 방에 메시지 브로드캐스트. 전달한 연결 수를 반환한다.
    pub fn emit_to_room(&self, room_id: &str, scope: Scope<'_>, message: ServerMessage) -> usize {
        // 멤버 목록 가드를 잡은 채로 connections 맵에 접근하지 않는다
        let members = self.members(room_id);
        let mut delivered = 0;

        for member in &members {
            if let Scope::Others(except) = scope {
                if member == except {
                    continue;
                }
            }
            if let Some(connection) = self.connections.get(member) {
                if connection.sender.send(message.clone()).is_ok() {
                    delivered += 1;
                }
            }
        }

        delivered
    }
}
