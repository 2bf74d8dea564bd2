//! 방 ID → 방 상태 레지스트리

use crate::room::Room;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// 방 단위 락. 변경과 브로드캐스트는 이 락을 쥔 채로 끝낸다.
pub type SharedRoom = Arc<Mutex<Room>>;

/// 방 ID → 방 상태. 첫 참여 때 생성되며 코디네이터는 삭제하지 않는다.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, SharedRoom>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 방 가져오기 또는 기본 파일 세트로 생성. 두 번째 값은 새로 만들었는지 여부.
    pub fn get_or_create(&self, room_id: &str) -> (SharedRoom, bool) {
        if let Some(room) = self.rooms.get(room_id) {
            return (room.value().clone(), false);
        }

        let mut created = false;
        let room = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                created = true;
                Arc::new(Mutex::new(Room::new(room_id.to_string())))
            })
            .value()
            .clone();
        (room, created)
    }

    pub fn get(&self, room_id: &str) -> Option<SharedRoom> {
        self.rooms.get(room_id).map(|room| room.value().clone())
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// 비어 있고 유휴 시간이 grace를 넘긴 방 제거. 핸들러가 참조 중인 방은 건너뛴다.
    pub fn reap<F>(&self, grace: Duration, is_empty: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let mut evicted = 0;

        self.rooms.retain(|room_id, room| {
            // 핸들러가 Arc를 복제해 둔 상태면 사용 중
            if Arc::strong_count(room) > 1 {
                return true;
            }
            let Ok(guard) = room.try_lock() else {
                return true;
            };
            if !is_empty(room_id.as_str()) || guard.idle_for() < grace {
                return true;
            }

            tracing::info!(
                room_id = %guard.id,
                age_secs = guard.created_at.elapsed().as_secs(),
                idle_secs = guard.idle_for().as_secs(),
                "Evicted idle room"
            );
            evicted += 1;
            false
        });

        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let registry = RoomRegistry::new();
        let (first, created) = registry.get_or_create("r1");
        assert!(created);
        let (second, created) = registry.get_or_create("r1");
        assert!(!created);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let registry = RoomRegistry::new();
        let (r1, _) = registry.get_or_create("r1");
        let (r2, _) = registry.get_or_create("r2");
        r1.lock().await.state.apply_edit("index.js", "r1 only");
        assert_eq!(
            r2.lock().await.state.files["index.js"].content,
            "// Start coding here (JavaScript)"
        );
    }

    #[tokio::test]
    async fn test_get_unknown_room() {
        let registry = RoomRegistry::new();
        assert!(registry.get("nope").is_none());
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn test_reap_evicts_only_empty_idle_rooms() {
        let registry = RoomRegistry::new();
        registry.get_or_create("empty");
        registry.get_or_create("occupied");

        let evicted = registry.reap(Duration::ZERO, |room_id| room_id == "empty");
        assert_eq!(evicted, 1);
        assert!(registry.get("empty").is_none());
        assert!(registry.get("occupied").is_some());
    }

    #[tokio::test]
    async fn test_reap_respects_grace_period() {
        let registry = RoomRegistry::new();
        registry.get_or_create("r1");
        assert_eq!(registry.reap(Duration::from_secs(3600), |_| true), 0);
        assert!(registry.get("r1").is_some());
    }

    #[tokio::test]
    async fn test_reap_skips_rooms_in_use() {
        let registry = RoomRegistry::new();
        let (held, _) = registry.get_or_create("r1");
        assert_eq!(registry.reap(Duration::ZERO, |_| true), 0);
        drop(held);
        assert_eq!(registry.reap(Duration::ZERO, |_| true), 1);
    }
}
