//! 애플리케이션 상태 관리

use crate::config::Config;
use crate::gateway::Gateway;
use crate::store::{IdentityMap, RoomRegistry};
use std::sync::Arc;

/// 프로세스 시작 시 한 번 만들어 핸들러에 Arc로 넘기는 상태
pub struct AppState {
    /// 방 상태 (room_id -> Room)
    pub rooms: RoomRegistry,
    /// 사용자명 (connection_id -> username)
    pub identities: IdentityMap,
    /// 연결 채널과 방 멤버십
    pub gateway: Gateway,
    /// 설정
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            rooms: RoomRegistry::new(),
            identities: IdentityMap::new(),
            gateway: Gateway::new(),
            config: Arc::new(config),
        }
    }
}
