//! 주입형 저장소 (연결 → 사용자명, 방 → 방 상태)

mod identity;
mod registry;

pub use identity::IdentityMap;
pub use registry::{RoomRegistry, SharedRoom};
