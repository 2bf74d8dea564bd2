//! 연결 ID → 사용자명 매핑

use crate::protocol::ConnectionId;
use dashmap::DashMap;

/// 연결 ID → 표시 이름. 사용자명은 고유하지도 인증되지도 않는다.
#[derive(Debug, Default)]
pub struct IdentityMap {
    names: DashMap<ConnectionId, String>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 등록 (재참여 시 마지막 이름으로 덮어씀)
    pub fn register(&self, connection_id: &str, username: &str) {
        self.names
            .insert(connection_id.to_string(), username.to_string());
    }

    pub fn username(&self, connection_id: &str) -> Option<String> {
        self.names.get(connection_id).map(|name| name.value().clone())
    }

    pub fn remove(&self, connection_id: &str) -> Option<String> {
        self.names.remove(connection_id).map(|(_, name)| name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_overwrites() {
        let identities = IdentityMap::new();
        identities.register("c1", "alice");
        identities.register("c1", "alice2");
        assert_eq!(identities.username("c1").as_deref(), Some("alice2"));
        assert_eq!(identities.len(), 1);
    }

    #[test]
    fn test_remove() {
        let identities = IdentityMap::new();
        identities.register("c1", "alice");
        assert_eq!(identities.remove("c1").as_deref(), Some("alice"));
        assert!(identities.username("c1").is_none());
        assert_eq!(identities.remove("c1"), None);
    }

    #[test]
    fn test_usernames_not_unique() {
        let identities = IdentityMap::new();
        identities.register("c1", "sam");
        identities.register("c2", "sam");
        assert_eq!(identities.len(), 2);
    }
}
