//! 환경 변수 기반 설정 관리

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 서버 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub room: RoomConfig,
    pub log_level: String,
}

/// 방 설정
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub switch_policy: SwitchPolicy,
    pub reaper_enabled: bool,
    pub reaper_interval_secs: u64,
    pub idle_grace_secs: u64,
}

impl RoomConfig {
    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_secs.max(1))
    }

    pub fn idle_grace(&self) -> Duration {
        Duration::from_secs(self.idle_grace_secs)
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            switch_policy: SwitchPolicy::default(),
            reaper_enabled: false,
            reaper_interval_secs: 60,
            idle_grace_secs: 600,
        }
    }
}

/// 존재하지 않는 파일로의 전환(file-switch)을 어떻게 처리할지
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchPolicy {
    /// 어떤 fileId든 activeFileId에 기록하고 브로드캐스트
    #[default]
    Permissive,
    /// 방에 없는 fileId면 무시
    Guarded,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown file switch policy: {0}")]
pub struct UnknownPolicy(String);

impl FromStr for SwitchPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "guarded" => Ok(Self::Guarded),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["*".to_string()],
            room: RoomConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = RoomConfig::default();

        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
            room: RoomConfig {
                switch_policy: env::var("FILE_SWITCH_POLICY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_default(),
                reaper_enabled: env::var("ROOM_REAPER_ENABLED")
                    .map(|v| v == "true")
                    .unwrap_or(defaults.reaper_enabled),
                reaper_interval_secs: env::var("ROOM_REAPER_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.reaper_interval_secs),
                idle_grace_secs: env::var("ROOM_IDLE_GRACE_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.idle_grace_secs),
            },
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_policy_parse() {
        assert_eq!("guarded".parse::<SwitchPolicy>().unwrap(), SwitchPolicy::Guarded);
        assert_eq!(" Permissive ".parse::<SwitchPolicy>().unwrap(), SwitchPolicy::Permissive);
        assert!("strict".parse::<SwitchPolicy>().is_err());
    }

    #[test]
    fn test_parse_origins_trims_and_skips_empty() {
        let origins = parse_origins("http://a.test, ,http://b.test ");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_wildcard_origin() {
        let mut config = Config::default();
        assert!(config.allows_any_origin());
        config.cors_origins = vec!["http://localhost:3000".to_string()];
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_default_keeps_rooms_forever() {
        let config = Config::default();
        assert!(!config.room.reaper_enabled);
        assert_eq!(config.room.switch_policy, SwitchPolicy::Permissive);
    }

    #[test]
    fn test_reaper_interval_never_zero() {
        let room = RoomConfig {
            reaper_interval_secs: 0,
            ..RoomConfig::default()
        };
        assert_eq!(room.reaper_interval(), Duration::from_secs(1));
    }
}
