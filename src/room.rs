//! 방 상태 모델 (파일 집합 + 활성 파일)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

const STARTER_HTML: &str = concat!(
    "<!DOCTYPE html>\n<html>\n<head>\n  <title>Document</title>\n</head>\n",
    "<body>\n  <h1>Hello World</h1>\n</body>\n</html>",
);

pub const DEFAULT_ACTIVE_FILE: &str = "index.js";

/// 파일 언어 태그
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Html,
    Css,
    Python,
}

/// 방이 소유하는 단일 파일
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub content: String,
    pub language: Language,
}

impl File {
    fn new(content: &str, language: Language) -> Self {
        Self {
            content: content.to_string(),
            language,
        }
    }
}

/// 방의 권위 있는 파일 상태. SYNC_FILES 페이로드로 그대로 직렬화된다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    pub files: BTreeMap<String, File>,
    pub active_file_id: String,
}

impl RoomState {
    /// 기본 파일 세트로 새 방 상태 생성
    pub fn with_default_files() -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            "index.js".to_string(),
            File::new("// Start coding here (JavaScript)", Language::Javascript),
        );
        files.insert(
            "style.css".to_string(),
            File::new("/* Add your styles here (CSS) */", Language::Css),
        );
        files.insert(
            "index.html".to_string(),
            File::new(STARTER_HTML, Language::Html),
        );
        files.insert(
            "index.py".to_string(),
            File::new("# Start coding here (Python)", Language::Python),
        );

        Self {
            files,
            active_file_id: DEFAULT_ACTIVE_FILE.to_string(),
        }
    }

    pub fn has_file(&self, file_id: &str) -> bool {
        self.files.contains_key(file_id)
    }

    /// 파일 내용 덮어쓰기 (last-writer-wins). 없는 파일이면 false.
    pub fn apply_edit(&mut self, file_id: &str, code: &str) -> bool {
        match self.files.get_mut(file_id) {
            Some(file) => {
                file.content.clear();
                file.content.push_str(code);
                true
            }
            None => false,
        }
    }

    /// 활성 파일 포인터 변경. 존재 여부는 호출자가 정책에 따라 판단한다.
    pub fn switch_active(&mut self, file_id: &str) {
        self.active_file_id = file_id.to_string();
    }

    pub fn active_is_valid(&self) -> bool {
        self.files.contains_key(&self.active_file_id)
    }
}

/// 레지스트리 항목: 방 상태 + 수명 관리용 타임스탬프
#[derive(Debug)]
pub struct Room {
    pub id: String,
    pub state: RoomState,
    pub created_at: Instant,
    last_activity: Instant,
}

impl Room {
    pub fn new(id: String) -> Self {
        let now = Instant::now();
        Self {
            id,
            state: RoomState::with_default_files(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    pub fn snapshot(&self) -> RoomState {
        self.state.clone()
    }
}
