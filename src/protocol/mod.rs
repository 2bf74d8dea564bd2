//! 이벤트 프로토콜

mod messages;

pub use messages::*;
