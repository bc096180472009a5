//! # Clockin Core
//!
//! 출퇴근 기록 백엔드의 공통 기반을 제공합니다:
//! - 설정 관리 (`AppConfig`, 서명 키/토큰 TTL 포함)
//! - 로깅 인프라
//! - 주입 가능한 시계 (토큰 만료 판정용)
//! - 공통 에러 타입

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::*;
pub use error::*;
pub use logging::*;
