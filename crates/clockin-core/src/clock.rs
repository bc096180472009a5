//! 시계 추상화.
//!
//! 토큰 만료 판정은 현재 시각에 의존하므로 시각을 직접 읽지 않고
//! [`Clock`]을 주입받습니다. 테스트에서는 [`ManualClock`]으로
//! 실제 대기 없이 만료를 재현합니다.

use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

/// 현재 시각 제공자.
pub trait Clock: Send + Sync {
    /// 현재 시각 (UTC).
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 수동으로 조작하는 시계.
///
/// 생성 시각에 고정되어 있으며 [`ManualClock::advance`]로만 움직입니다.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// 주어진 시각에 고정된 시계 생성.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// 현재 시스템 시각(초 단위 절삭)에서 시작하는 시계 생성.
    pub fn starting_now() -> Self {
        let now = Utc::now();
        let truncated = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        Self::new(truncated)
    }

    /// 시각을 앞으로 이동합니다.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    /// 시각을 지정한 값으로 설정합니다.
    pub fn set(&self, to: DateTime<Utc>) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}
