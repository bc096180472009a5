//! Repository pattern for database operations.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러에서 분리하여 관리합니다.
//! 저장소는 [`PrincipalStore`](crate::auth::PrincipalStore) 트레이트 뒤에 숨겨져
//! PostgreSQL 구현과 메모리 구현을 바꿔 끼울 수 있습니다.

pub mod principals;

pub use principals::{InMemoryPrincipalStore, PgPrincipalStore};
