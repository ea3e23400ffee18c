//! Domain layer
//! 스레드 정리 규칙(엔티티/값 객체/분류 정책)을 외부 I/O 없이 표현한다.

pub mod hygiene;
pub mod policy;
pub mod target;
