//! CLI 인터페이스 모듈 묶음.
//! 인자 파싱과 webhook 이벤트 해석을 한 네임스페이스로 관리한다.

pub mod command;
pub mod event;

pub use command::{Cli, CliAction};
pub use crate::interface::composition::AppComposition;
