//! 저장소 가치평가(LSM) 입력 폼의 설정 동기화/파라미터 검증 엔진.
//!
//! GUI와 CLI는 이 라이브러리를 얇게 감싸기만 한다.

pub mod app;
pub mod assemble;
pub mod calculation;
pub mod derived;
pub mod form;
pub mod key_map;
pub mod logging;
pub mod notify;
pub mod numeric;
pub mod session;
pub mod settings;
pub mod ui_cli;
pub mod user_entries;
pub mod validate;
pub mod volatility;
