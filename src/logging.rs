//! tracing 구독자 설치. 표준 에러와 실행마다 새로 쓰는 로그 파일로 내보낸다.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "storage_lsm.log";

/// `RUST_LOG`이 없으면 `info`(verbose면 `debug`) 수준으로 설치한다.
/// 이미 설치되어 있으면 아무것도 하지 않는다.
pub fn init(log_file: Option<&Path>, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let file = log_file.and_then(|path| match File::create(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("cannot open log file {}: {e}", path.display());
            None
        }
    });
    let _ = match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(io::stderr.and(Mutex::new(file)))
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
    };
}
