use std::sync::OnceLock;

use tempfile::TempDir;
use votelens_common::observability::{LogConfig, LogFormat};

// The directory lives as long as the test binary.
static LOG_DIR: OnceLock<Option<TempDir>> = OnceLock::new();

#[allow(dead_code)]
pub fn init_test_tracing() {
    LOG_DIR.get_or_init(|| {
        let dir = tempfile::Builder::new()
            .prefix("votelens-llm-tests")
            .tempdir()
            .ok()?;
        let config = LogConfig {
            app_name: "votelens-tests",
            log_dir: Some(dir.path().to_path_buf()),
            emit_stderr: true,
            format: LogFormat::from_env(),
            default_filter: "debug",
        };

        votelens_common::observability::init_logging(config).ok()?;
        Some(dir)
    });
}
