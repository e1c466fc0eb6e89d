//! Logger initialization
//!
//! Console + file output through `simplelog`; the rest of the code base only
//! talks to the `log` facade. Console output goes to stderr so stdout stays
//! free for CLI output such as `tariffs --json`.

use anyhow::Result;
use simplelog::*;
use std::fs::File;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Log file could not be created or a logger is already installed
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postabot.log");

        // A logger may already be installed by another test; the file is
        // created before installation either way.
        let _ = init_logger(path.to_str().unwrap());

        assert!(path.exists());
    }

    #[test]
    fn test_init_logger_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("postabot.log");

        assert!(init_logger(path.to_str().unwrap()).is_err());
    }
}
