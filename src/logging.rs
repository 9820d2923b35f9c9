use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Terminal log level for a `-v` count: warn, info, debug, trace.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger: stderr at the `-v` level, plus debug records
/// appended to `file` when given.
/// Best-effort: an unusable log file only costs the file log.
pub fn init(verbosity: u8, file: Option<&Path>) {
    let level = level_for(verbosity);
    let term_config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        term_config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let mut file_error = None;
    if let Some(path) = file {
        match open_log_file(path) {
            Ok(f) => {
                let file_config = ConfigBuilder::new().set_time_format_rfc3339().build();
                loggers.push(WriteLogger::new(level.max(LevelFilter::Debug), file_config, f));
            }
            Err(e) => file_error = Some(format!("{}: {e}", path.display())),
        }
    }

    // Only fails if a logger is already installed (tests, repeated init).
    let _ = CombinedLogger::init(loggers);

    if let Some(e) = file_error {
        log::warn!("log file disabled: {e}");
    }
}

/// Open `path` for appending, creating parent directories.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}
