use colored::*;
use debugview_core::paths;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    /// Info, warnings and errors
    Quiet,
    /// Everything except trace
    Normal,
    Verbose,
}

impl Verbosity {
    fn max_level(self) -> Level {
        match self {
            Verbosity::Quiet => Level::Info,
            Verbosity::Normal => Level::Debug,
            Verbosity::Verbose => Level::Trace,
        }
    }
}

/// Console logger with colored level tags that also keeps a plain copy in the log file.
pub struct DebugViewLogger {
    verbosity: Verbosity,
    log_file: Mutex<Option<File>>,
    target_colors: Mutex<HashMap<String, Color>>,
}

const TARGET_PALETTE: [Color; 5] = [
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

impl DebugViewLogger {
    pub fn new(quiet: bool, verbose: bool) -> Self {
        let verbosity = match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        };

        Self {
            verbosity,
            log_file: Mutex::new(open_log_file()),
            target_colors: Mutex::new(HashMap::new()),
        }
    }

    fn target_color(&self, target: &str) -> Color {
        let Ok(mut colors) = self.target_colors.lock() else {
            return Color::White;
        };
        let next = colors.len() % TARGET_PALETTE.len();
        *colors
            .entry(target.to_string())
            .or_insert(TARGET_PALETTE[next])
    }

    fn format_colored(&self, record: &Record) -> String {
        let tag = level_tag(record.level());
        let target = short_target(record.target());
        let target = if target.is_empty() {
            String::new()
        } else {
            format!("[{}] ", target.color(self.target_color(target)).dimmed())
        };
        let body = format!("{target}{}", record.args());

        match record.level() {
            Level::Error => format!("{tag} {body}").red().bold().to_string(),
            Level::Warn => format!("{tag} {body}").yellow().bold().to_string(),
            Level::Info => format!("{} {body}", tag.green().bold()),
            Level::Debug => format!("{} {body}", tag.blue().bold()),
            Level::Trace => format!("{} {body}", tag.white().bold()),
        }
    }

    fn format_plain(record: &Record) -> String {
        let target = short_target(record.target());
        if target.is_empty() {
            format!("{} {}", level_tag(record.level()), record.args())
        } else {
            format!("{} [{target}] {}", level_tag(record.level()), record.args())
        }
    }
}

fn open_log_file() -> Option<File> {
    paths::ensure_data_dir()?;
    let path = paths::log_file_path()?;
    match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
    {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Failed to open log file at {}: {e}", path.display());
            None
        }
    }
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "[E]",
        Level::Warn => "[W]",
        Level::Info => "[I]",
        Level::Debug => "[D]",
        Level::Trace => "[T]",
    }
}

/// `debugview_core::overlay::session` becomes `session`.
fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

impl Log for DebugViewLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.verbosity.max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        println!("{}", self.format_colored(record));

        if let Ok(mut file) = self.log_file.lock() {
            if let Some(file) = file.as_mut() {
                let _ = writeln!(file, "{}", Self::format_plain(record));
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.log_file.lock() {
            if let Some(file) = file.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

pub fn init_logger(quiet: bool, verbose: bool) -> Result<(), log::SetLoggerError> {
    let logger = DebugViewLogger::new(quiet, verbose);
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(LevelFilter::Trace);
    Ok(())
}
