use crate::{Error, Result};
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use syslog::{Facility, Formatter3164, LoggerBackend};

const LOG_LEVEL_ENV: &str = "TX3VFD_LOG_LEVEL";
const LOG_PATH_ENV: &str = "TX3VFD_LOG_PATH";
const SYSLOG_PROCESS: &str = "tx3vfd";

type SyslogWriter = syslog::Logger<LoggerBackend, Formatter3164>;

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    #[default]
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl FromStr for LogLevel {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(()),
        }
    }
}

impl LogLevel {
    pub fn parse_arg(raw: &str) -> Result<Self> {
        LogLevel::from_str(raw).map_err(|_| {
            Error::InvalidArgs(format!(
                "unknown log level '{raw}' (expected error, warn, info, debug or trace)"
            ))
        })
    }
}

/// Stderr logger with levels, an optional file sink and an optional syslog sink.
pub struct Logger {
    level: LogLevel,
    file: Option<std::fs::File>,
    syslog: Option<Mutex<SyslogWriter>>,
}

impl Logger {
    pub fn new(level: LogLevel, file_path: Option<String>, use_syslog: bool) -> Result<Self> {
        let env_level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|s| LogLevel::from_str(&s).ok());
        let effective_level = env_level.unwrap_or(level);

        let path = file_path.or_else(|| std::env::var(LOG_PATH_ENV).ok());
        let file = match path {
            Some(p) => Some(
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&p)
                    .map_err(|e| {
                        Error::InvalidArgs(format!("cannot open log file '{p}': {e}"))
                    })?,
            ),
            None => None,
        };

        let syslog = if use_syslog {
            match connect_syslog() {
                Ok(writer) => Some(Mutex::new(writer)),
                Err(err) => {
                    eprintln!("syslog unavailable, logging to stderr only: {err}");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            level: effective_level,
            file,
            syslog,
        })
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    pub fn log(&self, level: LogLevel, msg: impl AsRef<str>) {
        if !self.enabled(level) {
            return;
        }
        let msg = msg.as_ref();
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        let line = format!("[{ts:.3}] [{level:?}] {msg}");
        eprintln!("{line}");
        if let Some(file) = self.file.as_ref() {
            if let Ok(mut clone) = file.try_clone() {
                let _ = writeln!(clone, "{line}");
            }
        }
        if let Some(syslog) = self.syslog.as_ref() {
            if let Ok(mut writer) = syslog.lock() {
                let _ = match level {
                    LogLevel::Error => writer.err(msg),
                    LogLevel::Warn => writer.warning(msg),
                    LogLevel::Info => writer.info(msg),
                    LogLevel::Debug | LogLevel::Trace => writer.debug(msg),
                };
            }
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Error, msg);
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Warn, msg);
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Info, msg);
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn trace(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Trace, msg);
    }
}

fn connect_syslog() -> std::result::Result<SyslogWriter, syslog::Error> {
    let formatter = Formatter3164 {
        facility: Facility::LOG_DAEMON,
        hostname: None,
        process: SYSLOG_PROCESS.into(),
        pid: std::process::id(),
    };
    syslog::unix(formatter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!(LogLevel::from_str("WARNING"), Ok(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("trace"), Ok(LogLevel::Trace));
        assert!(LogLevel::parse_arg("loud").is_err());
    }

    #[test]
    fn appends_enabled_lines_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx3vfd.log");
        let logger = Logger::new(
            LogLevel::Info,
            Some(path.to_string_lossy().into_owned()),
            false,
        )
        .unwrap();
        logger.info("display available: no");
        logger.trace("tick");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("display available: no"));
        if !logger.enabled(LogLevel::Trace) {
            assert!(!contents.contains("tick"));
        }
    }

    #[test]
    fn error_level_keeps_only_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx3vfd.log");
        let logger = Logger::new(
            LogLevel::Error,
            Some(path.to_string_lossy().into_owned()),
            false,
        )
        .unwrap();
        logger.error("cannot install signal handler");
        logger.warn("led usb write failed");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[Error] cannot install signal handler"));
        if !logger.enabled(LogLevel::Warn) {
            assert!(!contents.contains("led usb"));
        }
    }

    #[test]
    fn unopenable_log_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("tx3vfd.log");
        let err = Logger::new(
            LogLevel::Info,
            Some(path.to_string_lossy().into_owned()),
            false,
        )
        .err()
        .expect("expected log file error");
        assert!(format!("{err}").contains("cannot open log file"));
    }
}
