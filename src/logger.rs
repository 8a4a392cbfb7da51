use chrono::Local;
use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// 读取日志级别的环境变量
pub const LOG_ENV: &str = "BLOCKFS_LOG";

struct ShellLogger;

static LOGGER: ShellLogger = ShellLogger;

impl Log for ShellLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    // 写到 stderr，不和命令输出混在一起
    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow(),
            Level::Info => "INFO ".green(),
            Level::Debug => "DEBUG".blue(),
            Level::Trace => "TRACE".bright_black(),
        };
        eprintln!(
            "{} {} {}",
            Local::now().format("%H:%M:%S%.3f").to_string().bright_black(),
            level,
            record.args()
        );
    }

    fn flush(&self) {}
}

/// 级别优先取命令行参数，其次取环境变量，默认 warn
pub fn level_from(cli: Option<&str>) -> LevelFilter {
    cli.map(str::to_string)
        .or_else(|| std::env::var(LOG_ENV).ok())
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Warn)
}

pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_wins() {
        assert_eq!(level_from(Some("debug")), LevelFilter::Debug);
        assert_eq!(level_from(Some("OFF")), LevelFilter::Off);
    }

    #[test]
    fn unparsable_level_falls_back_to_warn() {
        assert_eq!(level_from(Some("loud")), LevelFilter::Warn);
    }
}
