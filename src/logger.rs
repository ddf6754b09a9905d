use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use env_logger::{Builder, Target};
use log::LevelFilter;

use crate::settings::LogHandler;

const LOG_DIR: &str = "logs";

pub fn init(handler: LogHandler) -> io::Result<()> {
    let target = match handler {
        LogHandler::Stream => Target::Stderr,
        LogHandler::File => {
            let file = open_log_file(Path::new(LOG_DIR), &Local::now())?;
            Target::Pipe(Box::new(file))
        }
    };

    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - [{}:{}] - {}",
                Local::now().format("%b-%d-%Y %I:%M:%S %p"),
                record.level(),
                record.module_path().unwrap_or(record.target()),
                record.line().unwrap_or_default(),
                record.args()
            )
        })
        .target(target)
        .init();
    Ok(())
}

/// One file per day, e.g. `logs/mortgage_alert_14-03-2024.log`.
pub fn log_file_path(dir: &Path, now: &DateTime<Local>) -> PathBuf {
    dir.join(format!("mortgage_alert_{}.log", now.format("%d-%m-%Y")))
}

/// Opens today's log for appending and writes a separator line so each run
/// starts on a fresh block.
pub fn open_log_file(dir: &Path, now: &DateTime<Local>) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(log_file_path(dir, now))?;

    file.seek(SeekFrom::Start(0))?;
    let mut first = [0u8; 1];
    let empty = file.read(&mut first)? == 0;

    let separator = "*".repeat(120);
    if empty {
        writeln!(file, "{}", separator)?;
    } else {
        writeln!(file, "\n{}", separator)?;
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn separates_consecutive_runs() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("logs");
        let now = Local.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap();

        drop(open_log_file(&logs, &now).unwrap());
        let mut second = open_log_file(&logs, &now).unwrap();
        writeln!(second, "entry").unwrap();
        drop(second);

        let path = log_file_path(&logs, &now);
        assert!(path.ends_with("mortgage_alert_14-03-2024.log"));

        let stars = "*".repeat(120);
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, format!("{stars}\n\n{stars}\nentry\n"));
    }
}
