//! Simple log writer with timestamps

use crate::{Error, Result};
use chrono::{Local, Utc};
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Clone)]
pub struct LogFile {
    inner: Arc<LogFileInner>,
}

struct LogFileInner {
    state: Mutex<LogState>,
    start: Instant,
    output_to_console: bool,
}

struct LogState {
    writer: Box<dyn Write + Send>,
    last_seconds: f32,
}

impl LogFile {
    /// Open a log file at `path`, or in the temp folder with a dated name when
    /// no path is given.
    pub fn new(path: Option<&str>, output_to_console: bool) -> Result<Self> {
        let path = match path {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => env::temp_dir().join(date_time_filename("PointViz_", ".log")),
        };

        let file = File::create(&path).map_err(|e| {
            Error::FileSave(format!("Unable to create file {}: {}", path.display(), e))
        })?;

        let log = Self::from_writer(Box::new(BufWriter::new(file)), output_to_console);

        log.log(format!("Opened {}", path.display()))?;
        log.log("\n----------------------------------------\n")?;
        log.log_time()?;
        log.log("\n----------------------------------------\n")?;
        log.log(format!("Operating System      {}", env::consts::OS))?;
        log.log(format!("Architecture:         {}", env::consts::ARCH))?;
        log.log(format!(
            "Processor Count:      {}",
            std::thread::available_parallelism()
                .map(|c| c.get())
                .unwrap_or(0)
        ))?;
        log.log("\n----------------------------------------\n")?;

        Ok(log)
    }

    /// A log that discards everything except the optional console echo.
    pub fn sink(output_to_console: bool) -> Self {
        Self::from_writer(Box::new(io::sink()), output_to_console)
    }

    pub fn from_writer(writer: Box<dyn Write + Send>, output_to_console: bool) -> Self {
        Self {
            inner: Arc::new(LogFileInner {
                state: Mutex::new(LogState {
                    writer,
                    last_seconds: 0.0,
                }),
                start: Instant::now(),
                output_to_console,
            }),
        }
    }

    pub fn log(&self, message: impl AsRef<str>) -> Result<()> {
        self.inner.log_lines(message.as_ref())
    }

    pub fn log_time(&self) -> Result<()> {
        let utc = Utc::now();
        let local = Local::now();
        self.log(format!(
            "Current time (UTC): {}",
            utc.format("%Y-%m-%d %H:%M:%S (UTC)")
        ))?;
        self.log(format!(
            "Current local time: {}",
            local.format("%Y-%m-%d %H:%M:%S (%z)")
        ))?;
        Ok(())
    }
}

impl LogFileInner {
    fn log_lines(&self, message: &str) -> Result<()> {
        let seconds = self.start.elapsed().as_secs_f32();

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let diff = seconds - state.last_seconds;
        let prefix = format!("{:7.0}s {:6.1}+ ", seconds, diff);

        for line in message.split('\n') {
            if self.output_to_console {
                println!("{}{}", prefix, line);
            }
            state.writer.write_all(prefix.as_bytes())?;
            state.writer.write_all(line.as_bytes())?;
            state.writer.write_all(b"\n")?;
            state.writer.flush()?;
            state.last_seconds = seconds;
        }

        Ok(())
    }
}

impl Drop for LogFileInner {
    fn drop(&mut self) {
        let _ = self.log_lines("\n----------------------------------------\n");
        let _ = self.log_lines("Closing log.");
        let _ = self.log_lines(&format!(
            "Current time (UTC): {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S (UTC)")
        ));
        let _ = self.log_lines("Done.");
    }
}

fn date_time_filename(prefix: &str, postfix: &str) -> String {
    let now = Local::now();
    format!("{}{}{}", prefix, now.format("%Y%m%d_%H%M%S"), postfix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lines_are_prefixed() {
        let buffer = Shared::default();
        let log = LogFile::from_writer(Box::new(buffer.clone()), false);
        log.log("first\nsecond").unwrap();

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].ends_with("second"));
        assert!(lines[0].contains("s ") && lines[0].contains("+ "));
    }

    #[test]
    fn test_date_time_filename() {
        let name = date_time_filename("PointViz_", ".log");
        assert!(name.starts_with("PointViz_"));
        assert!(name.ends_with(".log"));
    }
}
