//! Process wide diagnostics: console through env_logger,
//! optional size rotated log file.
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use env_logger::{Env, Target};
use hifitime::Epoch;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Everything down to debug lands in the log file
const FILE_LEVEL: LevelFilter = LevelFilter::Debug;

/// Log file that rotates once it exceeds its size budget.
/// Rotated generations are `<path>.1` (most recent) to `<path>.<keep>`.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    keep: usize,
    file: File,
    written: u64,
}

fn generation(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

impl RotatingFile {
    /// Opens (appends to) the log file
    pub fn open<P: AsRef<Path>>(path: P, max_bytes: u64, keep: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            keep,
            file,
            written,
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.keep == 0 {
            fs::remove_file(&self.path)?;
        } else {
            let oldest = generation(&self.path, self.keep);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.keep).rev() {
                let src = generation(&self.path, index);
                if src.exists() {
                    fs::rename(&src, generation(&self.path, index + 1))?;
                }
            }
            fs::rename(&self.path, generation(&self.path, 1))?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }

    /// Appends one line, rotating beforehand when the budget would be exceeded
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let size = line.len() as u64 + 1;
        if self.written > 0 && self.written + size > self.max_bytes {
            self.rotate()?;
        }
        writeln!(self.file, "{}", line)?;
        self.written += size;
        Ok(())
    }
}

/// Dispatches records to the console and the optional log file
pub struct Logger {
    console: env_logger::Logger,
    file: Option<Mutex<RotatingFile>>,
    /// Set on the first log file failure, reported once on stderr
    file_failure: AtomicBool,
}

impl Logger {
    pub fn new(file: Option<RotatingFile>) -> Self {
        let console = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
            .target(Target::Stderr)
            .format_timestamp_secs()
            .format_module_path(false)
            .build();

        Self {
            console,
            file: file.map(Mutex::new),
            file_failure: AtomicBool::new(false),
        }
    }

    /// Appends one line to the log file, if any. The first failure
    /// is reported on stderr, the following ones are silent.
    fn append(&self, line: &str) {
        let Some(file) = &self.file else {
            return;
        };

        let result = match file.lock() {
            Ok(mut file) => file.write_line(line),
            Err(_) => Err(io::Error::other("log file lock poisoned")),
        };

        if let Err(e) = result {
            if !self.file_failure.swap(true, Ordering::Relaxed) {
                eprintln!("georange: log file failure: {}", e);
            }
        }
    }

    fn max_level(&self) -> LevelFilter {
        if self.file.is_some() {
            self.console.filter().max(FILE_LEVEL)
        } else {
            self.console.filter()
        }
    }

    /// Installs this [Logger] for the whole process
    pub fn init(self) -> Result<(), SetLoggerError> {
        let max_level = self.max_level();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata) || (self.file.is_some() && metadata.level() <= FILE_LEVEL)
    }

    fn log(&self, record: &Record) {
        if self.console.matches(record) {
            self.console.log(record);
        }

        if record.level() > FILE_LEVEL {
            return;
        }

        if self.file.is_some() {
            let timestamp = Epoch::now()
                .map(|t| t.to_string())
                .unwrap_or_default();

            self.append(&format!(
                "{} [{}] {}: {}",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            ));
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.file.flush();
            }
        }
    }
}
