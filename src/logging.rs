use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Where log lines go. The editor owns the terminal, so it never logs to
/// stdout; `serve` keeps stdout for protocol traffic and logs to stderr.
#[derive(Clone, Debug)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
    Discard,
}

#[derive(Clone)]
struct SharedFile(Arc<Mutex<File>>);

struct SharedFileGuard(Arc<Mutex<File>>);

impl std::io::Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut file = self
            .0
            .lock()
            .map_err(|_| std::io::Error::other("log file lock poisoned"))?;
        file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut file = self
            .0
            .lock()
            .map_err(|_| std::io::Error::other("log file lock poisoned"))?;
        file.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard(self.0.clone())
    }
}

fn open_log_file(path: &Path) -> std::io::Result<SharedFile> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(SharedFile(Arc::new(Mutex::new(file))))
}

/// Opens the log file, or says on stderr why logs will be dropped.
fn log_file_or_warn(path: &Path) -> Option<SharedFile> {
    match open_log_file(path) {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!(
                "replan: cannot open log file {}: {}; logging disabled",
                path.display(),
                err
            );
            None
        }
    }
}

/// Installs the global subscriber once. `REPLAN_LOG` wins over `level`.
pub fn init_logging(target: LogTarget, level: Option<&str>) {
    TRACING_INIT.get_or_init(|| {
        let fallback = match level.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "info",
        };
        let make_filter = || {
            EnvFilter::try_from_env("REPLAN_LOG")
                .or_else(|_| EnvFilter::try_new(fallback))
                .unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let writer = match &target {
            LogTarget::File(path) => log_file_or_warn(path),
            _ => None,
        };

        match (&target, writer) {
            (LogTarget::File(_), Some(writer)) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(make_filter())
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(writer)
                    .try_init();
            }
            (LogTarget::Stderr, _) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(make_filter())
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .try_init();
            }
            _ => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(make_filter())
                    .with_writer(std::io::sink)
                    .try_init();
            }
        }

        tracing::debug!(?target, level = fallback, "logging initialized");
    });
}
