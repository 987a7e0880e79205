use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    Layer, Registry,
};

use crate::config::{LoggingConfig, Section};
use crate::paths::resolve_under;

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

// -------- level helpers --------

/// "off"/"none" disable a sink; unknown or empty values fall back to info.
fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// True if `target` is `name` itself or a module below it (`name::...`).
fn matches_target_prefix(target: &str, name: &str) -> bool {
    target
        .strip_prefix(name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn subsystems(cfg: &LoggingConfig) -> impl Iterator<Item = (&String, &Section)> {
    cfg.iter().filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
}

// -------- rotating file writer --------

#[derive(Clone)]
struct RotWriter {
    path: PathBuf,
    inner: Arc<Mutex<FileRotate<AppendCount>>>,
}

impl RotWriter {
    fn open(path: PathBuf, section: &Section) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
        let rot = FileRotate::new(
            &path,
            AppendCount::new(section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS)),
            ContentLimit::BytesSurpassed(max_bytes as usize),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self {
            path,
            inner: Arc::new(Mutex::new(rot)),
        })
    }
}

/// Write handle for one record; `None` swallows the bytes.
struct FileHandle(Option<Arc<Mutex<FileRotate<AppendCount>>>>);

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(file) => file
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(file) => file.lock().unwrap_or_else(PoisonError::into_inner).flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to per-subsystem files, falling back to the default file.
struct FileRouter {
    default: Option<RotWriter>,
    // Longest prefix first so nested subsystems win over their parents.
    by_prefix: Vec<(String, RotWriter)>,
}

impl FileRouter {
    fn build(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let default = cfg
            .get(DEFAULT_SECTION)
            .and_then(|section| open_section_file(DEFAULT_SECTION, section, base_dir));

        let mut by_prefix: Vec<(String, RotWriter)> = subsystems(cfg)
            .filter_map(|(name, section)| {
                open_section_file(name, section, base_dir).map(|w| (name.clone(), w))
            })
            .collect();
        by_prefix.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self { default, by_prefix }
    }

    fn resolve_for(&self, target: &str) -> Option<&RotWriter> {
        self.by_prefix
            .iter()
            .find(|(name, _)| matches_target_prefix(target, name))
            .map(|(_, w)| w)
            .or(self.default.as_ref())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = FileHandle;

    fn make_writer(&'a self) -> Self::Writer {
        FileHandle(self.default.as_ref().map(|w| w.inner.clone()))
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        FileHandle(self.resolve_for(meta.target()).map(|w| w.inner.clone()))
    }
}

fn open_section_file(name: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }
    let path = resolve_under(base_dir, section.file.trim());
    match RotWriter::open(path.clone(), section) {
        Ok(writer) => Some(writer),
        Err(e) => {
            // The subscriber is not up yet, so stderr is the only channel.
            eprintln!(
                "Failed to open log file for '{}': {} ({})",
                name,
                path.display(),
                e
            );
            None
        }
    }
}

// -------- filters --------

fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .map_or(LevelFilter::INFO, |s| parse_level(&s.console_level));

    subsystems(cfg).fold(Targets::new().with_default(default), |targets, (name, s)| {
        targets.with_target(name.clone(), parse_level(&s.console_level))
    })
}

fn file_targets(cfg: &LoggingConfig, router: &FileRouter) -> Targets {
    let has_default_file = router.default.is_some();
    let default = match cfg.get(DEFAULT_SECTION) {
        Some(s) if has_default_file => parse_level(&s.file_level),
        _ => LevelFilter::OFF,
    };

    subsystems(cfg).fold(Targets::new().with_default(default), |targets, (name, s)| {
        let has_file = !s.file.trim().is_empty() || has_default_file;
        let level = if has_file {
            parse_level(&s.file_level)
        } else {
            LevelFilter::OFF
        };
        targets.with_target(name.clone(), level)
    })
}

// -------- public init --------

/// Install the global subscriber.
///
/// Console output is human-readable; files receive JSON lines. Relative file
/// paths are resolved against `base_dir` (normally `server.home_dir`). An
/// empty config yields console logging at info. Calling this twice is a no-op.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` records before the subscriber goes live
    let _ = tracing_log::LogTracer::init();

    let console_layer = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = FileRouter::build(cfg, base_dir);
    let file_layer = if router.is_empty() {
        None
    } else {
        let targets = file_targets(cfg, &router);
        Some(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(router)
                .with_filter(targets),
        )
    };

    let subscriber = Registry::default().with(console_layer).with(file_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use std::fs;
    use tempfile::tempdir;
    use tracing::Level;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(parse_level("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level(" Info "), LevelFilter::INFO);
        assert_eq!(parse_level("warn"), LevelFilter::WARN);
        assert_eq!(parse_level("ERROR"), LevelFilter::ERROR);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("none"), LevelFilter::OFF);
        assert_eq!(parse_level("loud"), LevelFilter::INFO);
        assert_eq!(parse_level(""), LevelFilter::INFO);
    }

    #[test]
    fn test_target_prefix_matching() {
        assert!(matches_target_prefix("roster", "roster"));
        assert!(matches_target_prefix("roster::domain::service", "roster"));
        assert!(!matches_target_prefix("roster_server", "roster"));
        assert!(!matches_target_prefix("sea_orm", "roster"));
    }

    #[test]
    fn test_console_targets_per_subsystem() {
        let mut cfg = default_logging_config();
        cfg.insert("sea_orm".into(), section("warn", "", ""));
        cfg.insert("roster".into(), section("debug", "", ""));

        let targets = console_targets(&cfg);

        assert!(targets.would_enable("tower_http::trace", &Level::INFO));
        assert!(!targets.would_enable("tower_http::trace", &Level::DEBUG));
        assert!(targets.would_enable("roster::domain", &Level::DEBUG));
        assert!(!targets.would_enable("sea_orm::driver", &Level::INFO));
        assert!(targets.would_enable("sea_orm::driver", &Level::WARN));
    }

    #[test]
    fn test_console_defaults_to_info_without_default_section() {
        let targets = console_targets(&LoggingConfig::new());
        assert!(targets.would_enable("anything", &Level::INFO));
        assert!(!targets.would_enable("anything", &Level::DEBUG));
    }

    #[test]
    fn test_file_router_resolves_under_base_dir() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert("sea_orm".into(), section("info", "logs/sql.log", "debug"));
        cfg.insert(
            "sea_orm::migration".into(),
            section("info", "logs/migrations.log", "info"),
        );
        cfg.insert("roster".into(), section("info", "", "trace"));

        let router = FileRouter::build(&cfg, tmp.path());

        let path_for = |target: &str| router.resolve_for(target).map(|w| w.path.clone());
        assert_eq!(path_for("roster::api"), Some(tmp.path().join("logs/roster.log")));
        assert_eq!(path_for("sea_orm::driver"), Some(tmp.path().join("logs/sql.log")));
        assert_eq!(
            path_for("sea_orm::migration::runner"),
            Some(tmp.path().join("logs/migrations.log"))
        );
        assert!(tmp.path().join("logs").is_dir());
    }

    #[test]
    fn test_file_handle_writes_to_file() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert(DEFAULT_SECTION.into(), section("info", "out/app.log", "debug"));
        let router = FileRouter::build(&cfg, tmp.path());

        let mut handle = fmt::MakeWriter::make_writer(&router);
        handle.write_all(b"{\"message\":\"hello\"}\n").unwrap();
        handle.flush().unwrap();

        let written = fs::read_to_string(tmp.path().join("out/app.log")).unwrap();
        assert!(written.contains("hello"));
    }

    #[test]
    fn test_no_files_means_empty_router_and_silent_file_targets() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert(DEFAULT_SECTION.into(), section("info", "", "debug"));
        cfg.insert("roster".into(), section("debug", "", "debug"));

        let router = FileRouter::build(&cfg, tmp.path());
        assert!(router.is_empty());

        let targets = file_targets(&cfg, &router);
        assert!(!targets.would_enable("roster", &Level::ERROR));
        assert!(!targets.would_enable("other", &Level::ERROR));

        let mut handle = FileHandle(None);
        assert_eq!(handle.write(b"dropped").unwrap(), 7);
    }

    #[test]
    fn test_file_targets_follow_section_levels() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert(DEFAULT_SECTION.into(), section("info", "logs/roster.log", "warn"));
        cfg.insert("roster".into(), section("info", "", "debug"));
        cfg.insert("sea_orm".into(), section("info", "", "off"));

        let router = FileRouter::build(&cfg, tmp.path());
        let targets = file_targets(&cfg, &router);

        assert!(targets.would_enable("roster::domain", &Level::DEBUG));
        assert!(!targets.would_enable("sea_orm", &Level::ERROR));
        assert!(targets.would_enable("hyper", &Level::WARN));
        assert!(!targets.would_enable("hyper", &Level::INFO));
    }
}
