#[cfg(feature = "cli")]
use std::any::Any;
#[cfg(feature = "cli")]
use std::path::Path;

pub const LOG_FILE_BASENAME: &str = "raspored";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 5;

/// Log files sit next to the slot files. The returned handle must be kept alive
/// until exit so buffered lines get flushed.
#[cfg(feature = "cli")]
pub fn init_logging(
    config: &crate::config::Config,
) -> Result<flexi_logger::LoggerHandle, flexi_logger::FlexiLoggerError> {
    use flexi_logger::{
        detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode,
    };

    std::fs::create_dir_all(&config.data_dir)?;

    let handle = Logger::try_with_str(&config.log_spec)?
        .log_to_file(
            FileSpec::default()
                .directory(&config.data_dir)
                .basename(LOG_FILE_BASENAME)
                .suffix(LOG_FILE_SUFFIX),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
        )
        // The terminal only gets problems; command output goes to stdout.
        .duplicate_to_stderr(Duplicate::Warn)
        .start()?;

    install_panic_hook(&config.data_dir);

    log::debug!(
        "logger initialized version={} dir={} spec={}",
        env!("CARGO_PKG_VERSION"),
        config.data_dir.display(),
        config.log_spec
    );
    Ok(handle)
}

/// Logs a crash together with the slot directory the run was writing to, then
/// hands over to the default hook.
#[cfg(feature = "cli")]
fn install_panic_hook(data_dir: &Path) {
    let data_dir = data_dir.display().to_string();
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "?".to_string());
        log::error!(
            "raspored {} crashed at {location}: {} (data dir {data_dir})",
            env!("CARGO_PKG_VERSION"),
            panic_message(info.payload())
        );
        default_hook(info);
    }));
}

#[cfg(feature = "cli")]
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
