//! Log output setup.

use std::{path::Path, sync::Once};

static INIT: Once = Once::new();

/// Installs the global logger. Only the first call has any effect.
///
/// Lines look like `[12:34:56.789 INFO scenelab::lessons] message` and go to stdout, plus
/// `file` when given. A log file that cannot be opened is reported on stdout and skipped.
pub fn init(level: log::LevelFilter, file: Option<&Path>) {
    INIT.call_once(|| {
        let mut dispatch = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {} {}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(level)
            // SDL and GL loaders are chatty below warn.
            .level_for("sdl2", log::LevelFilter::Warn)
            .chain(std::io::stdout());

        let mut file_error = None;
        if let Some(path) = file {
            match fern::log_file(path) {
                Ok(file) => dispatch = dispatch.chain(file),
                Err(e) => file_error = Some(format!("Could not open log file {}: {e}", path.display())),
            }
        }

        if let Err(e) = dispatch.apply() {
            eprintln!("Logger already installed: {e}");
            return;
        }
        if let Some(message) = file_error {
            log::warn!("{message}");
        }
        log::debug!("Logging initialized at {level}");
    });
}
