//! Well-known locations under the Tally home directory.

use std::path::{Path, PathBuf};
use std::sync::Once;

static MKDIR_WARNING: Once = Once::new();

/// `$TALLY_HOME`, else `~/.tally`, else `./.tally` when no home is known.
pub fn tally_home() -> PathBuf {
    if let Some(explicit) = std::env::var_os("TALLY_HOME") {
        return PathBuf::from(explicit);
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tally")
}

/// Entry under the home directory, creating the home first when `create` is
/// set. A failed mkdir is reported once and otherwise ignored; opening the
/// file later surfaces the real error.
fn in_home(name: &str, create: bool) -> PathBuf {
    let home = tally_home();
    if create {
        ensure_dir(&home);
    }
    home.join(name)
}

fn ensure_dir(dir: &Path) {
    if let Err(err) = std::fs::create_dir_all(dir) {
        MKDIR_WARNING.call_once(|| {
            eprintln!(
                "Warning: cannot create {} ({}); set TALLY_HOME or pass --database",
                dir.display(),
                err
            );
        });
    }
}

pub fn default_registry_path() -> PathBuf {
    in_home("registry.sqlite", true)
}

pub fn default_config_path() -> PathBuf {
    in_home("config.toml", false)
}

pub fn default_logs_dir() -> PathBuf {
    in_home("logs", true)
}
