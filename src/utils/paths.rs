use dirs::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".budget_plot";
const CONFIG_FILE: &str = "config.json";
pub const HOME_ENV: &str = "BUDGET_PLOT_HOME";

/// Application data directory, `$BUDGET_PLOT_HOME` or `~/.budget_plot`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// `<dir>/<stem><suffix>` for a report written next to its definition.
pub fn sibling_output(definition: &Path, suffix: &str) -> PathBuf {
    let stem = definition
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "budget".to_string());
    definition.with_file_name(format!("{stem}{suffix}"))
}
