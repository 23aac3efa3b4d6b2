use std::fmt;

/// Metadata embedded by `build.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub hash: &'static str,
    pub status: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

pub const BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    hash: env!("BUDGET_PLOT_BUILD_HASH"),
    status: env!("BUDGET_PLOT_BUILD_STATUS"),
    timestamp: env!("BUDGET_PLOT_BUILD_TIMESTAMP"),
    target: env!("BUDGET_PLOT_BUILD_TARGET"),
    profile: env!("BUDGET_PLOT_BUILD_PROFILE"),
    rustc: env!("BUDGET_PLOT_BUILD_RUSTC"),
};

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "budget_plot {} ({} {})", self.version, self.hash, self.status)?;
        writeln!(f, "built:   {}", self.timestamp)?;
        writeln!(f, "target:  {} [{}]", self.target, self.profile)?;
        write!(f, "rustc:   {}", self.rustc)
    }
}
