//! # Output Configuration
//!
//! Controls how `ply` decorates what it prints: markers and colours when the
//! terminal supports them, plain bracketed tags otherwise.
//!
//! The following are respected, in order:
//! - `--color=never|always|auto`
//! - `NO_COLOR` (any value disables colour)
//! - `CLICOLOR=0` disables, `CLICOLOR_FORCE=1` forces
//! - `TERM=dumb` disables
//!
//! ```rust,ignore
//! use plypatch::output::{marker, Marker, OutputConfig};
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! println!("{} Restored 3 patches", marker(&out, Marker::Ok));
//! ```

use std::env;

use console::Style;

use crate::working_repo::RepoStatus;

/// Output configuration for controlling colors and markers.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolves the `--color` flag value against the environment.
    ///
    /// `always` overrides `NO_COLOR`; anything other than `always`/`never`
    /// is treated as `auto`.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// Applies `style` to `text` when colours are enabled.
    pub fn paint(&self, style: &Style, text: &str) -> String {
        if self.use_color {
            style.apply_to(text).force_styling(true).to_string()
        } else {
            text.to_string()
        }
    }

    /// The status label, coloured by how much attention it needs.
    pub fn status_label(&self, status: RepoStatus) -> String {
        let style = match status {
            RepoStatus::Unlinked => Style::new().dim(),
            RepoStatus::NoPatchesApplied => Style::new().yellow(),
            RepoStatus::AllPatchesApplied => Style::new().green(),
            RepoStatus::RestoreInProgress => Style::new().red().bold(),
        };
        self.paint(&style, status.label())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Line prefixes used by the commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Ok,
    Error,
    Warning,
    Apply,
    Save,
}

/// The marker glyph when colours are enabled, a bracketed tag otherwise.
pub fn marker(config: &OutputConfig, marker: Marker) -> &'static str {
    let (fancy, plain) = match marker {
        Marker::Ok => ("✅", "[OK]"),
        Marker::Error => ("❌", "[ERR]"),
        Marker::Warning => ("⚠️", "[WARN]"),
        Marker::Apply => ("📥", "[APPLY]"),
        Marker::Save => ("💾", "[SAVE]"),
    };
    if config.use_color {
        fancy
    } else {
        plain
    }
}
