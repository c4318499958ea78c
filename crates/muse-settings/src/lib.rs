//! # muse-settings
//!
//! Configuration management with layered sources for the Muse assistant.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`MuseSettings::default()`], including the
//!    built-in scoring rule table
//! 2. **User file** — `muse.toml` (missing file means defaults)
//! 3. **Environment variables** — `MUSE_*` overrides (highest priority)
//!
//! Out-of-range values are clamped with a warning rather than failing the
//! session; only an unreadable or syntactically invalid file is an error.
//!
//! # Usage
//!
//! ```no_run
//! use muse_settings::load_settings_from_path;
//!
//! let settings = load_settings_from_path(std::path::Path::new("muse.toml")).unwrap();
//! println!("score threshold: {}", settings.engine.threshold.initial);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{default_settings_path, load_settings_from_path};
pub use types::*;
