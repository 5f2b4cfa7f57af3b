//! Default config file location.
//!
//! Uses the `dirs` crate to resolve the platform config directory:
//! - Linux:   `~/.config/sftp-idp/gateway.toml`
//! - Windows: `%APPDATA%\sftp-idp\gateway.toml`
//! - macOS:   `~/Library/Application Support/sftp-idp/gateway.toml`

use std::path::PathBuf;

/// Path of the default gateway config file, if a config directory exists.
///
/// The file itself may not exist; callers only read it when it does.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("sftp-idp").join("gateway.toml"))
}
