//! Single-session SFTP tunnel: session lifecycle and filesystem operations.
//!
//! This module is organized into the following submodules:
//!
//! - `unit`: the remote filesystem entry model (files, directories, trees)
//! - `error`: the typed failure taxonomy with stable numeric codes
//! - `path`: remote path normalization
//! - `config`: configuration resolution with environment variable support
//! - `auth`: credential validation and SSH authentication
//! - `transport`: the seam to the russh/russh-sftp protocol crates
//! - `session`: the tunnel facade, process-wide slot, and operations

pub(crate) mod auth;
pub(crate) mod config;
pub mod error;
pub(crate) mod path;
pub mod session;
pub(crate) mod transport;
pub mod unit;

pub use error::TunnelError;
pub use session::{get_tunnel, set_tunnel_by_keys, set_tunnel_by_password, SessionTunnel};
pub use unit::{Directory, File, FilesystemUnit, UnitError};
