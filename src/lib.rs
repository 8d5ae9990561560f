//! Single-session SFTP client facade.
//!
//! One authenticated SSH/SFTP session per process, established with
//! [`set_tunnel_by_password`] or [`set_tunnel_by_keys`] and read back with
//! [`get_tunnel`]. The tunnel exposes listing, upload, download, delete and
//! directory create/delete operations, modeling remote entries as a typed
//! tree of [`FilesystemUnit`] values. Wire-level SSH/SFTP is delegated to
//! `russh` and `russh-sftp`.
//!
//! ```ignore
//! use sftp_tunnel::{get_tunnel, set_tunnel_by_password};
//!
//! set_tunnel_by_password("ftp_user", "password", "192.168.0.166", 22).await?;
//! let tunnel = get_tunnel().await?;
//! for unit in tunnel.scan_filesystem("/home/ftp_user", true).await? {
//!     println!("{} {}/{}", unit.is_directory(), unit.path(), unit.name());
//! }
//! ```

pub mod tunnel;

pub use tunnel::error::TunnelError;
pub use tunnel::session::{get_tunnel, set_tunnel_by_keys, set_tunnel_by_password, SessionTunnel};
pub use tunnel::unit::{Directory, File, FilesystemUnit, UnitError};
