//! Typed failures for tunnel establishment and filesystem operations.
//!
//! Every operation reports its failure as one of these kinds; nothing is
//! retried and nothing is collapsed into a generic error. The presentation
//! layer renders the `Display` message together with the stable numeric
//! [`code`](TunnelError::code).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::unit::UnitError;

#[derive(Error, Debug)]
pub enum TunnelError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("key file `{0}` does not exist or is not a regular file")]
    KeyFile(PathBuf),

    #[error("address `{host}:{port}` offline")]
    HostUnreachable { host: String, port: u16 },

    #[error("could not connect to {host} on port {port}: {message}")]
    Connection {
        host: String,
        port: u16,
        message: String,
    },

    #[error("{0}")]
    Authentication(String),

    #[error("could not initialize SFTP subsystem: {0}")]
    Subsystem(String),

    #[error("tunnel not set, use `set_tunnel_by_password` or `set_tunnel_by_keys`")]
    NotInitialized,

    #[error(transparent)]
    InvalidUnit(#[from] UnitError),

    #[error("could not read directory `{path}`: {message}")]
    Listing { path: String, message: String },

    #[error("could not find local file `{0}` for sending")]
    LocalFileNotFound(PathBuf),

    #[error("could not read local file `{path}`")]
    LocalFileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write local file `{path}`")]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not open remote file `{path}` for writing: {message}")]
    RemoteWriteOpen { path: String, message: String },

    #[error("could not send file data to `{path}`: {message}")]
    RemoteWrite { path: String, message: String },

    #[error("file `{0}` was sent but not observed afterwards")]
    WriteVerification(String),

    #[error("could not open remote file `{path}` for reading: {message}")]
    RemoteReadOpen { path: String, message: String },

    #[error("failed to read remote file `{path}`: {message}")]
    RemoteRead { path: String, message: String },

    #[error("remote file or directory `{0}` already exists")]
    AlreadyExists(String),

    #[error("could not create remote directory `{path}`: {message}")]
    DirectoryCreate { path: String, message: String },

    #[error("remote directory `{0}` was not observed after creation")]
    DirectoryVerification(String),

    #[error("remote file `{0}` does not exist")]
    RemoteFileNotFound(String),

    #[error("remote directory `{0}` does not exist")]
    RemoteDirectoryNotFound(String),

    #[error("remote path `{0}` is a directory")]
    IsADirectory(String),

    #[error("remote path `{0}` is not a directory")]
    NotADirectory(String),

    #[error("remote directory `{0}` contains directories or files")]
    DirectoryNotEmpty(String),

    #[error("could not delete `{path}`: {message}")]
    Delete { path: String, message: String },
}

impl TunnelError {
    /// Stable numeric code for the presentation layer.
    pub fn code(&self) -> u16 {
        match self {
            TunnelError::NotInitialized
            | TunnelError::InvalidUnit(_)
            | TunnelError::DirectoryCreate { .. } => 400,
            TunnelError::InvalidCredentials(_) | TunnelError::KeyFile(_) => 401,
            TunnelError::Authentication(_)
            | TunnelError::LocalFileRead { .. }
            | TunnelError::RemoteWriteOpen { .. }
            | TunnelError::RemoteWrite { .. }
            | TunnelError::RemoteReadOpen { .. } => 403,
            TunnelError::Connection { .. }
            | TunnelError::LocalFileNotFound(_)
            | TunnelError::RemoteFileNotFound(_)
            | TunnelError::RemoteDirectoryNotFound(_) => 404,
            TunnelError::HostUnreachable { .. } => 405,
            TunnelError::Configuration(_) => 406,
            TunnelError::AlreadyExists(_)
            | TunnelError::IsADirectory(_)
            | TunnelError::NotADirectory(_)
            | TunnelError::DirectoryNotEmpty(_) => 409,
            TunnelError::Subsystem(_) | TunnelError::Listing { .. } => 422,
            TunnelError::WriteVerification(_)
            | TunnelError::DirectoryVerification(_)
            | TunnelError::RemoteRead { .. }
            | TunnelError::LocalWrite { .. }
            | TunnelError::Delete { .. } => 500,
        }
    }
}
