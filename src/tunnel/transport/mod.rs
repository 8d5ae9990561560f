//! Transport seam between the tunnel facade and the protocol crates.
//!
//! The facade never talks to `russh`/`russh-sftp` directly; it goes through
//! the [`RemoteFs`] and [`RemoteStream`] traits. This keeps wire-level
//! concerns in one place and lets tests drive the operations against an
//! in-memory implementation.
//!
//! Errors at this seam are transport-level messages; the facade maps them
//! into the typed [`TunnelError`](super::error::TunnelError) kinds together
//! with path context.

pub(crate) mod sftp;

use async_trait::async_trait;

/// One entry of a remote directory listing.
///
/// Listings may include the `.` and `..` pseudo-entries when the server
/// reports them; the facade filters them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub is_directory: bool,
}

/// Result of a remote stat for an existing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteStat {
    pub is_directory: bool,
    pub size: u64,
}

/// Access mode for [`RemoteFs::open_stream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    Read,
    /// Truncates an existing file, creates a missing one.
    Write,
}

/// Remote filesystem capability the tunnel requires from its transport.
#[async_trait]
pub trait RemoteFs: Send + Sync {
    /// List the entries directly under `path`.
    async fn list_directory(&self, path: &str) -> Result<Vec<RemoteEntry>, String>;

    /// Stat `path`; `Ok(None)` means the path does not exist.
    async fn stat(&self, path: &str) -> Result<Option<RemoteStat>, String>;

    /// Open a byte stream over the file at `path`.
    async fn open_stream(
        &self,
        path: &str,
        mode: StreamMode,
    ) -> Result<Box<dyn RemoteStream>, String>;

    /// Create a directory with the given permission bits. When `recursive`,
    /// missing ancestor directories are created as well.
    async fn mkdir(&self, path: &str, mode: u32, recursive: bool) -> Result<(), String>;

    /// Remove an empty directory.
    async fn rmdir(&self, path: &str) -> Result<(), String>;

    /// Remove a file.
    async fn unlink(&self, path: &str) -> Result<(), String>;

    /// Best-effort teardown of the underlying session; errors are ignored.
    async fn disconnect(&self);
}

/// A stream over one remote file, scoped to a single operation. The opener
/// must call [`close`](RemoteStream::close) on every exit path.
#[async_trait]
pub trait RemoteStream: Send {
    /// Read the whole file. `expected_len` is the stat-reported size and is
    /// used for buffer sizing only; the caller verifies the byte count.
    async fn read_to_end(&mut self, expected_len: u64) -> Result<Vec<u8>, String>;

    /// Write all bytes to the stream.
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), String>;

    /// Flush and close the stream.
    async fn close(&mut self) -> Result<(), String>;
}
