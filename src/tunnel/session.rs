//! The tunnel facade: process-wide session and filesystem operations.
//!
//! One tunnel exists per process. [`set_tunnel_by_password`] and
//! [`set_tunnel_by_keys`] are the only ways to obtain a usable tunnel;
//! establishing a new one first tears down (best-effort) any previous
//! instance. [`get_tunnel`] hands out the active instance for the
//! filesystem operations on [`SessionTunnel`].
//!
//! Every operation runs to completion or failure before returning; there
//! is no background work and no automatic retry. Remote paths are
//! normalized (see [`super::path`]) before they reach the transport.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::auth::Credentials;
use super::error::TunnelError;
use super::path;
use super::transport::sftp;
use super::transport::{RemoteFs, RemoteStat, RemoteStream, StreamMode};
use super::unit::{order_units, Directory, File, FilesystemUnit};

/// Holder for the process-wide tunnel.
///
/// Instantiable so slot semantics stay testable; the process uses the
/// single [`ACTIVE_TUNNEL`] instance.
pub(crate) struct TunnelSlot {
    inner: RwLock<Option<Arc<SessionTunnel>>>,
}

impl TunnelSlot {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Disconnect (best-effort) and drop the current tunnel, if any.
    pub(crate) async fn teardown(&self) {
        let mut slot = self.inner.write().await;
        if let Some(previous) = slot.take() {
            debug!("disconnecting superseded tunnel");
            previous.remote.disconnect().await;
        }
    }

    /// Install a new tunnel, disconnecting any still-present one first.
    pub(crate) async fn install(&self, tunnel: SessionTunnel) {
        let mut slot = self.inner.write().await;
        if let Some(previous) = slot.take() {
            debug!("disconnecting superseded tunnel");
            previous.remote.disconnect().await;
        }
        *slot = Some(Arc::new(tunnel));
    }

    pub(crate) async fn get(&self) -> Result<Arc<SessionTunnel>, TunnelError> {
        self.inner
            .read()
            .await
            .clone()
            .ok_or(TunnelError::NotInitialized)
    }
}

static ACTIVE_TUNNEL: Lazy<TunnelSlot> = Lazy::new(TunnelSlot::new);

/// Establish a password-authenticated tunnel and install it process-wide.
///
/// An already-installed tunnel is disconnected (best-effort) and replaced.
pub async fn set_tunnel_by_password(
    login: &str,
    password: &str,
    host: &str,
    port: u16,
) -> Result<(), TunnelError> {
    set_tunnel(
        Credentials::Password {
            login: login.to_string(),
            password: password.to_string(),
        },
        host,
        port,
    )
    .await
}

/// Establish a key-authenticated tunnel and install it process-wide.
///
/// `passphrase` may be `None` for an unencrypted private key. An
/// already-installed tunnel is disconnected (best-effort) and replaced.
pub async fn set_tunnel_by_keys(
    login: &str,
    public_key: &Path,
    private_key: &Path,
    passphrase: Option<&str>,
    host: &str,
    port: u16,
) -> Result<(), TunnelError> {
    set_tunnel(
        Credentials::KeyPair {
            login: login.to_string(),
            public_key: public_key.to_path_buf(),
            private_key: private_key.to_path_buf(),
            passphrase: passphrase.map(str::to_string),
        },
        host,
        port,
    )
    .await
}

async fn set_tunnel(credentials: Credentials, host: &str, port: u16) -> Result<(), TunnelError> {
    ACTIVE_TUNNEL.teardown().await;

    if host.is_empty() {
        return Err(TunnelError::Configuration("empty host".to_string()));
    }

    info!(
        "establishing {} tunnel to {}:{} as `{}`",
        credentials.method(),
        host,
        port,
        credentials.login()
    );
    let transport = sftp::establish(&credentials, host, port).await?;
    ACTIVE_TUNNEL.install(SessionTunnel::new(Box::new(transport))).await;
    Ok(())
}

/// Get the active tunnel.
pub async fn get_tunnel() -> Result<Arc<SessionTunnel>, TunnelError> {
    ACTIVE_TUNNEL.get().await
}

/// Streams are released on every exit path; a close failure is logged,
/// never propagated.
async fn close_quietly(stream: &mut dyn RemoteStream) {
    if let Err(message) = stream.close().await {
        debug!("closing remote stream: {}", message);
    }
}

/// One authenticated SFTP session.
pub struct SessionTunnel {
    remote: Box<dyn RemoteFs>,
}

impl std::fmt::Debug for SessionTunnel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTunnel").finish_non_exhaustive()
    }
}

impl SessionTunnel {
    pub(crate) fn new(remote: Box<dyn RemoteFs>) -> Self {
        Self { remote }
    }

    /// Stat that folds transport failures into "not observed". The caller
    /// turns an unexpected absence into its own typed error, so a broken
    /// transport still surfaces on the next step.
    async fn observe(&self, path: &str) -> Option<RemoteStat> {
        match self.remote.stat(path).await {
            Ok(stat) => stat,
            Err(message) => {
                debug!("stat of `{}` failed: {}", path, message);
                None
            }
        }
    }

    /// List `directory`, optionally descending into subdirectories.
    ///
    /// Directories come first, then files, each group sorted by name
    /// ascending. When `recursive`, each directory unit carries its nested
    /// units, built depth-first.
    pub async fn scan_filesystem(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<FilesystemUnit>, TunnelError> {
        let directory = path::normalize(directory);
        let entries = self
            .remote
            .list_directory(&directory)
            .await
            .map_err(|message| TunnelError::Listing {
                path: directory.clone(),
                message,
            })?;

        let mut units = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.name == "." || entry.name == ".." {
                continue;
            }
            if entry.is_directory {
                let contained = if recursive {
                    Box::pin(self.scan_filesystem(&format!("{}/{}", directory, entry.name), true))
                        .await?
                } else {
                    Vec::new()
                };
                units.push(Directory::new(&directory, &entry.name, contained)?.into());
            } else {
                units.push(File::new(&directory, &entry.name)?.into());
            }
        }
        Ok(order_units(units))
    }

    /// Upload a local file to `remote_file`.
    pub async fn upload_file(
        &self,
        local_file: &Path,
        remote_file: &str,
    ) -> Result<File, TunnelError> {
        match tokio::fs::metadata(local_file).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => return Err(TunnelError::LocalFileNotFound(local_file.to_path_buf())),
        }
        let data = tokio::fs::read(local_file)
            .await
            .map_err(|source| TunnelError::LocalFileRead {
                path: local_file.to_path_buf(),
                source,
            })?;

        self.upload_file_data(&data, remote_file).await
    }

    /// Upload a byte payload to `remote_file`, truncating/creating it.
    ///
    /// After the stream is closed the path is re-statted; a file that is
    /// not observable afterwards is reported as a verification failure
    /// (guards against silently truncated writes).
    pub async fn upload_file_data(
        &self,
        data: &[u8],
        remote_file: &str,
    ) -> Result<File, TunnelError> {
        let remote_file = path::normalize(remote_file);

        let mut stream = self
            .remote
            .open_stream(&remote_file, StreamMode::Write)
            .await
            .map_err(|message| TunnelError::RemoteWriteOpen {
                path: remote_file.clone(),
                message,
            })?;
        if let Err(message) = stream.write_all(data).await {
            close_quietly(stream.as_mut()).await;
            return Err(TunnelError::RemoteWrite {
                path: remote_file,
                message,
            });
        }
        close_quietly(stream.as_mut()).await;

        if self.observe(&remote_file).await.is_none() {
            return Err(TunnelError::WriteVerification(remote_file));
        }

        info!("uploaded {} bytes to `{}`", data.len(), remote_file);
        let (parent, name) = path::split(&remote_file);
        Ok(File::new(parent, name)?)
    }

    /// Create `remote_directory` with the given permission bits.
    ///
    /// Fails when anything already exists at the path, regardless of
    /// `recursive`. When `recursive`, missing ancestors are created.
    pub async fn create_directory(
        &self,
        remote_directory: &str,
        mode: u32,
        recursive: bool,
    ) -> Result<Directory, TunnelError> {
        let remote_directory = path::normalize(remote_directory);

        if self.observe(&remote_directory).await.is_some() {
            return Err(TunnelError::AlreadyExists(remote_directory));
        }
        self.remote
            .mkdir(&remote_directory, mode, recursive)
            .await
            .map_err(|message| TunnelError::DirectoryCreate {
                path: remote_directory.clone(),
                message,
            })?;
        match self.observe(&remote_directory).await {
            Some(stat) if stat.is_directory => {}
            _ => return Err(TunnelError::DirectoryVerification(remote_directory)),
        }

        info!("created remote directory `{}`", remote_directory);
        let (parent, name) = path::split(&remote_directory);
        Ok(Directory::new(parent, name, Vec::new())?)
    }

    /// Shared download step: returns the normalized path and the bytes.
    async fn download_content(&self, remote_file: &str) -> Result<(String, Vec<u8>), TunnelError> {
        let remote_file = path::normalize(remote_file);

        let stat = self
            .observe(&remote_file)
            .await
            .ok_or_else(|| TunnelError::RemoteFileNotFound(remote_file.clone()))?;
        if stat.is_directory {
            return Err(TunnelError::IsADirectory(remote_file));
        }

        let mut stream = self
            .remote
            .open_stream(&remote_file, StreamMode::Read)
            .await
            .map_err(|message| TunnelError::RemoteReadOpen {
                path: remote_file.clone(),
                message,
            })?;
        let result = stream.read_to_end(stat.size).await;
        close_quietly(stream.as_mut()).await;

        let data = result.map_err(|message| TunnelError::RemoteRead {
            path: remote_file.clone(),
            message,
        })?;
        if data.len() as u64 != stat.size {
            return Err(TunnelError::RemoteRead {
                path: remote_file,
                message: format!("expected {} bytes, read {}", stat.size, data.len()),
            });
        }
        Ok((remote_file, data))
    }

    /// Download `remote_file` and return its bytes.
    pub async fn download_file_data(&self, remote_file: &str) -> Result<Vec<u8>, TunnelError> {
        let (_, data) = self.download_content(remote_file).await?;
        Ok(data)
    }

    /// Download `remote_file` into `local_file`; returns a unit describing
    /// the remote source.
    pub async fn download_file(
        &self,
        remote_file: &str,
        local_file: &Path,
    ) -> Result<File, TunnelError> {
        let (remote_file, data) = self.download_content(remote_file).await?;
        tokio::fs::write(local_file, &data)
            .await
            .map_err(|source| TunnelError::LocalWrite {
                path: local_file.to_path_buf(),
                source,
            })?;

        info!("downloaded `{}` to `{}`", remote_file, local_file.display());
        let (parent, name) = path::split(&remote_file);
        Ok(File::new(parent, name)?)
    }

    /// Delete the remote file at `remote_file`.
    pub async fn delete_file(&self, remote_file: &str) -> Result<(), TunnelError> {
        let remote_file = path::normalize(remote_file);

        let stat = self
            .observe(&remote_file)
            .await
            .ok_or_else(|| TunnelError::RemoteFileNotFound(remote_file.clone()))?;
        if stat.is_directory {
            return Err(TunnelError::IsADirectory(remote_file));
        }

        self.remote
            .unlink(&remote_file)
            .await
            .map_err(|message| TunnelError::Delete {
                path: remote_file,
                message,
            })
    }

    /// Delete the empty remote directory at `remote_directory`.
    ///
    /// The directory must have been emptied by the caller first; there is
    /// no cascading delete.
    pub async fn delete_directory(&self, remote_directory: &str) -> Result<(), TunnelError> {
        let remote_directory = path::normalize(remote_directory);

        let stat = self
            .observe(&remote_directory)
            .await
            .ok_or_else(|| TunnelError::RemoteDirectoryNotFound(remote_directory.clone()))?;
        if !stat.is_directory {
            return Err(TunnelError::NotADirectory(remote_directory));
        }
        if !self
            .scan_filesystem(&remote_directory, false)
            .await?
            .is_empty()
        {
            return Err(TunnelError::DirectoryNotEmpty(remote_directory));
        }

        self.remote
            .rmdir(&remote_directory)
            .await
            .map_err(|message| TunnelError::Delete {
                path: remote_directory,
                message,
            })
    }
}
