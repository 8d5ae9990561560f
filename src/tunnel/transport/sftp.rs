//! russh-backed transport: reachability probe, SSH handshake, SFTP subsystem.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::{client, keys};
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::{FileAttributes, OpenFlags};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::tunnel::auth::Credentials;
use crate::tunnel::config;
use crate::tunnel::error::TunnelError;

use super::{RemoteEntry, RemoteFs, RemoteStat, RemoteStream, StreamMode};

/// Client handler that accepts all host keys.
///
/// This matches `StrictHostKeyChecking=no`; deployments that need host key
/// pinning should front the tunnel with a known_hosts check.
pub struct ClientHandler;

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Build the russh client configuration.
///
/// No inactivity timeout: the session lives until it is replaced or the
/// process exits. Keepalives detect a dead peer in the meantime.
fn build_client_config() -> Arc<client::Config> {
    Arc::new(client::Config {
        inactivity_timeout: None,
        keepalive_interval: Some(Duration::from_secs(30)),
        keepalive_max: 3,
        ..Default::default()
    })
}

/// Cheap reachability pre-check before the heavier protocol handshake.
async fn probe(host: &str, port: u16, timeout: Duration) -> Result<(), TunnelError> {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(error)) => {
            debug!("probe of {}:{} failed: {}", host, port, error);
            Err(TunnelError::HostUnreachable {
                host: host.to_string(),
                port,
            })
        }
        Err(_) => {
            debug!("probe of {}:{} timed out after {:?}", host, port, timeout);
            Err(TunnelError::HostUnreachable {
                host: host.to_string(),
                port,
            })
        }
    }
}

/// Establish the full transport: probe, handshake, authentication, SFTP
/// subsystem.
pub(crate) async fn establish(
    credentials: &Credentials,
    host: &str,
    port: u16,
) -> Result<SftpTransport, TunnelError> {
    let probe_timeout = Duration::from_secs(config::resolve_probe_timeout(None));
    probe(host, port, probe_timeout).await?;

    let mut handle = client::connect(build_client_config(), (host, port), ClientHandler)
        .await
        .map_err(|error| TunnelError::Connection {
            host: host.to_string(),
            port,
            message: error.to_string(),
        })?;

    credentials.validate()?;
    credentials.authenticate(&mut handle).await?;

    let channel = handle
        .channel_open_session()
        .await
        .map_err(|error| TunnelError::Subsystem(error.to_string()))?;
    channel
        .request_subsystem(true, "sftp")
        .await
        .map_err(|error| TunnelError::Subsystem(error.to_string()))?;
    let sftp = SftpSession::new(channel.into_stream())
        .await
        .map_err(|error| TunnelError::Subsystem(error.to_string()))?;

    info!("SFTP subsystem ready on {}:{}", host, port);
    Ok(SftpTransport { handle, sftp })
}

/// [`RemoteFs`] over an authenticated russh session.
pub(crate) struct SftpTransport {
    handle: client::Handle<ClientHandler>,
    sftp: SftpSession,
}

impl SftpTransport {
    /// Missing-path stat errors fold to "absent"; everything else is a
    /// transport failure.
    fn absent_or_error(error: russh_sftp::client::error::Error) -> Result<Option<RemoteStat>, String> {
        let message = error.to_string();
        if message.contains("No such file") || message.contains("not found") {
            Ok(None)
        } else {
            Err(message)
        }
    }
}

#[async_trait]
impl RemoteFs for SftpTransport {
    async fn list_directory(&self, path: &str) -> Result<Vec<RemoteEntry>, String> {
        let read_dir = self
            .sftp
            .read_dir(path)
            .await
            .map_err(|error| error.to_string())?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let is_directory = entry.metadata().is_dir();
            entries.push(RemoteEntry {
                name: entry.file_name(),
                is_directory,
            });
        }
        debug!("listed {} entries in {}", entries.len(), path);
        Ok(entries)
    }

    async fn stat(&self, path: &str) -> Result<Option<RemoteStat>, String> {
        match self.sftp.metadata(path).await {
            Ok(attributes) => Ok(Some(RemoteStat {
                is_directory: attributes.is_dir(),
                size: attributes.size.unwrap_or(0),
            })),
            Err(error) => Self::absent_or_error(error),
        }
    }

    async fn open_stream(
        &self,
        path: &str,
        mode: StreamMode,
    ) -> Result<Box<dyn RemoteStream>, String> {
        let flags = match mode {
            StreamMode::Read => OpenFlags::READ,
            StreamMode::Write => OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
        };
        let file = self
            .sftp
            .open_with_flags(path, flags)
            .await
            .map_err(|error| error.to_string())?;
        Ok(Box::new(SftpStream { file }))
    }

    async fn mkdir(&self, path: &str, mode: u32, recursive: bool) -> Result<(), String> {
        if recursive {
            // Create missing ancestors one component at a time; an ancestor
            // that already exists is left alone.
            let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
            let mut prefix = String::new();
            if let Some((_, ancestors)) = components.split_last() {
                for component in ancestors {
                    prefix.push('/');
                    prefix.push_str(component);
                    if self.sftp.metadata(prefix.as_str()).await.is_err() {
                        self.sftp
                            .create_dir(prefix.as_str())
                            .await
                            .map_err(|error| error.to_string())?;
                    }
                }
            }
        }

        self.sftp
            .create_dir(path)
            .await
            .map_err(|error| error.to_string())?;

        let attributes = FileAttributes {
            permissions: Some(mode),
            ..Default::default()
        };
        self.sftp
            .set_metadata(path, attributes)
            .await
            .map_err(|error| error.to_string())
    }

    async fn rmdir(&self, path: &str) -> Result<(), String> {
        self.sftp
            .remove_dir(path)
            .await
            .map_err(|error| error.to_string())
    }

    async fn unlink(&self, path: &str) -> Result<(), String> {
        self.sftp
            .remove_file(path)
            .await
            .map_err(|error| error.to_string())
    }

    async fn disconnect(&self) {
        if let Err(error) = self
            .handle
            .disconnect(russh::Disconnect::ByApplication, "", "English")
            .await
        {
            debug!("disconnect failed: {}", error);
        }
    }
}

/// A stream over one remote file handle.
struct SftpStream {
    file: russh_sftp::client::fs::File,
}

#[async_trait]
impl RemoteStream for SftpStream {
    async fn read_to_end(&mut self, expected_len: u64) -> Result<Vec<u8>, String> {
        let mut bytes = Vec::with_capacity(expected_len as usize);
        self.file
            .read_to_end(&mut bytes)
            .await
            .map_err(|error| error.to_string())?;
        Ok(bytes)
    }

    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), String> {
        self.file
            .write_all(bytes)
            .await
            .map_err(|error| error.to_string())?;
        self.file.flush().await.map_err(|error| error.to_string())
    }

    async fn close(&mut self) -> Result<(), String> {
        self.file
            .shutdown()
            .await
            .map_err(|error| error.to_string())
    }
}
