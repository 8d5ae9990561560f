#![deny(warnings)]
#![deny(clippy::unwrap_used)]

//! Demo command-line driver.
//!
//! Establishes a tunnel from environment settings and prints a recursive
//! scan of `SFTP_SCAN_DIR` as JSON. Authentication picks password mode when
//! `SFTP_PASSWORD` is set, key mode otherwise.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use dotenv::dotenv;
use tracing::info;

use sftp_tunnel::{get_tunnel, set_tunnel_by_keys, set_tunnel_by_password, TunnelError};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    // Initialize logging with proper tracing default
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().expect("valid directive")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error {}: {}", error.code(), error);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), TunnelError> {
    let host = env::var("SFTP_HOST")
        .map_err(|_| TunnelError::Configuration("SFTP_HOST not set".to_string()))?;
    let port: u16 = env::var("SFTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(22);
    let login = env::var("SFTP_LOGIN")
        .map_err(|_| TunnelError::Configuration("SFTP_LOGIN not set".to_string()))?;

    if let Ok(password) = env::var("SFTP_PASSWORD") {
        set_tunnel_by_password(&login, &password, &host, port).await?;
    } else {
        let public_key = PathBuf::from(env::var("SFTP_PUBLIC_KEY").unwrap_or_default());
        let private_key = PathBuf::from(env::var("SFTP_PRIVATE_KEY").unwrap_or_default());
        let passphrase = env::var("SFTP_PASSPHRASE").ok();
        set_tunnel_by_keys(
            &login,
            &public_key,
            &private_key,
            passphrase.as_deref(),
            &host,
            port,
        )
        .await?;
    }

    let scan_dir = env::var("SFTP_SCAN_DIR").unwrap_or_else(|_| "/".to_string());
    let tunnel = get_tunnel().await?;
    let units = tunnel.scan_filesystem(&scan_dir, true).await?;
    info!("{} entries under `{}`", units.len(), scan_dir);
    println!(
        "{}",
        serde_json::to_string_pretty(&units).expect("units serialize")
    );

    Ok(())
}
