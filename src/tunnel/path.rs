//! Remote path handling.
//!
//! Remote SFTP paths always use `/` regardless of either side's OS. Every
//! path accepted by a tunnel operation goes through [`normalize`] before it
//! reaches the transport.

/// Normalize a remote path: prefix `/`, then collapse doubled slashes in a
/// single left-to-right pass.
///
/// The single pass is deliberate: runs of three or more slashes are not
/// fully collapsed (`a///b` becomes `/a//b`). Callers depend on the exact
/// one-pass behavior, so it must not be "fixed" into a recursive collapse.
pub(crate) fn normalize(path: &str) -> String {
    format!("/{path}").replace("//", "/")
}

/// Split a normalized path into (parent directory, entry name).
pub(crate) fn split(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) => ("/", &path[1..]),
        Some(index) => (&path[..index], &path[index + 1..]),
        None => ("/", path),
    }
}
