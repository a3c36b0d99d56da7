//! Session cookie key loading.

use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use tracing::{info, warn};
use zeroize::Zeroize;

/// Minimum key material accepted from a key file.
pub const SESSION_KEY_MIN_LEN: usize = 64;

/// Errors raised while loading the session key.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Derive the cookie key from `path`, or generate an ephemeral one when no
/// path is configured.
///
/// Ephemeral keys invalidate every session on restart.
///
/// # Examples
/// ```rust
/// use loyalty_backend::inbound::http::session_config::session_key;
///
/// let key = session_key(None).expect("ephemeral key");
/// assert_eq!(key.master().len(), 64);
/// ```
pub fn session_key(path: Option<&Path>) -> Result<Key, SessionConfigError> {
    let Some(path) = path else {
        warn!("no session key file configured; sessions will not survive restarts");
        return Ok(Key::generate());
    };

    let mut bytes = std::fs::read(path).map_err(|source| SessionConfigError::KeyRead {
        path: path.to_path_buf(),
        source,
    })?;
    let length = bytes.len();
    if length < SESSION_KEY_MIN_LEN {
        bytes.zeroize();
        return Err(SessionConfigError::KeyTooShort {
            path: path.to_path_buf(),
            length,
            min_len: SESSION_KEY_MIN_LEN,
        });
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    info!(path = %path.display(), "session key loaded");
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn key_file(bytes: &[u8]) -> NamedTempFile {
        let file = NamedTempFile::new().expect("temp file");
        std::fs::write(file.path(), bytes).expect("write key");
        file
    }

    #[rstest]
    fn same_file_derives_same_key() {
        let file = key_file(&[b'k'; SESSION_KEY_MIN_LEN]);
        let first = session_key(Some(file.path())).expect("key");
        let second = session_key(Some(file.path())).expect("key");
        assert_eq!(first.master(), second.master());
    }

    #[rstest]
    fn short_key_is_rejected() {
        let file = key_file(&[b'k'; 10]);
        let Err(error) = session_key(Some(file.path())) else {
            panic!("short key should be rejected");
        };
        assert!(matches!(
            error,
            SessionConfigError::KeyTooShort { length: 10, .. }
        ));
    }

    #[rstest]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent");
        let Err(error) = session_key(Some(&path)) else {
            panic!("missing key file should be reported");
        };
        assert!(matches!(error, SessionConfigError::KeyRead { .. }));
    }

    #[rstest]
    fn absent_path_generates_distinct_keys() {
        let first = session_key(None).expect("key");
        let second = session_key(None).expect("key");
        assert_ne!(first.master(), second.master());
    }
}
