//! Error types for ROM acquisition and emulator boot
//!
//! Only fetch and archive failures abort an acquisition. Store failures are
//! logged and absorbed by the loader; the `Store` variant is reserved for
//! opening a store that cannot be used at all.

use reqwest::StatusCode;
use retrohub_cache::{RomKey, StoreError};
use thiserror::Error;

/// Network failure while downloading an archive or module
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP status {0}")]
    Status(StatusCode),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payload of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

impl FetchError {
    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(status) => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }
}

/// Failure to turn a downloaded payload into ROM bytes
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("malformed archive: {0}")]
    Malformed(#[from] zip::result::ZipError),

    #[error("no recognized ROM file among {entries} archive entries")]
    NoRomFound { entries: usize },

    #[error("{name} inflates to {size} bytes, over the limit of {limit} bytes")]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("failed to decompress {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by [`RomLoader::acquire`](crate::RomLoader::acquire)
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("no recognized ROM file in {key} ({entries} entries)")]
    NoAssetFound { key: RomKey, entries: usize },

    #[error("cannot unpack {key}: {source}")]
    Archive {
        key: RomKey,
        #[source]
        source: ArchiveError,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("extraction task failed: {0}")]
    Task(String),
}

impl AcquisitionError {
    pub(crate) fn from_archive(key: RomKey, source: ArchiveError) -> Self {
        match source {
            ArchiveError::NoRomFound { entries } => Self::NoAssetFound { key, entries },
            other => Self::Archive { key, source: other },
        }
    }
}

/// Failure to load an external runtime module
#[derive(Debug, Error)]
pub enum ScriptLoadError {
    #[error("failed to load {url}: HTTP status {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to load {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("module host rejected {id}: {reason}")]
    Host { id: String, reason: String },
}

/// Failure reported by the external emulator runtime
#[derive(Debug, Error)]
#[error("emulator runtime error: {0}")]
pub struct RuntimeError(pub String);

/// Errors that end a play session
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no ROM URL for this game")]
    MissingRomUrl,

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    ScriptLoad(#[from] ScriptLoadError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rom_maps_to_no_asset_found() {
        let err = AcquisitionError::from_archive(
            RomKey::new("docs.zip"),
            ArchiveError::NoRomFound { entries: 3 },
        );
        assert!(matches!(
            err,
            AcquisitionError::NoAssetFound { entries: 3, .. }
        ));
        assert_eq!(
            err.to_string(),
            "no recognized ROM file in docs.zip (3 entries)"
        );
    }

    #[test]
    fn test_fetch_status() {
        let err = FetchError::Status(StatusCode::NOT_FOUND);
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.to_string(), "HTTP status 404 Not Found");

        let err = FetchError::TooLarge { size: 10, limit: 5 };
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_load_error_is_transparent() {
        let err: LoadError = ScriptLoadError::Host {
            id: "loader".to_string(),
            reason: "blocked".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "module host rejected loader: blocked");
    }
}
