// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when listing the media directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to read directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when reading or writing the metadata cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read metadata cache {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata cache {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write metadata cache {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize metadata cache: {0}")]
    SerializeFailed(#[from] serde_json::Error),
}

/// Errors that can occur while probing a media file for its duration
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to launch {program}: {source}")]
    LaunchFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Probe of {path} exited with {status}")]
    ExitStatus { path: PathBuf, status: String },

    #[error("No duration found in probe output for {path}")]
    NoDuration { path: PathBuf },
}

/// Errors returned from a synchronization pass
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Cache write error: {0}")]
    CacheWrite(#[source] CacheError),
}

/// Errors that can occur while serving the feed over HTTP
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Failed to bind {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}
