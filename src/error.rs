// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration and sink setup errors.
//!
//! None of these ever escape a logging call. They come back from setup
//! functions such as [`crate::add_file_sink`] and [`crate::verbosity::install_overrides`],
//! and [`crate::init`] turns them into WARNING records.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed verbosity override `{0}`, expected `pattern=level`")]
    MalformedOverride(String),

    #[error("invalid file pattern `{pattern}` in verbosity override")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("unrecognized verbosity `{0}`")]
    InvalidLevel(String),

    #[error("invalid boolean `{value}` for `{flag}`")]
    InvalidBool { flag: String, value: String },

    #[error("missing value for `{0}`")]
    MissingValue(String),

    #[error("failed to open log file {}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("verbosity overrides are already installed")]
    OverridesFrozen,
}

impl Error {
    /// The error and its sources on one line, for WARNING records.
    pub(crate) fn report(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_includes_sources() {
        let e = Error::OpenFile {
            path: PathBuf::from("/nope/x.log"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(e.report(), "failed to open log file /nope/x.log: denied");
    }
}
