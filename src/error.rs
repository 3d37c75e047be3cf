//! Application error types using thiserror
//!
//! Error hierarchy:
//! - RequirementError: a requirement string cannot be safely rewritten
//! - RegistryError: issues talking to a package index
//! - InputError: malformed check-request input
//!
//! "No qualifying version" is never an error anywhere in this crate; it is
//! an absent result the caller reads as "already up to date".

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a resolution attempt
#[derive(Error, Debug)]
pub enum CheckError {
    /// Requirement rewriting errors
    #[error(transparent)]
    Requirement(#[from] RequirementError),

    /// Package index errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Check-request input errors
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Errors raised by the requirement rewriter
///
/// These are hard errors: silently skipping a declaration site would leave
/// the manifest set internally inconsistent.
#[derive(Error, Debug)]
pub enum RequirementError {
    /// The requirement's syntax is not one this ecosystem family uses
    #[error("unsupported requirement syntax '{requirement}': {message}")]
    UnsupportedSyntax { requirement: String, message: String },
}

/// Errors related to package index communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not present in the index (HTTP 404)
    #[error("package '{package}' not found in {index}")]
    PackageNotFound { package: String, index: String },

    /// Network request failed
    #[error("failed to fetch '{package}' from {index}: {message}")]
    Network {
        package: String,
        index: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {index}")]
    RateLimitExceeded { index: String },

    /// Timeout
    #[error("timeout while fetching '{package}' from {index}")]
    Timeout { package: String, index: String },

    /// Response could not be interpreted
    #[error("invalid response from {index} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        index: String,
        message: String,
    },
}

/// Errors related to check-request input
#[derive(Error, Debug)]
pub enum InputError {
    /// Failed to read a request or advisory file
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a request or advisory file
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A version string could not be parsed
    #[error("invalid version '{value}'")]
    InvalidVersion { value: String },

    /// A version range could not be parsed
    #[error("invalid version range '{value}': {message}")]
    InvalidRange { value: String, message: String },

    /// An --ignore argument was not of the form NAME=RANGE
    #[error("invalid ignore spec '{value}': expected NAME=RANGE")]
    InvalidIgnoreSpec { value: String },

    /// Offline mode was requested but the request has no version catalog
    #[error("offline run requires known_versions in {path}")]
    MissingCatalog { path: PathBuf },
}

impl RequirementError {
    /// Creates a new UnsupportedSyntax error
    pub fn unsupported(requirement: impl Into<String>, message: impl Into<String>) -> Self {
        RequirementError::UnsupportedSyntax {
            requirement: requirement.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, index: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            index: index.into(),
        }
    }

    /// Creates a new Network error
    pub fn network(
        package: impl Into<String>,
        index: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::Network {
            package: package.into(),
            index: index.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(index: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            index: index.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, index: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            index: index.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        index: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            index: index.into(),
            message: message.into(),
        }
    }

    /// Returns true for the "package unknown to the index" case, which the
    /// catalog treats as an empty version list rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::PackageNotFound { .. })
    }
}

impl InputError {
    /// Creates a new Read error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InputError::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        InputError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidVersion error
    pub fn invalid_version(value: impl Into<String>) -> Self {
        InputError::InvalidVersion {
            value: value.into(),
        }
    }

    /// Creates a new InvalidRange error
    pub fn invalid_range(value: impl Into<String>, message: impl Into<String>) -> Self {
        InputError::InvalidRange {
            value: value.into(),
            message: message.into(),
        }
    }
}
