//! Package index adapters for listing published versions
//!
//! This module provides:
//! - the [`PackageIndex`] capability trait the catalog resolves against
//! - HTTP client shared foundation with retry logic
//! - NuGet v3 flat-container adapter
//! - ConanCenter adapter
//! - an in-memory index for pre-fetched catalogs and tests
//!
//! Adapters are selected once at startup through [`create_index`], a
//! static mapping from the package-manager enumeration; nothing registers
//! itself in a global table at load time.

mod client;
mod conan;
mod nuget;

pub use client::HttpClient;
pub use conan::ConanIndex;
pub use nuget::NugetIndex;

use crate::catalog::VersionDetails;
use crate::domain::{PackageManager, PackageVersion};
use crate::error::RegistryError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Capability interface over a package registry's version listing
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// The package manager this index serves
    fn package_manager(&self) -> PackageManager;

    /// The index name used in error messages
    fn index_name(&self) -> &'static str;

    /// List every published version of a package, ascending
    async fn published_versions(&self, package: &str)
        -> Result<Vec<VersionDetails>, RegistryError>;
}

/// Create the package index for the given package manager
pub fn create_index(package_manager: PackageManager, client: HttpClient) -> Box<dyn PackageIndex> {
    match package_manager {
        PackageManager::Nuget => Box::new(NugetIndex::new(client)),
        PackageManager::Conan => Box::new(ConanIndex::new(client)),
    }
}

/// Index backed by a caller-supplied catalog; used when the registry
/// lookups were already performed upstream, and in tests
pub struct InMemoryIndex {
    package_manager: PackageManager,
    catalog: HashMap<String, Vec<VersionDetails>>,
}

impl InMemoryIndex {
    /// Creates an empty in-memory index
    pub fn new(package_manager: PackageManager) -> Self {
        Self {
            package_manager,
            catalog: HashMap::new(),
        }
    }

    /// Builds an index from a name -> versions catalog
    pub fn from_catalog(
        package_manager: PackageManager,
        catalog: HashMap<String, Vec<PackageVersion>>,
    ) -> Self {
        let catalog = catalog
            .into_iter()
            .map(|(name, versions)| {
                let mut details: Vec<VersionDetails> =
                    versions.into_iter().map(VersionDetails::new).collect();
                details.sort();
                (name, details)
            })
            .collect();
        Self {
            package_manager,
            catalog,
        }
    }

    /// Records the published versions for one package (builder pattern)
    pub fn with_versions(mut self, package: impl Into<String>, versions: &[&str]) -> Self {
        let mut details: Vec<VersionDetails> = versions
            .iter()
            .map(|raw| {
                VersionDetails::new(
                    PackageVersion::parse(raw).expect("invalid version in test catalog"),
                )
            })
            .collect();
        details.sort();
        self.catalog.insert(package.into(), details);
        self
    }
}

#[async_trait]
impl PackageIndex for InMemoryIndex {
    fn package_manager(&self) -> PackageManager {
        self.package_manager
    }

    fn index_name(&self) -> &'static str {
        "in-memory"
    }

    async fn published_versions(
        &self,
        package: &str,
    ) -> Result<Vec<VersionDetails>, RegistryError> {
        match self.catalog.get(package) {
            Some(versions) => Ok(versions.clone()),
            None => Err(RegistryError::package_not_found(package, self.index_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_lists_sorted_versions() {
        let index = InMemoryIndex::new(PackageManager::Nuget).with_versions(
            "Serilog",
            &["2.0.0", "1.0.0", "3.0.1"],
        );

        let versions = index.published_versions("Serilog").await.unwrap();
        let raw: Vec<String> = versions.iter().map(|d| d.version.to_string()).collect();
        assert_eq!(raw, vec!["1.0.0", "2.0.0", "3.0.1"]);
    }

    #[tokio::test]
    async fn test_in_memory_unknown_package_is_not_found() {
        let index = InMemoryIndex::new(PackageManager::Nuget);
        let err = index.published_versions("Missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_from_catalog() {
        let mut catalog = HashMap::new();
        catalog.insert(
            "zlib".to_string(),
            vec![
                PackageVersion::parse("1.3").unwrap(),
                PackageVersion::parse("1.2.13").unwrap(),
            ],
        );
        let index = InMemoryIndex::from_catalog(PackageManager::Conan, catalog);

        let versions = index.published_versions("zlib").await.unwrap();
        assert_eq!(versions[0].version.to_string(), "1.2.13");
        assert_eq!(versions[1].version.to_string(), "1.3");
        assert_eq!(index.package_manager(), PackageManager::Conan);
    }

    #[test]
    fn test_create_index_static_mapping() {
        let client = HttpClient::new().unwrap();
        let nuget = create_index(PackageManager::Nuget, client.clone());
        assert_eq!(nuget.package_manager(), PackageManager::Nuget);

        let conan = create_index(PackageManager::Conan, client);
        assert_eq!(conan.package_manager(), PackageManager::Conan);
    }
}
