//! NuGet v3 flat-container adapter
//!
//! Lists package versions from the flat-container index:
//! `https://api.nuget.org/v3-flatcontainer/{id}/index.json`
//! (package ids are lowercased in flat-container URLs).

use crate::catalog::VersionDetails;
use crate::domain::{PackageManager, PackageVersion};
use crate::error::RegistryError;
use crate::registry::{HttpClient, PackageIndex};
use async_trait::async_trait;
use serde::Deserialize;

/// Flat-container base URL
const FLAT_CONTAINER_URL: &str = "https://api.nuget.org/v3-flatcontainer";

/// Package page base URL
const GALLERY_URL: &str = "https://www.nuget.org/packages";

/// NuGet flat-container index adapter
pub struct NugetIndex {
    client: HttpClient,
}

/// Flat-container index document
#[derive(Debug, Deserialize)]
struct FlatContainerIndex {
    versions: Vec<String>,
}

impl NugetIndex {
    /// Create a new NuGet index adapter
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn index_url(&self, package: &str) -> String {
        format!(
            "{}/{}/index.json",
            FLAT_CONTAINER_URL,
            package.to_lowercase()
        )
    }

    fn nuspec_url(&self, package: &str, version: &str) -> String {
        let id = package.to_lowercase();
        format!("{}/{}/{}/{}.nuspec", FLAT_CONTAINER_URL, id, version, id)
    }
}

#[async_trait]
impl PackageIndex for NugetIndex {
    fn package_manager(&self) -> PackageManager {
        PackageManager::Nuget
    }

    fn index_name(&self) -> &'static str {
        "nuget.org"
    }

    async fn published_versions(
        &self,
        package: &str,
    ) -> Result<Vec<VersionDetails>, RegistryError> {
        let url = self.index_url(package);
        let index: FlatContainerIndex = self
            .client
            .get_json(&url, package, self.index_name())
            .await?;

        let mut versions = Vec::new();
        for raw in index.versions {
            // The index occasionally lists unlisted or malformed entries;
            // those are not candidates.
            let Ok(version) = PackageVersion::parse(&raw) else {
                continue;
            };
            versions.push(
                VersionDetails::new(version)
                    .with_source_url(self.nuspec_url(package, &raw))
                    .with_registry_url(url.clone())
                    .with_package_url(format!("{}/{}/{}", GALLERY_URL, package, raw)),
            );
        }

        versions.sort();
        Ok(versions)
    }
}
