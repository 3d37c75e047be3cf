//! ConanCenter adapter
//!
//! Lists recipe versions through the remote search endpoint:
//! `https://center.conan.io/v1/conans/search?q={name}`
//! The endpoint returns full recipe references (`name/version` or
//! `name/version@user/channel`); only exact name matches count.

use crate::catalog::VersionDetails;
use crate::domain::{PackageManager, PackageVersion};
use crate::error::RegistryError;
use crate::registry::{HttpClient, PackageIndex};
use async_trait::async_trait;
use serde::Deserialize;

/// ConanCenter remote base URL
const CONAN_CENTER_URL: &str = "https://center.conan.io";

/// Recipe browser base URL
const RECIPE_PAGE_URL: &str = "https://conan.io/center/recipes";

/// ConanCenter search adapter
pub struct ConanIndex {
    client: HttpClient,
}

/// Search response document
#[derive(Debug, Deserialize)]
struct ConanSearchResponse {
    results: Vec<String>,
}

impl ConanIndex {
    /// Create a new ConanCenter adapter
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn search_url(&self, package: &str) -> String {
        format!("{}/v1/conans/search?q={}", CONAN_CENTER_URL, package)
    }

    /// Extract the version from a recipe reference when the name matches
    fn version_of<'a>(reference: &'a str, package: &str) -> Option<&'a str> {
        let (name, rest) = reference.split_once('/')?;
        if name != package {
            return None;
        }
        // Strip a trailing @user/channel qualifier.
        Some(rest.split('@').next().unwrap_or(rest))
    }
}

#[async_trait]
impl PackageIndex for ConanIndex {
    fn package_manager(&self) -> PackageManager {
        PackageManager::Conan
    }

    fn index_name(&self) -> &'static str {
        "ConanCenter"
    }

    async fn published_versions(
        &self,
        package: &str,
    ) -> Result<Vec<VersionDetails>, RegistryError> {
        let url = self.search_url(package);
        let response: ConanSearchResponse = self
            .client
            .get_json(&url, package, self.index_name())
            .await?;

        let mut versions = Vec::new();
        for reference in &response.results {
            let Some(raw) = Self::version_of(reference, package) else {
                continue;
            };
            let Ok(version) = PackageVersion::parse(raw) else {
                continue;
            };
            versions.push(
                VersionDetails::new(version)
                    .with_registry_url(url.clone())
                    .with_package_url(format!("{}/{}?version={}", RECIPE_PAGE_URL, package, raw)),
            );
        }

        if versions.is_empty() {
            // The search endpoint answers 200 with no results for unknown
            // names; normalize that to the not-found case.
            return Err(RegistryError::package_not_found(package, self.index_name()));
        }

        versions.sort();
        Ok(versions)
    }
}
