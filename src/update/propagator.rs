//! Full-unlock propagation for shared version properties
//!
//! When a version property is referenced by several dependencies, the
//! group either moves to the target version together or not at all. Each
//! sibling's catalog lookup is independent, so they run concurrently; the
//! emitted updates are ordered by declaration, not by completion, and a
//! hard error on any sibling cancels the outstanding lookups.

use crate::catalog::VersionDetails;
use crate::domain::{Dependency, PackageVersion};
use crate::error::{CheckError, RegistryError};
use crate::update::rewriter::RequirementsUpdater;
use crate::update::{property, ResolutionContext};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Computes the update set for a multi-dependency version property
pub struct PropertyUpdater {
    context: Arc<ResolutionContext>,
    property_name: String,
    target: VersionDetails,
}

impl PropertyUpdater {
    /// Creates a propagator for one property and target version
    pub fn new(
        context: Arc<ResolutionContext>,
        property_name: impl Into<String>,
        target: VersionDetails,
    ) -> Self {
        Self {
            context,
            property_name: property_name.into(),
            target,
        }
    }

    /// Every dependency referencing the property, in declaration order
    fn group(&self) -> Vec<Dependency> {
        property::dependencies_sharing_property(&self.property_name, &self.context.dependencies)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Returns true only if every dependency sharing the property can
    /// accept the target version under its own constraints
    pub async fn update_possible(&self) -> Result<bool, CheckError> {
        let mut lookups = JoinSet::new();
        for sibling in self.group() {
            let context = Arc::clone(&self.context);
            let target = self.target.version.clone();
            lookups.spawn(async move { sibling_accepts(context, sibling, target).await });
        }

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok(Ok(true)) => continue,
                Ok(Ok(false)) => {
                    lookups.abort_all();
                    return Ok(false);
                }
                Ok(Err(e)) => {
                    lookups.abort_all();
                    return Err(e);
                }
                Err(join_error) => {
                    lookups.abort_all();
                    return Err(RegistryError::network(
                        self.property_name.clone(),
                        self.context.index.index_name(),
                        format!("sibling lookup failed: {}", join_error),
                    )
                    .into());
                }
            }
        }

        Ok(true)
    }

    /// One updated dependency per group member, all at the target version
    /// and each retaining its own previous version and requirements;
    /// empty when the group cannot move
    pub async fn updated_dependencies(&self) -> Result<Vec<Dependency>, CheckError> {
        if !self.update_possible().await? {
            return Ok(Vec::new());
        }

        let source = Some(self.target.to_requirement_source());
        let mut updated = Vec::new();
        for sibling in self.group() {
            let updater =
                RequirementsUpdater::new(&sibling.requirements, &self.target.version, source.clone());
            let requirements = updater.updated_requirements()?;
            updated.push(sibling.updated(self.target.version.clone(), requirements));
        }
        Ok(updated)
    }
}

/// One sibling's acceptance check: the target must be published for it,
/// outside its ignore ranges, and clear of its advisories
async fn sibling_accepts(
    context: Arc<ResolutionContext>,
    dependency: Dependency,
    target: PackageVersion,
) -> Result<bool, CheckError> {
    let published = match context.index.published_versions(&dependency.name).await {
        Ok(versions) => versions,
        Err(e) if e.is_not_found() => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    if !published.iter().any(|details| details.version == target) {
        return Ok(false);
    }

    if context
        .ignored_for(&dependency.name)
        .iter()
        .any(|range| range.contains(&target))
    {
        return Ok(false);
    }

    let clear_of_advisories = context
        .advisories
        .iter()
        .filter(|advisory| advisory.dependency == dependency.name)
        .all(|advisory| advisory.remediated_by(&target));
    Ok(clear_of_advisories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PackageManager, Requirement, SecurityAdvisory, VersionRange};
    use crate::registry::{InMemoryIndex, PackageIndex};
    use async_trait::async_trait;

    fn v(s: &str) -> PackageVersion {
        PackageVersion::parse(s).unwrap()
    }

    fn shared_dep(name: &str, version: &str, file: &str) -> Dependency {
        Dependency::new(
            name,
            Some(v(version)),
            vec![Requirement::new(version, file).with_property("SharedVer")],
            PackageManager::Nuget,
        )
    }

    fn context_with_index(
        dependencies: Vec<Dependency>,
        index: Box<dyn PackageIndex>,
    ) -> Arc<ResolutionContext> {
        Arc::new(ResolutionContext::new(PackageManager::Nuget, dependencies, index.into()))
    }

    fn target(version: &str) -> VersionDetails {
        VersionDetails::new(v(version))
    }

    #[tokio::test]
    async fn test_group_moves_together() {
        let deps = vec![
            shared_dep("X", "1.0", "x.csproj"),
            shared_dep("Y", "1.0", "y.csproj"),
        ];
        let index = InMemoryIndex::new(PackageManager::Nuget)
            .with_versions("X", &["1.0", "1.5"])
            .with_versions("Y", &["1.0", "1.5"]);
        let context = context_with_index(deps, Box::new(index));
        let updater = PropertyUpdater::new(context, "SharedVer", target("1.5"));

        assert!(updater.update_possible().await.unwrap());
        let updated = updater.updated_dependencies().await.unwrap();
        assert_eq!(updated.len(), 2);

        let names: Vec<&str> = updated.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Y"]);
        for dep in &updated {
            assert_eq!(dep.version, Some(v("1.5")));
            assert_eq!(dep.previous_version, Some(v("1.0")));
            assert_eq!(dep.requirements[0].spec, "1.5");
            assert_eq!(
                dep.previous_requirements.as_ref().unwrap()[0].spec,
                "1.0"
            );
        }
        // Each sibling keeps its own declaration site.
        assert_eq!(updated[0].requirements[0].file, "x.csproj");
        assert_eq!(updated[1].requirements[0].file, "y.csproj");
    }

    #[tokio::test]
    async fn test_group_blocked_when_sibling_missing_target() {
        let deps = vec![
            shared_dep("X", "1.0", "x.csproj"),
            shared_dep("Y", "1.0", "y.csproj"),
        ];
        // Y's catalog stops at 1.0, so the group cannot reach 1.5.
        let index = InMemoryIndex::new(PackageManager::Nuget)
            .with_versions("X", &["1.0", "1.5"])
            .with_versions("Y", &["1.0"]);
        let context = context_with_index(deps, Box::new(index));
        let updater = PropertyUpdater::new(context, "SharedVer", target("1.5"));

        assert!(!updater.update_possible().await.unwrap());
        assert!(updater.updated_dependencies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_group_blocked_when_sibling_unknown_to_index() {
        let deps = vec![
            shared_dep("X", "1.0", "x.csproj"),
            shared_dep("Y", "1.0", "y.csproj"),
        ];
        let index = InMemoryIndex::new(PackageManager::Nuget).with_versions("X", &["1.0", "1.5"]);
        let context = context_with_index(deps, Box::new(index));
        let updater = PropertyUpdater::new(context, "SharedVer", target("1.5"));

        assert!(!updater.update_possible().await.unwrap());
    }

    #[tokio::test]
    async fn test_group_blocked_by_sibling_ignore_range() {
        let deps = vec![
            shared_dep("X", "1.0", "x.csproj"),
            shared_dep("Y", "1.0", "y.csproj"),
        ];
        let index = InMemoryIndex::new(PackageManager::Nuget)
            .with_versions("X", &["1.0", "1.5"])
            .with_versions("Y", &["1.0", "1.5"]);
        let context = Arc::new(
            ResolutionContext::new(PackageManager::Nuget, deps, Arc::new(index))
                .with_ignored_versions(
                    "Y",
                    vec![VersionRange::parse("[1.5,)").unwrap()],
                ),
        );
        let updater = PropertyUpdater::new(context, "SharedVer", target("1.5"));

        assert!(!updater.update_possible().await.unwrap());
    }

    #[tokio::test]
    async fn test_group_blocked_by_sibling_advisory() {
        let deps = vec![
            shared_dep("X", "1.0", "x.csproj"),
            shared_dep("Y", "1.0", "y.csproj"),
        ];
        let index = InMemoryIndex::new(PackageManager::Nuget)
            .with_versions("X", &["1.0", "1.5"])
            .with_versions("Y", &["1.0", "1.5"]);
        // 1.5 is itself vulnerable for Y; moving Y onto it is not a fix.
        let advisory = SecurityAdvisory::new(
            "Y",
            PackageManager::Nuget,
            vec![VersionRange::parse("[1.5,1.6)").unwrap()],
        );
        let context = Arc::new(
            ResolutionContext::new(PackageManager::Nuget, deps, Arc::new(index))
                .with_advisories(vec![advisory]),
        );
        let updater = PropertyUpdater::new(context, "SharedVer", target("1.5"));

        assert!(!updater.update_possible().await.unwrap());
        assert!(updater.updated_dependencies().await.unwrap().is_empty());
    }

    struct BrokenIndex;

    #[async_trait]
    impl PackageIndex for BrokenIndex {
        fn package_manager(&self) -> PackageManager {
            PackageManager::Nuget
        }

        fn index_name(&self) -> &'static str {
            "broken"
        }

        async fn published_versions(
            &self,
            package: &str,
        ) -> Result<Vec<VersionDetails>, RegistryError> {
            Err(RegistryError::network(package, "broken", "boom"))
        }
    }

    #[tokio::test]
    async fn test_hard_error_propagates_and_cancels_group() {
        let deps = vec![
            shared_dep("X", "1.0", "x.csproj"),
            shared_dep("Y", "1.0", "y.csproj"),
        ];
        let context = context_with_index(deps, Box::new(BrokenIndex));
        let updater = PropertyUpdater::new(context, "SharedVer", target("1.5"));

        let err = updater.update_possible().await.unwrap_err();
        assert!(format!("{}", err).contains("boom"));
        // And no partial update set is ever produced.
        assert!(updater.updated_dependencies().await.is_err());
    }

    #[tokio::test]
    async fn test_multiple_declaration_sites_rewritten_consistently() {
        let x = Dependency::new(
            "X",
            Some(v("1.0")),
            vec![
                Requirement::new("1.0", "a.csproj").with_property("SharedVer"),
                Requirement::new("[1.0,)", "b.csproj").with_property("SharedVer"),
            ],
            PackageManager::Nuget,
        );
        let deps = vec![x, shared_dep("Y", "1.0", "y.csproj")];
        let index = InMemoryIndex::new(PackageManager::Nuget)
            .with_versions("X", &["1.0", "1.5"])
            .with_versions("Y", &["1.0", "1.5"]);
        let context = context_with_index(deps, Box::new(index));
        let updater = PropertyUpdater::new(context, "SharedVer", target("1.5"));

        let updated = updater.updated_dependencies().await.unwrap();
        assert_eq!(updated[0].requirements[0].spec, "1.5");
        assert_eq!(updated[0].requirements[1].spec, "[1.5,)");
    }
}
