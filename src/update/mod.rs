//! Update decision engine
//!
//! This module provides:
//! - the resolution context shared by every check in a request
//! - the per-dependency [`UpdateChecker`] deciding the target version
//! - property grouping analysis and full-unlock propagation
//! - requirement rewriting
//!
//! Catalog answers are memoized per checker; a new checker per dependency
//! per request is the cache scope, so nothing needs invalidation.

pub mod peers;
pub mod property;
mod propagator;
mod rewriter;

pub use peers::{NoPeerDiscovery, PeerDependencyFinder};
pub use propagator::PropertyUpdater;
pub use rewriter::RequirementsUpdater;

use crate::catalog::{VersionDetails, VersionFinder};
use crate::domain::{
    CheckOutcome, Dependency, PackageManager, PackageVersion, SecurityAdvisory, UpToDateReason,
    VersionRange,
};
use crate::error::CheckError;
use crate::registry::PackageIndex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Inputs shared by every dependency check in one request: the parsed
/// dependency set, the package index, the advisory feed, and the caller's
/// ignore configuration. Built explicitly at startup; nothing here comes
/// from global registries.
pub struct ResolutionContext {
    /// Ecosystem being resolved
    pub package_manager: PackageManager,
    /// The full parsed dependency set, in declaration order
    pub dependencies: Vec<Dependency>,
    /// The version catalog to resolve against
    pub index: Arc<dyn PackageIndex>,
    /// Advisory feed entries, any package
    pub advisories: Vec<SecurityAdvisory>,
    /// Version ranges to exclude from consideration, per package
    pub ignored_versions: HashMap<String, Vec<VersionRange>>,
    /// Discovery of peers that move in lockstep for non-property reasons
    pub peer_finder: Arc<dyn PeerDependencyFinder>,
}

impl ResolutionContext {
    /// Creates a context with no advisories, no ignores, and no peer
    /// discovery
    pub fn new(
        package_manager: PackageManager,
        dependencies: Vec<Dependency>,
        index: Arc<dyn PackageIndex>,
    ) -> Self {
        Self {
            package_manager,
            dependencies,
            index,
            advisories: Vec::new(),
            ignored_versions: HashMap::new(),
            peer_finder: Arc::new(NoPeerDiscovery),
        }
    }

    /// Sets the advisory feed (builder pattern)
    pub fn with_advisories(mut self, advisories: Vec<SecurityAdvisory>) -> Self {
        self.advisories = advisories;
        self
    }

    /// Adds ignore ranges for one package (builder pattern)
    pub fn with_ignored_versions(
        mut self,
        package: impl Into<String>,
        ranges: Vec<VersionRange>,
    ) -> Self {
        self.ignored_versions.insert(package.into(), ranges);
        self
    }

    /// Sets the peer discovery implementation (builder pattern)
    pub fn with_peer_finder(mut self, finder: Arc<dyn PeerDependencyFinder>) -> Self {
        self.peer_finder = finder;
        self
    }

    /// Ignore ranges configured for a package
    pub fn ignored_for(&self, package: &str) -> &[VersionRange] {
        self.ignored_versions
            .get(package)
            .map(|ranges| ranges.as_slice())
            .unwrap_or(&[])
    }

    /// Advisory feed entries naming a package
    pub fn advisories_for(&self, package: &str) -> Vec<&SecurityAdvisory> {
        self.advisories
            .iter()
            .filter(|advisory| advisory.dependency == package)
            .collect()
    }
}

/// Decides whether and how one dependency can be updated
pub struct UpdateChecker {
    dependency: Dependency,
    context: Arc<ResolutionContext>,
    latest: OnceCell<Option<VersionDetails>>,
    lowest_fix: OnceCell<Option<VersionDetails>>,
}

impl UpdateChecker {
    /// Creates a checker for one dependency; catalog answers are cached
    /// on this value
    pub fn new(dependency: Dependency, context: Arc<ResolutionContext>) -> Self {
        Self {
            dependency,
            context,
            latest: OnceCell::new(),
            lowest_fix: OnceCell::new(),
        }
    }

    /// The dependency this checker decides for
    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    /// Returns true if the current version is inside an advisory range
    pub fn vulnerable(&self) -> bool {
        let Some(current) = &self.dependency.version else {
            return false;
        };
        self.context
            .advisories_for(&self.dependency.name)
            .iter()
            .any(|advisory| advisory.affects(current))
    }

    /// Returns false when some requirement references a property that
    /// could not be interpolated; the true constraint is unknowable, so
    /// the dependency is treated as up to date
    pub fn requirements_unlockable(&self) -> bool {
        !self.dependency.has_unresolved_property()
    }

    /// Latest known version: transitive dependencies without a
    /// vulnerability report their current version without a lookup
    pub async fn latest_version(&self) -> Result<Option<PackageVersion>, CheckError> {
        if !self.dependency.top_level && !self.vulnerable() {
            return Ok(self.dependency.version.clone());
        }
        Ok(self
            .latest_version_details()
            .await?
            .map(|details| details.version.clone()))
    }

    /// The best version to move to: the lowest remediating version when
    /// vulnerable, the latest qualifying version otherwise; absent when
    /// no update applies
    pub async fn preferred_version(&self) -> Result<Option<VersionDetails>, CheckError> {
        if !self.dependency.top_level && !self.vulnerable() {
            return Ok(None);
        }
        if !self.requirements_unlockable() {
            return Ok(None);
        }
        if self.vulnerable() {
            Ok(self.lowest_security_fix_details().await?.cloned())
        } else {
            Ok(self.latest_version_details().await?.cloned())
        }
    }

    /// A version reachable without unlocking peers. Absent for
    /// full-unlock-only ecosystems, where any chosen version may require
    /// moving peer dependencies and callers must take the full-unlock path
    pub async fn resolvable_version_without_unlock(
        &self,
    ) -> Result<Option<VersionDetails>, CheckError> {
        if self.context.package_manager.full_unlock_only() {
            return Ok(None);
        }
        self.preferred_version().await
    }

    /// Returns true if an update to the preferred version is possible,
    /// moving every property sibling when the version is shared
    pub async fn can_update(&self) -> Result<bool, CheckError> {
        let Some(target) = self.preferred_version().await? else {
            return Ok(false);
        };
        match self.shared_property() {
            Some(property) => {
                let propagator =
                    PropertyUpdater::new(Arc::clone(&self.context), property, target);
                propagator.update_possible().await
            }
            None => Ok(true),
        }
    }

    /// Every dependency that moves for this update: the property group
    /// when the version is shared, otherwise this dependency plus any
    /// lockstep peers. Empty when no update applies or the group is
    /// blocked.
    pub async fn updated_dependencies(&self) -> Result<Vec<Dependency>, CheckError> {
        let Some(target) = self.preferred_version().await? else {
            return Ok(Vec::new());
        };

        if let Some(property) = self.shared_property() {
            let propagator = PropertyUpdater::new(Arc::clone(&self.context), property, target);
            return propagator.updated_dependencies().await;
        }

        let source = Some(target.to_requirement_source());
        let updater =
            RequirementsUpdater::new(&self.dependency.requirements, &target.version, source);
        let requirements = updater.updated_requirements()?;
        let updated = self.dependency.updated(target.version.clone(), requirements);

        let mut all = vec![updated.clone()];
        for peer in self
            .context
            .peer_finder
            .updated_peer_dependencies(&updated)
            .await?
        {
            if all.iter().all(|existing| existing.name != peer.name) {
                all.push(peer);
            }
        }
        Ok(all)
    }

    /// Runs the full decision and maps it to an outcome
    pub async fn check(&self) -> Result<CheckOutcome, CheckError> {
        if !self.dependency.top_level && !self.vulnerable() {
            return Ok(CheckOutcome::up_to_date(
                self.dependency.clone(),
                UpToDateReason::Transitive,
            ));
        }
        if !self.requirements_unlockable() {
            return Ok(CheckOutcome::up_to_date(
                self.dependency.clone(),
                UpToDateReason::UnresolvedProperty,
            ));
        }

        let Some(target) = self.preferred_version().await? else {
            return Ok(CheckOutcome::up_to_date(
                self.dependency.clone(),
                UpToDateReason::NoEligibleVersion,
            ));
        };

        if let Some(current) = &self.dependency.version {
            if *current >= target.version {
                return Ok(CheckOutcome::up_to_date(
                    self.dependency.clone(),
                    UpToDateReason::AlreadyLatest,
                ));
            }
        }

        let updated = self.updated_dependencies().await?;
        if updated.is_empty() {
            return Ok(CheckOutcome::up_to_date(
                self.dependency.clone(),
                UpToDateReason::GroupBlocked,
            ));
        }

        Ok(CheckOutcome::update(
            self.dependency.clone(),
            target.version.clone(),
            updated,
        ))
    }

    fn shared_property(&self) -> Option<String> {
        property::shared_property_name(&self.dependency, &self.context.dependencies)
            .map(|name| name.to_string())
    }

    async fn latest_version_details(&self) -> Result<Option<&VersionDetails>, CheckError> {
        let cached = self
            .latest
            .get_or_try_init(|| async {
                self.finder().latest_version_details().await
            })
            .await?;
        Ok(cached.as_ref())
    }

    async fn lowest_security_fix_details(&self) -> Result<Option<&VersionDetails>, CheckError> {
        let cached = self
            .lowest_fix
            .get_or_try_init(|| async {
                self.finder().lowest_security_fix_details().await
            })
            .await?;
        Ok(cached.as_ref())
    }

    fn finder(&self) -> VersionFinder<'_> {
        VersionFinder::new(
            &self.dependency,
            self.context.index.as_ref(),
            self.context.ignored_for(&self.dependency.name),
            &self.context.advisories,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Requirement;
    use crate::error::RegistryError;
    use crate::registry::InMemoryIndex;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn v(s: &str) -> PackageVersion {
        PackageVersion::parse(s).unwrap()
    }

    fn r(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    fn plain_dep(name: &str, version: &str) -> Dependency {
        Dependency::new(
            name,
            Some(v(version)),
            vec![Requirement::new(version, "app.csproj")],
            PackageManager::Nuget,
        )
    }

    fn context(dependencies: Vec<Dependency>, index: InMemoryIndex) -> Arc<ResolutionContext> {
        Arc::new(ResolutionContext::new(
            PackageManager::Nuget,
            dependencies,
            Arc::new(index),
        ))
    }

    #[tokio::test]
    async fn test_transitive_without_advisory_reports_no_update() {
        let foo = plain_dep("Foo", "1.0.0").transitive();
        let index = InMemoryIndex::new(PackageManager::Nuget).with_versions("Foo", &["1.0.0", "2.0.0"]);
        let checker = UpdateChecker::new(foo.clone(), context(vec![foo], index));

        assert!(checker.preferred_version().await.unwrap().is_none());
        assert!(!checker.can_update().await.unwrap());
        // The latest version is reported as the current one, untouched.
        assert_eq!(checker.latest_version().await.unwrap(), Some(v("1.0.0")));

        match checker.check().await.unwrap() {
            CheckOutcome::UpToDate { reason, .. } => {
                assert_eq!(reason, UpToDateReason::Transitive)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transitive_with_advisory_is_checked() {
        let foo = plain_dep("Foo", "1.0.0").transitive();
        let index =
            InMemoryIndex::new(PackageManager::Nuget).with_versions("Foo", &["1.0.0", "1.2.0", "2.0.0"]);
        let advisory = SecurityAdvisory::new("Foo", PackageManager::Nuget, vec![r("< 1.2.0")]);
        let context = Arc::new(
            ResolutionContext::new(PackageManager::Nuget, vec![foo.clone()], Arc::new(index))
                .with_advisories(vec![advisory]),
        );
        let checker = UpdateChecker::new(foo, context);

        assert!(checker.vulnerable());
        let preferred = checker.preferred_version().await.unwrap().unwrap();
        assert_eq!(preferred.version, v("1.2.0"));
    }

    #[tokio::test]
    async fn test_unresolved_property_reports_up_to_date() {
        let dep = Dependency::new(
            "Foo",
            Some(v("1.0.0")),
            vec![Requirement::new("$(FooVersion)", "app.csproj")],
            PackageManager::Nuget,
        );
        let index = InMemoryIndex::new(PackageManager::Nuget).with_versions("Foo", &["1.0.0", "2.0.0"]);
        let checker = UpdateChecker::new(dep.clone(), context(vec![dep], index));

        assert!(!checker.requirements_unlockable());
        assert!(checker.preferred_version().await.unwrap().is_none());
        match checker.check().await.unwrap() {
            CheckOutcome::UpToDate { reason, .. } => {
                assert_eq!(reason, UpToDateReason::UnresolvedProperty)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_vulnerable_prefers_lowest_fix_over_latest() {
        let bar = plain_dep("Bar", "1.0.0");
        let index = InMemoryIndex::new(PackageManager::Nuget)
            .with_versions("Bar", &["1.0.0", "2.0.0", "3.0.0"]);
        let advisory = SecurityAdvisory::new("Bar", PackageManager::Nuget, vec![r("< 2.0.0")])
            .with_patched_version(v("2.0.0"));
        let context = Arc::new(
            ResolutionContext::new(PackageManager::Nuget, vec![bar.clone()], Arc::new(index))
                .with_advisories(vec![advisory]),
        );
        let checker = UpdateChecker::new(bar, context);

        let preferred = checker.preferred_version().await.unwrap().unwrap();
        assert_eq!(preferred.version, v("2.0.0"));

        match checker.check().await.unwrap() {
            CheckOutcome::Update { target, updated, .. } => {
                assert_eq!(target, v("2.0.0"));
                assert_eq!(updated.len(), 1);
                assert_eq!(updated[0].requirements[0].spec, "2.0.0");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_safe_dependency_targets_latest() {
        let dep = plain_dep("Baz", "1.0.0");
        let index =
            InMemoryIndex::new(PackageManager::Nuget).with_versions("Baz", &["1.0.0", "1.5.0", "2.2.0"]);
        let checker = UpdateChecker::new(dep.clone(), context(vec![dep], index));

        let preferred = checker.preferred_version().await.unwrap().unwrap();
        assert_eq!(preferred.version, v("2.2.0"));
        assert!(checker.can_update().await.unwrap());
    }

    #[tokio::test]
    async fn test_already_latest() {
        let dep = plain_dep("Baz", "2.2.0");
        let index =
            InMemoryIndex::new(PackageManager::Nuget).with_versions("Baz", &["1.0.0", "2.2.0"]);
        let checker = UpdateChecker::new(dep.clone(), context(vec![dep], index));

        match checker.check().await.unwrap() {
            CheckOutcome::UpToDate { reason, .. } => {
                assert_eq!(reason, UpToDateReason::AlreadyLatest)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_updated_dependencies_idempotent_at_latest() {
        let dep = plain_dep("Baz", "2.2.0");
        let index =
            InMemoryIndex::new(PackageManager::Nuget).with_versions("Baz", &["1.0.0", "2.2.0"]);
        let checker = UpdateChecker::new(dep.clone(), context(vec![dep.clone()], index));

        let updated = checker.updated_dependencies().await.unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].version, dep.version);
        assert_eq!(updated[0].requirements, dep.requirements);
    }

    #[tokio::test]
    async fn test_shared_property_updates_whole_group() {
        let x = Dependency::new(
            "X",
            Some(v("1.0")),
            vec![Requirement::new("1.0", "x.csproj").with_property("SharedVer")],
            PackageManager::Nuget,
        );
        let y = Dependency::new(
            "Y",
            Some(v("1.0")),
            vec![Requirement::new("1.0", "y.csproj").with_property("SharedVer")],
            PackageManager::Nuget,
        );
        let index = InMemoryIndex::new(PackageManager::Nuget)
            .with_versions("X", &["1.0", "1.5"])
            .with_versions("Y", &["1.0", "1.5"]);
        let checker =
            UpdateChecker::new(x.clone(), context(vec![x, y], index));

        assert!(checker.can_update().await.unwrap());
        let updated = checker.updated_dependencies().await.unwrap();
        assert_eq!(updated.len(), 2);
        assert!(updated.iter().all(|d| d.version == Some(v("1.5"))));
        assert_eq!(updated[0].previous_requirements.as_ref().unwrap()[0].spec, "1.0");
        assert_eq!(updated[1].previous_requirements.as_ref().unwrap()[0].spec, "1.0");
    }

    #[tokio::test]
    async fn test_group_atomicity_when_sibling_blocked() {
        let x = Dependency::new(
            "X",
            Some(v("1.0")),
            vec![Requirement::new("1.0", "x.csproj").with_property("SharedVer")],
            PackageManager::Nuget,
        );
        let y = Dependency::new(
            "Y",
            Some(v("1.0")),
            vec![Requirement::new("1.0", "y.csproj").with_property("SharedVer")],
            PackageManager::Nuget,
        );
        // Y never published 1.5, so X must not move alone.
        let index = InMemoryIndex::new(PackageManager::Nuget)
            .with_versions("X", &["1.0", "1.5"])
            .with_versions("Y", &["1.0"]);
        let checker = UpdateChecker::new(x.clone(), context(vec![x, y], index));

        assert!(!checker.can_update().await.unwrap());
        assert!(checker.updated_dependencies().await.unwrap().is_empty());
        match checker.check().await.unwrap() {
            CheckOutcome::UpToDate { reason, .. } => {
                assert_eq!(reason, UpToDateReason::GroupBlocked)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_private_property_moves_alone() {
        let x = Dependency::new(
            "X",
            Some(v("1.0")),
            vec![Requirement::new("1.0", "x.csproj").with_property("XVersion")],
            PackageManager::Nuget,
        );
        let y = plain_dep("Y", "1.0");
        let index = InMemoryIndex::new(PackageManager::Nuget)
            .with_versions("X", &["1.0", "1.5"])
            .with_versions("Y", &["1.0"]);
        let checker = UpdateChecker::new(x.clone(), context(vec![x, y], index));

        assert!(checker.can_update().await.unwrap());
        let updated = checker.updated_dependencies().await.unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].name, "X");
    }

    #[tokio::test]
    async fn test_no_unlock_resolution_absent_for_full_unlock_ecosystems() {
        let dep = plain_dep("Baz", "1.0.0");
        let index =
            InMemoryIndex::new(PackageManager::Nuget).with_versions("Baz", &["1.0.0", "2.0.0"]);
        let checker = UpdateChecker::new(dep.clone(), context(vec![dep], index));

        assert!(checker
            .resolvable_version_without_unlock()
            .await
            .unwrap()
            .is_none());
        // The full-unlock path still works.
        assert!(checker.can_update().await.unwrap());
    }

    #[tokio::test]
    async fn test_peer_dependencies_merged_and_deduplicated() {
        struct PinnedChild;

        #[async_trait]
        impl PeerDependencyFinder for PinnedChild {
            async fn updated_peer_dependencies(
                &self,
                updated: &Dependency,
            ) -> Result<Vec<Dependency>, CheckError> {
                // A parent pinning a child plus a duplicate of the
                // updated dependency itself; the duplicate must not
                // survive the merge.
                Ok(vec![
                    Dependency::new(
                        "Child",
                        Some(v("2.0.0")),
                        vec![Requirement::new("2.0.0", "child.csproj")],
                        PackageManager::Nuget,
                    ),
                    updated.clone(),
                ])
            }
        }

        let dep = plain_dep("Parent", "1.0.0");
        let index =
            InMemoryIndex::new(PackageManager::Nuget).with_versions("Parent", &["1.0.0", "2.0.0"]);
        let context = Arc::new(
            ResolutionContext::new(
                PackageManager::Nuget,
                vec![dep.clone()],
                Arc::new(index),
            )
            .with_peer_finder(Arc::new(PinnedChild)),
        );
        let checker = UpdateChecker::new(dep, context);

        let updated = checker.updated_dependencies().await.unwrap();
        let names: Vec<&str> = updated.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Parent", "Child"]);
    }

    struct CountingIndex {
        inner: InMemoryIndex,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl crate::registry::PackageIndex for CountingIndex {
        fn package_manager(&self) -> PackageManager {
            PackageManager::Nuget
        }

        fn index_name(&self) -> &'static str {
            "counting"
        }

        async fn published_versions(
            &self,
            package: &str,
        ) -> Result<Vec<VersionDetails>, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.published_versions(package).await
        }
    }

    #[tokio::test]
    async fn test_catalog_lookup_memoized_per_checker() {
        let dep = plain_dep("Baz", "1.0.0");
        let index = Arc::new(CountingIndex {
            inner: InMemoryIndex::new(PackageManager::Nuget)
                .with_versions("Baz", &["1.0.0", "2.0.0"]),
            calls: AtomicUsize::new(0),
        });
        let context = Arc::new(ResolutionContext::new(
            PackageManager::Nuget,
            vec![dep.clone()],
            index.clone(),
        ));
        let checker = UpdateChecker::new(dep, context);

        checker.preferred_version().await.unwrap();
        checker.preferred_version().await.unwrap();
        checker.latest_version().await.unwrap();
        assert_eq!(index.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_version_dependency_is_not_vulnerable() {
        let dep = Dependency::new(
            "Foo",
            None,
            vec![Requirement::new("", "app.csproj")],
            PackageManager::Nuget,
        )
        .transitive();
        let index = InMemoryIndex::new(PackageManager::Nuget);
        let advisory = SecurityAdvisory::new("Foo", PackageManager::Nuget, vec![r("< 2.0")]);
        let context = Arc::new(
            ResolutionContext::new(PackageManager::Nuget, vec![dep.clone()], Arc::new(index))
                .with_advisories(vec![advisory]),
        );
        let checker = UpdateChecker::new(dep, context);

        assert!(!checker.vulnerable());
        assert!(checker.preferred_version().await.unwrap().is_none());
    }
}
