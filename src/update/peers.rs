//! Peer dependency discovery seam
//!
//! Some updates drag other packages along for reasons other than a shared
//! version property: a parent package can pin a child that must move in
//! lockstep. Discovering those peers needs ecosystem-specific dependency
//! graph analysis, so it sits behind a trait the caller can implement;
//! the default discovers nothing.

use crate::domain::Dependency;
use crate::error::CheckError;
use async_trait::async_trait;

/// Discovers dependencies that must move together with an updated one
#[async_trait]
pub trait PeerDependencyFinder: Send + Sync {
    /// Dependencies that must be updated alongside `updated`, already at
    /// their new versions; an empty result means the update stands alone
    async fn updated_peer_dependencies(
        &self,
        updated: &Dependency,
    ) -> Result<Vec<Dependency>, CheckError>;
}

/// Peer discovery that never finds anything
pub struct NoPeerDiscovery;

#[async_trait]
impl PeerDependencyFinder for NoPeerDiscovery {
    async fn updated_peer_dependencies(
        &self,
        _updated: &Dependency,
    ) -> Result<Vec<Dependency>, CheckError> {
        Ok(Vec::new())
    }
}
