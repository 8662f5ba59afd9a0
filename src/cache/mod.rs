//! Catalog snapshot cache.
//!
//! Builds a consistent view of the hub catalog by walking a fixed dependency
//! order (APIs → versions → deployments → specs) and publishes it as an
//! immutable snapshot behind an atomic swap. Readers never see a half-built
//! snapshot: a refresh assembles the whole thing off to the side and replaces
//! the published `Arc` in one store.
//!
//! Refreshes are not serialized. Concurrent runs proceed independently and
//! the last one to finish wins the publish race. Readers that arrive before
//! the first refresh attempt has finished wait on a one-shot readiness gate;
//! after that, reads are plain atomic loads.

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::hub::{ApiHub, HubApi, HubDeployment, HubSpecContents, HubVersion, UpstreamError};

/// Hub filter selecting only APIs flagged publicly visible.
pub const PUBLIC_APIS_FILTER: &str = "target_user.enum_values.values.display_name:Public";

// =============================================================================
// Snapshot Model
// =============================================================================

/// A catalog version with the detail the pipeline resolved for it.
///
/// The enrichment fields are a cache-local denormalization layered on top of
/// the upstream version record; absent fields stay off the wire.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EnrichedVersion {
    #[serde(flatten)]
    pub version: HubVersion,
    /// The API this version belongs to.
    #[serde(rename = "apiData", skip_serializing_if = "Option::is_none")]
    pub api_data: Option<HubApi>,
    /// Resolved detail for the version's first deployment reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<HubDeployment>,
    /// Contents of the version's first spec.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<HubSpecContents>,
}

/// One fully-built, immutable view of the catalog.
///
/// `versions` is keyed by the upstream version name and iterates in the
/// order the pipeline encountered the versions, which is upstream order.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CatalogSnapshot {
    pub apis: Vec<HubApi>,
    pub versions: IndexMap<String, EnrichedVersion>,
}

// =============================================================================
// Cache
// =============================================================================

/// Owner of the published snapshot and the refresh pipeline.
pub struct CatalogCache {
    hub: Arc<dyn ApiHub>,
    snapshot: ArcSwap<CatalogSnapshot>,
    ready_tx: watch::Sender<bool>,
}

impl CatalogCache {
    /// Create a cache with an empty initial snapshot. Nothing is fetched
    /// until the first `refresh`.
    pub fn new(hub: Arc<dyn ApiHub>) -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            hub,
            snapshot: ArcSwap::from_pointee(CatalogSnapshot::default()),
            ready_tx,
        }
    }

    /// The currently published snapshot. Never blocks; before the first
    /// refresh completes this is the empty snapshot.
    pub fn current(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.load_full()
    }

    /// Wait until the first refresh attempt has finished, then read.
    ///
    /// The gate opens on attempt completion, not success: a failed first
    /// build unblocks readers too, and they see whatever is published.
    pub async fn wait_snapshot(&self) -> Arc<CatalogSnapshot> {
        let mut ready = self.ready_tx.subscribe();
        let _ = ready.wait_for(|done| *done).await;
        self.current()
    }

    /// Run one full pipeline pass and publish the result.
    ///
    /// A failure listing the APIs aborts the pass and leaves the previous
    /// snapshot live; failures further down enrich less and carry on.
    pub async fn refresh(&self) {
        info!("Catalog cache refresh started");
        match self.build_snapshot().await {
            Ok(snapshot) => {
                info!(
                    "Catalog cache refresh complete: {} apis, {} versions",
                    snapshot.apis.len(),
                    snapshot.versions.len()
                );
                self.snapshot.store(Arc::new(snapshot));
            }
            Err(err) => {
                error!("Catalog cache refresh aborted, keeping previous snapshot: {}", err);
            }
        }
        // Open the first-build gate whatever the outcome.
        self.ready_tx.send_replace(true);
    }

    /// Fire-and-forget refresh on the runtime.
    pub fn spawn_refresh(self: &Arc<Self>) {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            cache.refresh().await;
        });
    }

    async fn build_snapshot(&self) -> Result<CatalogSnapshot, UpstreamError> {
        let apis = self.hub.list_apis(PUBLIC_APIS_FILTER).await?;

        let mut versions = IndexMap::new();
        for api in &apis {
            let api_versions = match self.hub.list_versions(&api.name).await {
                Ok(api_versions) => api_versions,
                Err(err) => {
                    warn!("Skipping versions of {}: {}", api.name, err);
                    continue;
                }
            };

            for version in api_versions {
                let enriched = self.enrich_version(api, version).await;
                versions.insert(enriched.version.name.clone(), enriched);
            }
        }

        Ok(CatalogSnapshot { apis, versions })
    }

    /// Attach resolved detail to one version. First deployment reference and
    /// first spec only; anything that fails to resolve is simply left off.
    async fn enrich_version(&self, api: &HubApi, version: HubVersion) -> EnrichedVersion {
        let first_deployment = version.deployments.first().cloned();
        let version_name = version.name.clone();

        let mut enriched = EnrichedVersion {
            version,
            api_data: Some(api.clone()),
            deployment: None,
            spec: None,
        };

        if let Some(deployment_ref) = first_deployment {
            match self.hub.get_deployment(&deployment_ref).await {
                Ok(Some(deployment)) => enriched.deployment = Some(deployment),
                Ok(None) => {}
                Err(err) => warn!("Deployment {} unresolved: {}", deployment_ref, err),
            }
        }

        match self.hub.list_version_specs(&version_name).await {
            Ok(specs) => {
                if let Some(spec_ref) = specs.first() {
                    match self.hub.get_spec_contents(&spec_ref.name).await {
                        Ok(Some(contents)) => enriched.spec = Some(contents),
                        Ok(None) => {}
                        Err(err) => warn!("Spec {} unresolved: {}", spec_ref.name, err),
                    }
                }
            }
            Err(err) => warn!("Spec listing for {} failed: {}", version_name, err),
        }

        enriched
    }
}
