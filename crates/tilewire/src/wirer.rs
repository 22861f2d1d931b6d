use futures::future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tilecore::{DefinitionError, DefinitionStore, DefinitionStores, EventRegistry, Result};
use tokio::fs;

use crate::fsx::path_exists;
use crate::host::{HostApp, SubApp};
use crate::loader::load_definition_metadata;
use crate::services::{DefinitionEventRegistrar, RouteSetup, ServiceSetup};

/// Wires definition directories into the host application and keeps the
/// stores in sync with what is actually on disk.
pub struct DefinitionWirer {
    stores: DefinitionStores,
    registry: Arc<EventRegistry>,
    host: Arc<dyn HostApp>,
    routes: Arc<dyn RouteSetup>,
    services: Arc<dyn ServiceSetup>,
}

impl DefinitionWirer {
    pub fn new(
        stores: DefinitionStores,
        registry: Arc<EventRegistry>,
        host: Arc<dyn HostApp>,
        routes: Arc<dyn RouteSetup>,
        services: Arc<dyn ServiceSetup>,
    ) -> Self {
        Self {
            stores,
            registry,
            host,
            routes,
            services,
        }
    }

    pub fn stores(&self) -> &DefinitionStores {
        &self.stores
    }

    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    /// Wire a single definition directory.
    ///
    /// The definition name defaults to the last path segment. A path that
    /// turns out not to be a directory is a silent no-op, so the scan stage
    /// can hand over arbitrary root entries without pre-filtering.
    ///
    /// Any failure in the chain is logged with the definition's name and
    /// escalated; a broken definition must not be allowed to run partially,
    /// so the caller is expected to abort startup on error.
    pub async fn wire_one_definition(&self, dir: &Path, name: Option<&str>) -> Result<()> {
        let name = match name {
            Some(name) => name.to_string(),
            None => dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| dir.display().to_string()),
        };

        match self.wire_one_inner(dir, &name).await {
            Ok(()) => Ok(()),
            Err(source) => {
                tracing::error!("failed to set up definition '{}': {}", name, source);
                Err(DefinitionError::Definition {
                    name,
                    source: Box::new(source),
                })
            }
        }
    }

    async fn wire_one_inner(&self, dir: &Path, name: &str) -> Result<()> {
        let meta = fs::metadata(dir).await?;
        if !meta.is_dir() {
            return Ok(());
        }

        let public_dir = dir.join("public");
        self.host.mount_static(&format!("/{}", name), public_dir.clone());

        let subapp = SubApp {
            name: name.to_string(),
            view_engine: "html".to_string(),
            views_root: public_dir,
        };
        self.host.mount_subapp(subapp.clone());

        // Route and service handlers may assume the definition record is
        // already in the store, so the descriptor must be saved (or
        // confirmed absent) before they run.
        load_definition_metadata(&self.stores, &dir.join("definition.json")).await?;

        let routes_dir = dir.join("backend").join("routes");
        let services_dir = dir.join("backend");
        let registrar = DefinitionEventRegistrar::new(self.registry.clone(), name);

        let wire_routes = async {
            if path_exists(&routes_dir).await {
                self.routes.setup_routes(&subapp, name, &routes_dir).await
            } else {
                Ok(())
            }
        };
        let wire_services = async {
            if path_exists(&services_dir).await {
                self.services
                    .setup_services(self.host.as_ref(), name, &services_dir, &registrar)
                    .await
            } else {
                Ok(())
            }
        };
        tokio::try_join!(wire_routes, wire_services)?;

        tracing::info!("wired definition '{}'", name);
        Ok(())
    }

    /// Discover and wire every definition under `root`, then prune stored
    /// records whose backing directory is gone.
    ///
    /// A missing root is valid: no definitions to load. Hidden entries
    /// (leading `.`) are skipped. All remaining entries are wired
    /// concurrently; reconciliation runs only after every one of them has
    /// completed.
    pub async fn wire_all_definitions(&self, root: &Path) -> Result<()> {
        if !path_exists(root).await {
            return Ok(());
        }

        let mut entries = fs::read_dir(root).await?;
        let mut discovered: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            if file_name.to_string_lossy().starts_with('.') {
                continue;
            }
            discovered.push(entry.path());
        }

        future::try_join_all(
            discovered
                .iter()
                .map(|dir| self.wire_one_definition(dir, None)),
        )
        .await?;

        self.reconcile(root).await
    }

    /// Remove stored records that no longer have a directory under `root`.
    /// The tile store is swept first, then the activity-stream store, so the
    /// pass is deterministic. Records that carry no directory name cannot be
    /// attributed to the filesystem and are never pruned.
    async fn reconcile(&self, root: &Path) -> Result<()> {
        self.reconcile_store(root, &self.stores.tiles).await?;
        self.reconcile_store(root, &self.stores.activity_streams)
            .await
    }

    async fn reconcile_store(&self, root: &Path, store: &Arc<dyn DefinitionStore>) -> Result<()> {
        for record in store.find_all().await? {
            let Some(dir_name) = record.definition_dir_name.as_deref() else {
                continue;
            };
            if path_exists(&root.join(dir_name)).await {
                continue;
            }
            if let Some(id) = record.id.as_deref() {
                tracing::info!(
                    "pruning stored definition '{}': directory no longer exists",
                    dir_name
                );
                store.remove(id).await?;
            }
        }
        Ok(())
    }
}
