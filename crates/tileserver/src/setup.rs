//! Production route and service collaborators.
//!
//! Route handler registration is owned by the embedding application; this
//! server only enumerates what a definition ships. Event handlers are
//! declared in a `backend/events.json` manifest and bound to tracing
//! handlers through the registrar.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tilecore::DefinitionError;
use tilewire::{
    path_exists, DefinitionEventRegistrar, EventHandlerSpec, HostApp, RouteSetup, ServiceSetup,
    SubApp,
};
use tracing::info;

/// Enumerates the route modules a definition ships under `backend/routes`.
pub struct RouteManifestSetup;

#[async_trait]
impl RouteSetup for RouteManifestSetup {
    async fn setup_routes(
        &self,
        _subapp: &SubApp,
        definition_name: &str,
        routes_dir: &Path,
    ) -> Result<(), DefinitionError> {
        let mut entries = tokio::fs::read_dir(routes_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            info!(
                "definition '{}' ships route module {}",
                definition_name,
                entry.file_name().to_string_lossy()
            );
        }
        Ok(())
    }
}

/// One entry in a definition's `events.json` manifest.
#[derive(Debug, Deserialize)]
struct EventBinding {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Binds each event declared in `backend/events.json` to a tracing handler.
///
/// The manifest is optional. Entries pass through the registrar, so a binding
/// that omits its event name fails definition setup the same way a code-level
/// handler would.
pub struct EventManifestSetup;

#[async_trait]
impl ServiceSetup for EventManifestSetup {
    async fn setup_services(
        &self,
        _app: &dyn HostApp,
        definition_name: &str,
        services_dir: &Path,
        registrar: &DefinitionEventRegistrar,
    ) -> Result<(), DefinitionError> {
        let manifest = services_dir.join("events.json");
        if !path_exists(&manifest).await {
            return Ok(());
        }

        let bytes = tokio::fs::read(&manifest).await?;
        let bindings: Vec<EventBinding> =
            serde_json::from_slice(&bytes).map_err(|source| DefinitionError::Descriptor {
                path: manifest.clone(),
                source,
            })?;

        for binding in bindings {
            let definition = definition_name.to_string();
            let event_label = binding.event.clone().unwrap_or_default();
            registrar.register(EventHandlerSpec {
                event: binding.event,
                handler: Some(Arc::new(move |payload| {
                    info!(
                        "definition '{}' received '{}': {}",
                        definition, event_label, payload
                    );
                })),
                description: binding.description,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tilecore::EventRegistry;
    use tilewire::MountPlan;

    #[tokio::test]
    async fn manifest_events_register_through_the_registrar() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("events.json"),
            r#"[{"event": "tileRefreshed", "description": "refresh hook"}]"#,
        )
        .unwrap();

        let registry = Arc::new(EventRegistry::new());
        let registrar = DefinitionEventRegistrar::new(registry.clone(), "weather");
        let plan = MountPlan::new();

        EventManifestSetup
            .setup_services(&plan, "weather", dir.path(), &registrar)
            .await
            .unwrap();

        assert_eq!(registry.definition_listener_count("tileRefreshed", "weather"), 1);
    }

    #[tokio::test]
    async fn manifest_entry_without_event_name_fails_setup() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("events.json"),
            r#"[{"description": "missing the event name"}]"#,
        )
        .unwrap();

        let registry = Arc::new(EventRegistry::new());
        let registrar = DefinitionEventRegistrar::new(registry, "weather");
        let plan = MountPlan::new();

        let err = EventManifestSetup
            .setup_services(&plan, "weather", dir.path(), &registrar)
            .await
            .unwrap_err();
        assert!(matches!(err, DefinitionError::MissingEventName { .. }));
    }

    #[tokio::test]
    async fn missing_manifest_is_fine() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(EventRegistry::new());
        let registrar = DefinitionEventRegistrar::new(registry, "weather");
        let plan = MountPlan::new();

        EventManifestSetup
            .setup_services(&plan, "weather", dir.path(), &registrar)
            .await
            .unwrap();
    }
}
