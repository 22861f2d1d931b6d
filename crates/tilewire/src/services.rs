use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tilecore::{DefinitionError, EventHandler, EventRegistry};

use crate::host::{HostApp, SubApp};

/// One declared event handler, as handed to the registrar by a service-setup
/// collaborator. Both `event` and `handler` are required; `description` is
/// optional.
#[derive(Clone)]
pub struct EventHandlerSpec {
    pub event: Option<String>,
    pub handler: Option<EventHandler>,
    pub description: Option<String>,
}

/// Validates declared event handlers and dispatches them to the right
/// listener table: global event names go to the system-wide table, everything
/// else is scoped to the owning definition.
pub struct DefinitionEventRegistrar {
    registry: Arc<EventRegistry>,
    definition_name: String,
}

impl DefinitionEventRegistrar {
    pub fn new(registry: Arc<EventRegistry>, definition_name: impl Into<String>) -> Self {
        Self {
            registry,
            definition_name: definition_name.into(),
        }
    }

    pub fn definition_name(&self) -> &str {
        &self.definition_name
    }

    /// A spec missing either required field is a fatal configuration error
    /// for the owning definition.
    pub fn register(&self, spec: EventHandlerSpec) -> Result<(), DefinitionError> {
        let event = spec.event.ok_or_else(|| DefinitionError::MissingEventName {
            definition: self.definition_name.clone(),
        })?;
        let handler = spec
            .handler
            .ok_or_else(|| DefinitionError::MissingEventHandler {
                definition: self.definition_name.clone(),
            })?;

        if self.registry.is_global_event(&event) {
            self.registry.add_system_listener(event, handler);
        } else {
            self.registry.add_definition_listener(
                event,
                self.definition_name.clone(),
                handler,
                spec.description
                    .unwrap_or_else(|| "Unique to definition".to_string()),
            );
        }
        Ok(())
    }
}

/// Registers the route handlers found under a definition's routes directory
/// onto its sub-application. How routes are discovered and matched belongs to
/// the embedding application.
#[async_trait]
pub trait RouteSetup: Send + Sync {
    async fn setup_routes(
        &self,
        subapp: &SubApp,
        definition_name: &str,
        routes_dir: &Path,
    ) -> Result<(), DefinitionError>;
}

/// Processes a definition's backend directory: tasks, lifecycle hooks, and
/// declared event handlers. Each declared handler must be passed through the
/// registrar exactly once.
#[async_trait]
pub trait ServiceSetup: Send + Sync {
    async fn setup_services(
        &self,
        app: &dyn HostApp,
        definition_name: &str,
        services_dir: &Path,
        registrar: &DefinitionEventRegistrar,
    ) -> Result<(), DefinitionError>;
}

/// Route collaborator that registers nothing. Used by dry-run tooling.
pub struct NoopRouteSetup;

#[async_trait]
impl RouteSetup for NoopRouteSetup {
    async fn setup_routes(
        &self,
        _subapp: &SubApp,
        definition_name: &str,
        routes_dir: &Path,
    ) -> Result<(), DefinitionError> {
        tracing::debug!(
            "skipping route setup for '{}' ({})",
            definition_name,
            routes_dir.display()
        );
        Ok(())
    }
}

/// Service collaborator that registers nothing. Used by dry-run tooling.
pub struct NoopServiceSetup;

#[async_trait]
impl ServiceSetup for NoopServiceSetup {
    async fn setup_services(
        &self,
        _app: &dyn HostApp,
        definition_name: &str,
        services_dir: &Path,
        _registrar: &DefinitionEventRegistrar,
    ) -> Result<(), DefinitionError> {
        tracing::debug!(
            "skipping service setup for '{}' ({})",
            definition_name,
            services_dir.display()
        );
        Ok(())
    }
}
