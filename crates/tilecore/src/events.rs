use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Listener callback invoked with the event payload.
pub type EventHandler = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

/// Event names recognized process-wide. Handlers for these register against
/// the single system table instead of a per-definition table.
pub const DEFAULT_GLOBAL_EVENTS: &[&str] = &[
    "serviceStarted",
    "serviceStopped",
    "newInstance",
    "destroyedInstance",
    "dataPushed",
];

/// A listener scoped to one definition.
#[derive(Clone)]
pub struct DefinitionListener {
    pub handler: EventHandler,
    pub description: String,
}

/// Listener tables for system-wide and per-definition events.
///
/// Constructed once at process start and threaded through the wiring calls;
/// shared across concurrently-wiring definitions, so the tables live behind
/// locks. Locks are never held across an await point.
pub struct EventRegistry {
    global_events: HashSet<String>,
    system: RwLock<HashMap<String, Vec<EventHandler>>>,
    definition: RwLock<HashMap<(String, String), Vec<DefinitionListener>>>,
}

impl EventRegistry {
    /// Registry recognizing the default global event names.
    pub fn new() -> Self {
        Self::with_global_events(DEFAULT_GLOBAL_EVENTS.iter().map(|s| s.to_string()))
    }

    pub fn with_global_events(events: impl IntoIterator<Item = String>) -> Self {
        Self {
            global_events: events.into_iter().collect(),
            system: RwLock::new(HashMap::new()),
            definition: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_global_event(&self, event: &str) -> bool {
        self.global_events.contains(event)
    }

    pub fn global_events(&self) -> impl Iterator<Item = &str> {
        self.global_events.iter().map(|s| s.as_str())
    }

    pub fn add_system_listener(&self, event: impl Into<String>, handler: EventHandler) {
        let event = event.into();
        tracing::debug!("registering system listener for '{}'", event);
        self.system
            .write()
            .expect("system listener table poisoned")
            .entry(event)
            .or_default()
            .push(handler);
    }

    pub fn add_definition_listener(
        &self,
        event: impl Into<String>,
        definition_name: impl Into<String>,
        handler: EventHandler,
        description: impl Into<String>,
    ) {
        let event = event.into();
        let definition_name = definition_name.into();
        tracing::debug!(
            "registering listener for '{}' scoped to definition '{}'",
            event,
            definition_name
        );
        self.definition
            .write()
            .expect("definition listener table poisoned")
            .entry((event, definition_name))
            .or_default()
            .push(DefinitionListener {
                handler,
                description: description.into(),
            });
    }

    /// Invoke every system listener registered for `event`.
    pub fn emit_system(&self, event: &str, payload: &serde_json::Value) {
        let table = self.system.read().expect("system listener table poisoned");
        if let Some(handlers) = table.get(event) {
            for handler in handlers {
                handler(payload);
            }
        }
    }

    /// Invoke every listener registered for `event` scoped to `definition_name`.
    pub fn emit_definition(&self, event: &str, definition_name: &str, payload: &serde_json::Value) {
        let table = self
            .definition
            .read()
            .expect("definition listener table poisoned");
        if let Some(listeners) = table.get(&(event.to_string(), definition_name.to_string())) {
            for listener in listeners {
                (listener.handler)(payload);
            }
        }
    }

    pub fn system_listener_count(&self, event: &str) -> usize {
        self.system
            .read()
            .expect("system listener table poisoned")
            .get(event)
            .map(|h| h.len())
            .unwrap_or(0)
    }

    pub fn definition_listener_count(&self, event: &str, definition_name: &str) -> usize {
        self.definition
            .read()
            .expect("definition listener table poisoned")
            .get(&(event.to_string(), definition_name.to_string()))
            .map(|l| l.len())
            .unwrap_or(0)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(counter: Arc<AtomicUsize>) -> EventHandler {
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn default_global_events_are_recognized() {
        let registry = EventRegistry::new();
        assert!(registry.is_global_event("serviceStarted"));
        assert!(!registry.is_global_event("tileUpdated"));
    }

    #[test]
    fn system_listeners_fire_on_emit() {
        let registry = EventRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        registry.add_system_listener("serviceStarted", counting_handler(count.clone()));

        registry.emit_system("serviceStarted", &serde_json::json!({}));
        registry.emit_system("serviceStopped", &serde_json::json!({}));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn definition_listeners_are_scoped_by_name() {
        let registry = EventRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        registry.add_definition_listener(
            "tileUpdated",
            "weather",
            counting_handler(count.clone()),
            "test listener",
        );

        registry.emit_definition("tileUpdated", "weather", &serde_json::json!({}));
        registry.emit_definition("tileUpdated", "calendar", &serde_json::json!({}));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(registry.definition_listener_count("tileUpdated", "weather"), 1);
        assert_eq!(registry.definition_listener_count("tileUpdated", "calendar"), 0);
    }
}
