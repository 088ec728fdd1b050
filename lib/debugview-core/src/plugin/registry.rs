use crate::error::DebugViewError;
use crate::plugin::DebugPlugin;
use indexmap::IndexMap;
use log::{debug, trace, warn};
use std::cell::RefCell;

/// Builds a plugin instance. A factory may fail, e.g. when a plugin needs a capability the
/// host does not provide.
pub type PluginFactory = fn() -> Result<Box<dyn DebugPlugin>, String>;

/// Plugins registered for this process, in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    factories: RefCell<IndexMap<String, PluginFactory>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `id` unless that id is already taken.
    /// Returns whether the factory was added.
    pub fn register_once(&self, id: &str, factory: PluginFactory) -> bool {
        let mut factories = self.factories.borrow_mut();
        if factories.contains_key(id) {
            trace!("Plugin {id} already registered");
            return false;
        }
        factories.insert(id.to_string(), factory);
        debug!("Registered plugin {id}");
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.borrow().contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.factories.borrow().keys().cloned().collect()
    }

    /// Builds every registered plugin. Factories that fail are logged and skipped.
    pub fn instantiate_all(&self) -> Vec<Box<dyn DebugPlugin>> {
        // Copy the table so a factory can register further plugins
        let factories: Vec<(String, PluginFactory)> = self
            .factories
            .borrow()
            .iter()
            .map(|(id, factory)| (id.clone(), *factory))
            .collect();

        factories
            .into_iter()
            .filter_map(|(id, factory)| match factory() {
                Ok(plugin) => Some(plugin),
                Err(reason) => {
                    warn!("{}", DebugViewError::PluginLoad { id, reason });
                    None
                }
            })
            .collect()
    }
}

#[derive(Clone, Copy)]
pub struct PluginDescriptor {
    pub id: &'static str,
    pub factory: PluginFactory,
}

impl PluginDescriptor {
    pub const fn new(id: &'static str, factory: PluginFactory) -> Self {
        Self { id, factory }
    }
}

/// The plugins a host application was built with.
#[derive(Clone, Default)]
pub struct PluginCatalog {
    descriptors: Vec<PluginDescriptor>,
}

impl PluginCatalog {
    pub fn new(descriptors: Vec<PluginDescriptor>) -> Self {
        Self { descriptors }
    }

    pub fn find(&self, id: &str) -> Option<&PluginDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    /// Registers every id in `ids` that this catalog can build. Ids without a factory are
    /// logged and returned; they do not stop the remaining registrations.
    pub fn register_optional(&self, registry: &PluginRegistry, ids: &[String]) -> Vec<String> {
        let mut missing = Vec::new();
        for id in ids {
            match self.find(id) {
                Some(descriptor) => {
                    registry.register_once(descriptor.id, descriptor.factory);
                }
                None => {
                    warn!("{}", DebugViewError::PluginMissing(id.clone()));
                    missing.push(id.clone());
                }
            }
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{PluginContainer, PluginContext};
    use std::any::Any;

    struct NamedPlugin(&'static str);

    impl DebugPlugin for NamedPlugin {
        fn id(&self) -> &str {
            self.0
        }
        fn on_load(&mut self, _ctx: &PluginContext, _container: &PluginContainer) {}
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn log_view() -> Result<Box<dyn DebugPlugin>, String> {
        Ok(Box::new(NamedPlugin("log_view")))
    }

    fn device_info() -> Result<Box<dyn DebugPlugin>, String> {
        Ok(Box::new(NamedPlugin("device_info")))
    }

    fn broken() -> Result<Box<dyn DebugPlugin>, String> {
        Err("needs a capability the host lacks".to_string())
    }

    #[test]
    fn test_register_once_keeps_first_factory() {
        let registry = PluginRegistry::new();
        assert!(registry.register_once("log_view", log_view));
        assert!(!registry.register_once("log_view", device_info));

        let plugins = registry.instantiate_all();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].id(), "log_view");
    }

    #[test]
    fn test_instantiate_all_skips_failing_factories() {
        let registry = PluginRegistry::new();
        registry.register_once("log_view", log_view);
        registry.register_once("broken", broken);
        registry.register_once("device_info", device_info);

        let ids: Vec<String> = registry
            .instantiate_all()
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        assert_eq!(ids, vec!["log_view", "device_info"]);
    }

    #[test]
    fn test_catalog_registers_known_ids_and_reports_missing() {
        let catalog = PluginCatalog::new(vec![
            PluginDescriptor::new("log_view", log_view),
            PluginDescriptor::new("device_info", device_info),
        ]);
        let registry = PluginRegistry::new();
        let ids = vec![
            "log_view".to_string(),
            "page_task_top".to_string(),
            "device_info".to_string(),
        ];

        let missing = catalog.register_optional(&registry, &ids);

        assert_eq!(missing, vec!["page_task_top".to_string()]);
        assert_eq!(registry.ids(), vec!["log_view", "device_info"]);

        // A second pass registers nothing new
        catalog.register_optional(&registry, &ids);
        assert_eq!(registry.ids().len(), 2);
    }
}
