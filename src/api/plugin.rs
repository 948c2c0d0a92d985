//! Purpose: Extension hooks run at startup and on device events.
//! Exports: `Plugin`, `PluginPipeline`.
//! Role: Holds registered plugins; the application drives startup and event fan-out.
//! Invariants: Startup runs sequentially by descending `startup_order`.
//! Invariants: Ties keep registration order.
//! Invariants: The first startup error stops the chain; later plugins do not start.
use serde_json::{Map, Value};

use crate::core::error::Error;

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn startup_order(&self) -> i32 {
        -1
    }

    fn startup(&self) -> Result<(), Error> {
        Ok(())
    }

    fn location_updated(&self, _latitude: f64, _longitude: f64) {}

    fn tag_changed(&self, _tag: &str, _value: Option<&str>) {}

    /// Key under which `object_for_user_response` is collected.
    fn user_key(&self) -> Option<&str> {
        None
    }

    fn object_for_user_response(&self, _response: &Value) -> Option<Value> {
        None
    }
}

#[derive(Default)]
pub struct PluginPipeline {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    pub fn with(mut self, plugin: impl Plugin + 'static) -> Self {
        self.register(Box::new(plugin));
        self
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin names in startup order.
    pub fn startup_sequence(&self) -> Vec<&str> {
        self.ordered().into_iter().map(|plugin| plugin.name()).collect()
    }

    pub fn run_startup(&self) -> Result<(), Error> {
        for plugin in self.ordered() {
            tracing::debug!(
                plugin = plugin.name(),
                order = plugin.startup_order(),
                "starting plugin"
            );
            plugin.startup().inspect_err(|err| {
                tracing::warn!(plugin = plugin.name(), error = %err, "plugin startup failed");
            })?;
        }
        Ok(())
    }

    pub fn location_updated(&self, latitude: f64, longitude: f64) {
        for plugin in &self.plugins {
            plugin.location_updated(latitude, longitude);
        }
    }

    pub fn tag_changed(&self, tag: &str, value: Option<&str>) {
        for plugin in &self.plugins {
            plugin.tag_changed(tag, value);
        }
    }

    /// Objects contributed by plugins that declare a user key.
    pub fn user_objects(&self, response: &Value) -> Map<String, Value> {
        let mut objects = Map::new();
        for plugin in &self.plugins {
            let Some(key) = plugin.user_key() else {
                continue;
            };
            if let Some(object) = plugin.object_for_user_response(response) {
                objects.insert(key.to_string(), object);
            }
        }
        objects
    }

    fn ordered(&self) -> Vec<&dyn Plugin> {
        let mut ordered: Vec<&dyn Plugin> = self.plugins.iter().map(|plugin| &**plugin).collect();
        ordered.sort_by_key(|plugin| std::cmp::Reverse(plugin.startup_order()));
        ordered
    }
}
