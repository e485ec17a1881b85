use crate::config::{Configuration, Field};
use crate::error::ConfigError;

type Handler = Box<dyn FnMut(Field, &Configuration)>;

/// The one mutable configuration, edited by the user between and during runs.
///
/// Handlers registered with `on_change` fire synchronously after a value is
/// committed. Runs never see this object, only snapshots of it.
pub struct LiveConfig {
    config: Configuration,
    handlers: Vec<(Field, Handler)>,
}

impl LiveConfig {
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            handlers: Vec::new(),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn on_change(&mut self, field: Field, handler: impl FnMut(Field, &Configuration) + 'static) {
        self.handlers.push((field, Box::new(handler)));
    }

    /// Subscribes one handler to every field.
    pub fn on_any_change(&mut self, handler: impl FnMut(Field, &Configuration) + Clone + 'static) {
        for field in Field::all() {
            self.on_change(field, handler.clone());
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<Field, ConfigError> {
        let before = self.config.clone();
        let field = self.config.assign(key, value)?;
        if self.config != before {
            self.notify(field);
        }
        Ok(field)
    }

    /// Applies an edit through a closure and notifies `field` subscribers.
    pub fn update(
        &mut self,
        field: Field,
        edit: impl FnOnce(&mut Configuration),
    ) -> Result<(), ConfigError> {
        let mut next = self.config.clone();
        edit(&mut next);
        next.validate_field(field)?;
        if next != self.config {
            self.config = next;
            self.notify(field);
        }
        Ok(())
    }

    fn notify(&mut self, field: Field) {
        let config = &self.config;
        for (subscribed, handler) in &mut self.handlers {
            if *subscribed == field {
                handler(field, config);
            }
        }
    }
}
