//! Navigation parameters shared between screens.
//!
//! Screens can be opened with parameters (for example a list of order IDs
//! coming from a collection) and can ask for those parameters to be cleared.

use std::collections::HashMap;

/// Read and write access to the current navigation parameters.
pub trait RouteParams {
    /// Get a parameter value. Empty values count as absent.
    fn get_param(&self, name: &str) -> Option<String>;

    /// Set or clear parameters. `None` removes the parameter.
    fn set_params(&mut self, params: HashMap<String, Option<String>>);
}

/// In-memory navigation context owned by the application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationContext {
    params: HashMap<String, String>,
}

impl NavigationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context with one parameter set.
    pub fn with_param(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = HashMap::new();
        params.insert(name.into(), value.into());
        Self { params }
    }
}

impl RouteParams for NavigationContext {
    fn get_param(&self, name: &str) -> Option<String> {
        self.params.get(name).filter(|v| !v.is_empty()).cloned()
    }

    fn set_params(&mut self, params: HashMap<String, Option<String>>) {
        for (name, value) in params {
            match value {
                Some(value) => {
                    self.params.insert(name, value);
                }
                None => {
                    self.params.remove(&name);
                }
            }
        }
    }
}
