use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ── Intents ───────────────────────────────────────────────────────────────────

/// Names a service (action + target package) or carries a broadcast payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Intent {
    pub action: String,
    pub package: Option<String>,
    #[serde(default)]
    pub extras: BTreeMap<String, JsonValue>,
}

impl Intent {
    pub fn new(action: impl Into<String>) -> Self {
        Self { action: action.into(), package: None, extras: BTreeMap::new() }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_int_extra(mut self, key: impl Into<String>, value: i64) -> Self {
        self.extras.insert(key.into(), JsonValue::from(value));
        self
    }

    /// Integer extra, or `default` when missing or not an integer.
    pub fn int_extra(&self, key: &str, default: i64) -> i64 {
        self.extras.get(key).and_then(JsonValue::as_i64).unwrap_or(default)
    }
}

/// Concrete component a connection was resolved to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ComponentName {
    pub package: String,
    pub class: String,
}

impl ComponentName {
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self { package: package.into(), class: class.into() }
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

// ── Binder ────────────────────────────────────────────────────────────────────

/// Type-erased handle to a connected remote service.
///
/// Hosts wrap whatever proxy object they produce; the SDK converts it back to
/// the typed contract with [`Binder::downcast`].
#[derive(Clone)]
pub struct Binder(Arc<dyn Any + Send + Sync>);

impl Binder {
    pub fn new<S: Any + Send + Sync>(service: S) -> Self {
        Self(Arc::new(service))
    }

    pub fn downcast<S: Any + Clone>(&self) -> Option<S> {
        self.0.downcast_ref::<S>().cloned()
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder").finish_non_exhaustive()
    }
}
