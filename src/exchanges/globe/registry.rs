use crate::core::traits::SharedHandler;
use crate::exchanges::globe::types::RoutingKey;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Routing key to handler map owned by one client
///
/// Registration overwrites silently; entries live as long as the client.
/// Lookups clone the handler out, so no lock is held while a handler runs.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<RoutingKey, SharedHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `key`; returns true if it replaced another
    pub fn register(&self, key: RoutingKey, handler: SharedHandler) -> bool {
        debug!(key = %key, "Registering handler");
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, handler)
            .is_some()
    }

    pub fn lookup(&self, key: &RoutingKey) -> Option<SharedHandler> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn contains(&self, key: &RoutingKey) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .map(ToString::to_string)
            .collect();
        f.debug_struct("HandlerRegistry").field("keys", &keys).finish()
    }
}
