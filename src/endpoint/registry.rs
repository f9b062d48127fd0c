//! Name → endpoint lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::endpoint::{Endpoint, EndpointRef, Handler};

/// Resolves fully qualified names (`Admin::Users`) to endpoints.
pub trait Registry: Send + Sync {
    fn lookup(&self, qualified: &str) -> Option<EndpointRef>;
}

/// In-memory [`Registry`].
///
/// Registering `Dragons::Types::Create` makes `Dragons` and `Dragons::Types`
/// addressable as namespaces unless they are registered themselves.
#[derive(Clone, Default)]
pub struct EndpointRegistry {
    entries: HashMap<String, EndpointRef>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint under `name`.
    pub fn register(&mut self, name: &str, endpoint: impl Endpoint + 'static) -> &mut Self {
        self.register_handler(name, Arc::new(endpoint))
    }

    /// Register an already shared handler under `name`.
    pub fn register_handler(&mut self, name: &str, handler: Handler) -> &mut Self {
        let name = normalize(name);
        self.add_parents(&name);
        self.entries
            .insert(name.clone(), EndpointRef::new(name, handler));
        self
    }

    /// Declare a namespace without a handler.
    pub fn namespace(&mut self, name: &str) -> &mut Self {
        let name = normalize(name);
        self.add_parents(&name);
        self.entries
            .entry(name.clone())
            .or_insert_with(|| EndpointRef::namespace(name));
        self
    }

    /// Builder-style [`EndpointRegistry::register`].
    pub fn with(mut self, name: &str, endpoint: impl Endpoint + 'static) -> Self {
        self.register(name, endpoint);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn add_parents(&mut self, name: &str) {
        let mut end = 0;
        while let Some(pos) = name[end..].find("::") {
            let parent = &name[..end + pos];
            self.entries
                .entry(parent.to_string())
                .or_insert_with(|| EndpointRef::namespace(parent));
            end += pos + 2;
        }
    }
}

impl Registry for EndpointRegistry {
    fn lookup(&self, qualified: &str) -> Option<EndpointRef> {
        self.entries.get(normalize(qualified).as_str()).cloned()
    }
}

impl<R: Registry + ?Sized> Registry for Arc<R> {
    fn lookup(&self, qualified: &str) -> Option<EndpointRef> {
        (**self).lookup(qualified)
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_start_matches("::").to_string()
}
