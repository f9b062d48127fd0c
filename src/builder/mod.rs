//! Route builder.
//!
//! # Data Flow
//! ```text
//! Builder calls (get/post/.../redirect/within/namespace)
//!     → sign.rs descriptors, in declaration order
//!     → build(): compile each descriptor
//!         Path     → Pattern + resolved endpoint + middleware chain
//!         Redirect → Pattern + RedirectEndpoint (every method)
//!         Nested   → child Builder compiled as a non-root Router
//!     → RoutingTable + NamedRoutes → immutable Router
//! ```
//!
//! # Design Decisions
//! - Declaring routes never resolves anything; all failures surface from
//!   `build()` as a `RoutingError`
//! - `namespace` is flat (its routes join the enclosing table), `within`
//!   mounts a separate router
//! - Route names are unique across the whole tree

pub mod sign;

use std::collections::HashMap;
use std::sync::Arc;

use crate::endpoint::chain::Middleware;
use crate::endpoint::Registry;
use crate::error::{RoutingError, RoutingResult};
use crate::observability::metrics;
use crate::routing::method::Method;
use crate::routing::route::{NestedRoute, Route, TableEntry};
use crate::routing::router::{NamedRoutes, Router, RouterOptions, RoutingTable};

pub use sign::{PathSign, RedirectSign};

use sign::{CompileScope, NestedSign, Sign};

/// Accumulates route declarations and compiles them into a [`Router`].
pub struct Builder {
    options: RouterOptions,
    registry: Arc<dyn Registry>,
    prefix: String,
    namespace: Vec<String>,
    nested: bool,
    middlewares: Vec<Middleware>,
    signs: Vec<Sign>,
}

impl Builder {
    /// A root builder with default options.
    pub fn new(registry: impl Registry + 'static) -> Self {
        Self::with_options(Arc::new(registry), RouterOptions::default())
    }

    pub fn with_options(registry: Arc<dyn Registry>, options: RouterOptions) -> Self {
        Self {
            options,
            registry,
            prefix: "/".to_string(),
            namespace: Vec::new(),
            nested: false,
            middlewares: Vec::new(),
            signs: Vec::new(),
        }
    }

    pub fn router_options(&self) -> &RouterOptions {
        &self.options
    }

    pub fn get(&mut self, path: &str) -> &mut PathSign {
        self.path(path, vec![Method::Get])
    }

    pub fn post(&mut self, path: &str) -> &mut PathSign {
        self.path(path, vec![Method::Post])
    }

    pub fn put(&mut self, path: &str) -> &mut PathSign {
        self.path(path, vec![Method::Put])
    }

    pub fn patch(&mut self, path: &str) -> &mut PathSign {
        self.path(path, vec![Method::Patch])
    }

    pub fn options(&mut self, path: &str) -> &mut PathSign {
        self.path(path, vec![Method::Options])
    }

    pub fn delete(&mut self, path: &str) -> &mut PathSign {
        self.path(path, vec![Method::Delete])
    }

    /// Every method, narrowed with [`PathSign::via`].
    pub fn any(&mut self, path: &str) -> &mut PathSign {
        self.path(path, Method::ALL.to_vec())
    }

    /// `GET` on the scope root, tried before anything else in the scope.
    pub fn root(&mut self) -> &mut PathSign {
        let mut sign = PathSign::new(self.absolute("/"), vec![Method::Get], self.namespace.clone());
        if !self.nested || !self.namespace.is_empty() {
            sign.name("root");
        }
        self.signs.insert(0, Sign::Path(sign));
        match &mut self.signs[0] {
            Sign::Path(sign) => sign,
            _ => unreachable!("root sign was just inserted"),
        }
    }

    pub fn redirect(&mut self, path: &str) -> &mut RedirectSign {
        let sign = RedirectSign::new(self.absolute(path));
        self.signs.push(Sign::Redirect(sign));
        match self.signs.last_mut() {
            Some(Sign::Redirect(sign)) => sign,
            _ => unreachable!("redirect sign was just pushed"),
        }
    }

    /// Mount a separate router under `prefix`.
    ///
    /// Middleware registered inside stays inside; the enclosing scope's
    /// middleware still wraps every nested route.
    pub fn within(&mut self, prefix: &str, f: impl FnOnce(&mut Builder)) -> &mut Self {
        let subpath = self.absolute(prefix);
        let mut child = Builder {
            options: self.options.clone(),
            registry: self.registry.clone(),
            prefix: subpath.clone(),
            namespace: self.namespace.clone(),
            nested: true,
            middlewares: Vec::new(),
            signs: Vec::new(),
        };
        f(&mut child);

        self.signs.push(Sign::Nested(NestedSign {
            subpath,
            builder: child,
            middlewares: Vec::new(),
        }));
        self
    }

    /// Prefix paths, endpoint names and route names with `name`.
    ///
    /// The routes join this builder's table directly.
    pub fn namespace(&mut self, name: &str, f: impl FnOnce(&mut Builder)) -> &mut Self {
        let mut namespace = self.namespace.clone();
        namespace.push(name.trim_matches('/').to_string());
        let mut child = Builder {
            options: self.options.clone(),
            registry: self.registry.clone(),
            prefix: self.absolute(name),
            namespace,
            nested: self.nested,
            middlewares: Vec::new(),
            signs: Vec::new(),
        };
        f(&mut child);

        for mut sign in child.signs {
            sign.prepend_middlewares(&child.middlewares);
            self.signs.push(sign);
        }
        self
    }

    /// Wrap every route of this scope, registered before or after.
    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    /// Declared entries so far.
    pub fn len(&self) -> usize {
        self.signs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }

    /// Compile into a root router.
    pub fn build(self) -> RoutingResult<Router> {
        let names = NamedRoutes::new();
        let (router, index) = self.compile(&names, &[], true)?;
        names.fill(index);

        tracing::info!(
            routes = router.routes().len(),
            named = router.named_routes().len(),
            get = router.routes().get(Method::Get).len(),
            post = router.routes().get(Method::Post).len(),
            put = router.routes().get(Method::Put).len(),
            patch = router.routes().get(Method::Patch).len(),
            options = router.routes().get(Method::Options).len(),
            delete = router.routes().get(Method::Delete).len(),
            "Router built"
        );
        metrics::record_route_count(router.routes().len());
        Ok(router)
    }

    /// Compile this scope. `names` is the root's index, shared by every
    /// redirect and action endpoint in the tree.
    fn compile(
        self,
        names: &NamedRoutes,
        inherited: &[Middleware],
        root: bool,
    ) -> RoutingResult<(Router, HashMap<String, Arc<Route>>)> {
        let mut stack = inherited.to_vec();
        stack.extend(self.middlewares.iter().cloned());

        let scope = CompileScope {
            options: &self.options,
            registry: &self.registry,
            middlewares: &stack,
            names,
        };

        let mut table = RoutingTable::new();
        let mut index = HashMap::new();

        for sign in self.signs {
            match sign {
                Sign::Path(sign) => {
                    let (methods, route) = sign.compile(&scope)?;
                    let route = Arc::new(route);
                    if let Some(name) = route.name() {
                        register(&mut index, name.to_string(), route.clone())?;
                    }
                    for method in methods {
                        table.push(method, TableEntry::Simple(route.clone()));
                    }
                }
                Sign::Redirect(sign) => {
                    let route = Arc::new(sign.compile(&scope)?);
                    for method in Method::ALL {
                        table.push(method, TableEntry::Simple(route.clone()));
                    }
                }
                Sign::Nested(nested) => {
                    let mut child_stack = stack.clone();
                    child_stack.extend(nested.middlewares);
                    let (router, child_index) = nested.builder.compile(names, &child_stack, false)?;
                    for (name, route) in child_index {
                        register(&mut index, name, route)?;
                    }

                    let mounted = Arc::new(NestedRoute::new(nested.subpath, Arc::new(router)));
                    for method in Method::ALL {
                        if mounted.router().routes().has_routes(method) {
                            table.push(method, TableEntry::Nested(mounted.clone()));
                        }
                    }
                }
            }
        }

        let own = if root {
            names.clone()
        } else {
            let own = NamedRoutes::new();
            own.fill(index.clone());
            own
        };

        Ok((Router::new(table, own, self.options, root), index))
    }

    fn path(&mut self, path: &str, methods: Vec<Method>) -> &mut PathSign {
        let sign = PathSign::new(self.absolute(path), methods, self.namespace.clone());
        self.signs.push(Sign::Path(sign));
        match self.signs.last_mut() {
            Some(Sign::Path(sign)) => sign,
            _ => unreachable!("path sign was just pushed"),
        }
    }

    /// Join `path` onto the scope prefix (`/admin` + `/` → `/admin/`).
    fn absolute(&self, path: &str) -> String {
        let relative = path.strip_prefix('/').unwrap_or(path);
        if self.prefix.ends_with('/') {
            format!("{}{}", self.prefix, relative)
        } else {
            format!("{}/{}", self.prefix, relative)
        }
    }
}

fn register(
    index: &mut HashMap<String, Arc<Route>>,
    name: String,
    route: Arc<Route>,
) -> RoutingResult<()> {
    if index.contains_key(&name) {
        return Err(RoutingError::DuplicateRouteName(name));
    }
    index.insert(name, route);
    Ok(())
}
