//! Configuration → router.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::builder::Builder;
use crate::config::loader::ConfigError;
use crate::config::schema::{MountConfig, RedirectConfig, RouteConfig, SignpostConfig};
use crate::config::validation::{route_methods, validate_config, ValidationError};
use crate::endpoint::Registry;
use crate::routing::pattern::{AdditionalValues, Capture};
use crate::routing::router::Router;

/// Validate `config` and compile it into a root [`Router`].
///
/// Within each scope, routes come first, then redirects, then mounts.
pub fn compile(config: &SignpostConfig, registry: Arc<dyn Registry>) -> Result<Router, ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)?;

    let mut builder = Builder::with_options(registry, config.router.clone());
    declare(&mut builder, &config.routes, &config.redirects, &config.mounts)?;
    Ok(builder.build()?)
}

fn declare(
    builder: &mut Builder,
    routes: &[RouteConfig],
    redirects: &[RedirectConfig],
    mounts: &[MountConfig],
) -> Result<(), ConfigError> {
    for route in routes {
        let methods = route_methods(route).map_err(|message| {
            ConfigError::Validation(vec![ValidationError {
                field: route.path.clone(),
                message,
            }])
        })?;

        let sign = builder.any(&route.path);
        sign.via(&methods);
        if let Some(to) = &route.to {
            sign.to(to.as_str());
        }
        if let Some(name) = &route.name {
            sign.name(name);
        }
        if !route.params.is_empty() {
            sign.params(route.params.iter().map(|(k, v)| (k.clone(), v)));
        }
        if let Some(capture) = &route.capture {
            sign.capture(Capture::from(capture));
        }
        if let Some(except) = &route.except {
            sign.except(except);
        }
    }

    for redirect in redirects {
        let sign = builder.redirect(&redirect.path);
        match (&redirect.to, &redirect.to_route) {
            (Some(to), _) => {
                let additional = match redirect.additional.as_deref() {
                    Some("append") => Some(AdditionalValues::Append),
                    Some(_) => Some(AdditionalValues::Ignore),
                    None => None,
                };
                match additional {
                    Some(additional) => sign.to_path_with(to, additional),
                    None => sign.to_path(to),
                };
            }
            (None, Some(name)) => {
                sign.to_named(name);
            }
            (None, None) => {}
        }
        if let Some(status) = redirect.status.and_then(|s| StatusCode::from_u16(s).ok()) {
            sign.with_status(status);
        }
    }

    for mount in mounts {
        let mut result = Ok(());
        builder.within(&mount.path, |nested| {
            result = declare(nested, &mount.routes, &mount.redirects, &mount.mounts);
        });
        result?;
    }
    Ok(())
}
