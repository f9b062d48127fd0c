//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check methods, paths, redirect targets and statuses
//! - Detect duplicate route names across the whole mount tree
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SignpostConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{MountConfig, RedirectConfig, RouteConfig, SignpostConfig};
use crate::routing::method::Method;

/// One semantic problem, located by its field path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// e.g. `mounts[0].routes[2].method`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SignpostConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    if config.router.params_key.trim().is_empty() {
        errors.push(ValidationError::new("router.params_key", "must not be empty"));
    }
    if !is_redirect_status(config.router.default_redirect_status) {
        errors.push(ValidationError::new(
            "router.default_redirect_status",
            format!("{} is not a 3xx status", config.router.default_redirect_status),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    validate_scope(
        "",
        &config.routes,
        &config.redirects,
        &config.mounts,
        &mut names,
        &mut errors,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Methods a route entry declares; `ANY` expands to all of them.
pub(crate) fn route_methods(route: &RouteConfig) -> Result<Vec<Method>, String> {
    let declared: Vec<&str> = match (&route.method, route.methods.is_empty()) {
        (Some(_), false) => return Err("set either `method` or `methods`, not both".into()),
        (Some(method), true) => vec![method.as_str()],
        (None, false) => route.methods.iter().map(String::as_str).collect(),
        (None, true) => vec!["GET"],
    };

    let mut methods = Vec::new();
    for name in declared {
        if name.eq_ignore_ascii_case("any") {
            return Ok(Method::ALL.to_vec());
        }
        let method: Method = name.parse().map_err(|e| format!("{e}"))?;
        if !methods.contains(&method) {
            methods.push(method);
        }
    }
    Ok(methods)
}

fn validate_scope(
    prefix: &str,
    routes: &[RouteConfig],
    redirects: &[RedirectConfig],
    mounts: &[MountConfig],
    names: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    for (i, route) in routes.iter().enumerate() {
        let field = format!("{prefix}routes[{i}]");
        check_path(&field, &route.path, errors);
        if let Err(message) = route_methods(route) {
            errors.push(ValidationError::new(format!("{field}.method"), message));
        }
        if let Some(name) = &route.name {
            if !names.insert(name.clone()) {
                errors.push(ValidationError::new(
                    format!("{field}.name"),
                    format!("duplicate route name `{name}`"),
                ));
            }
        }
    }

    for (i, redirect) in redirects.iter().enumerate() {
        let field = format!("{prefix}redirects[{i}]");
        check_path(&field, &redirect.path, errors);
        match (&redirect.to, &redirect.to_route) {
            (Some(_), Some(_)) => errors.push(ValidationError::new(
                field.clone(),
                "set either `to` or `to_route`, not both",
            )),
            (None, None) => errors.push(ValidationError::new(
                field.clone(),
                "one of `to` or `to_route` is required",
            )),
            _ => {}
        }
        if let Some(status) = redirect.status {
            if !is_redirect_status(status) {
                errors.push(ValidationError::new(
                    format!("{field}.status"),
                    format!("{status} is not a 3xx status"),
                ));
            }
        }
        if let Some(additional) = &redirect.additional {
            if !matches!(additional.as_str(), "ignore" | "append") {
                errors.push(ValidationError::new(
                    format!("{field}.additional"),
                    format!("unknown policy `{additional}` (expected `ignore` or `append`)"),
                ));
            }
        }
    }

    for (i, mount) in mounts.iter().enumerate() {
        let field = format!("{prefix}mounts[{i}]");
        check_path(&field, &mount.path, errors);
        validate_scope(
            &format!("{field}."),
            &mount.routes,
            &mount.redirects,
            &mount.mounts,
            names,
            errors,
        );
    }
}

fn check_path(field: &str, path: &str, errors: &mut Vec<ValidationError>) {
    if !path.starts_with('/') {
        errors.push(ValidationError::new(
            format!("{field}.path"),
            format!("`{path}` must start with `/`"),
        ));
    }
}

fn is_redirect_status(status: u16) -> bool {
    (300..400).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> SignpostConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = parse(
            r#"
            [[routes]]
            path = "/users/:id"
            to = "users#show"
            name = "user"

            [[redirects]]
            path = "/people/:id"
            to_route = "user"
            status = 301
            "#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let config = parse(
            r#"
            [router]
            default_redirect_status = 200

            [[routes]]
            method = "TRACE"
            path = "users"

            [[redirects]]
            path = "/a"
            additional = "drop"

            [[redirects]]
            path = "/b"
            to = "/c"
            to_route = "c"
            status = 404
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "router.default_redirect_status",
                "routes[0].path",
                "routes[0].method",
                "redirects[0]",
                "redirects[0].additional",
                "redirects[1]",
                "redirects[1].status",
            ]
        );
    }

    #[test]
    fn test_duplicate_names_across_mounts() {
        let config = parse(
            r#"
            [[routes]]
            path = "/users"
            name = "users"

            [[mounts]]
            path = "/admin"

            [[mounts.routes]]
            path = "/users"
            name = "users"
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "mounts[0].routes[0].name");
        assert_eq!(errors[0].to_string(), "mounts[0].routes[0].name: duplicate route name `users`");
    }

    #[test]
    fn test_route_methods() {
        let route = RouteConfig {
            path: "/".into(),
            ..Default::default()
        };
        assert_eq!(route_methods(&route).unwrap(), vec![Method::Get]);

        let route = RouteConfig {
            methods: vec!["post".into(), "PUT".into(), "POST".into()],
            ..route
        };
        assert_eq!(route_methods(&route).unwrap(), vec![Method::Post, Method::Put]);

        let route = RouteConfig {
            method: Some("any".into()),
            methods: vec![],
            ..route
        };
        assert_eq!(route_methods(&route).unwrap().len(), 6);

        let route = RouteConfig {
            methods: vec!["GET".into()],
            ..route
        };
        assert!(route_methods(&route).is_err());
    }
}
