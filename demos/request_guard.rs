//! # Request Guard Example
//!
//! Demonstrates a request pipeline that depends only on the `Authorizer` trait:
//! each route declares the assertion it requires, and every request carries the
//! authorization of its caller.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example request_guard
//! ```

use claimguard::claims::MemoryCache;
use claimguard::{Assertion, Authorization, Authorizer, PermissionsChecker, PermissionsModel};
use std::sync::Arc;

const MODEL: &str = r#"
[[tokens]]
name = "admin"
includes = ["role:editor"]

[[tokens]]
name = "suspended"

[[composites]]
name = "role"

[[composites.tokens]]
name = "editor"
includes = ["role:viewer"]

[[composites.tokens]]
name = "viewer"

[[composites]]
name = "doc"

[[composites.tokens]]
name = "readme"

[[composites.tokens]]
name = "roadmap"
"#;

struct Route {
    method: &'static str,
    path: &'static str,
    required: Assertion,
}

struct Request {
    caller: &'static str,
    authorization: Authorization,
    method: &'static str,
    path: &'static str,
}

struct Guard {
    authorizer: Arc<dyn Authorizer>,
    routes: Vec<Route>,
}

impl Guard {
    fn handle(&self, request: &Request) -> anyhow::Result<u16> {
        let Some(route) = self
            .routes
            .iter()
            .find(|route| route.method == request.method && route.path == request.path)
        else {
            return Ok(404);
        };

        let result = self
            .authorizer
            .authorize(&request.authorization, &route.required)?;
        match result.failed() {
            None => Ok(200),
            Some(failed) => {
                println!("    {} lacks {}", request.caller, failed);
                Ok(403)
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let model = PermissionsModel::from_toml(MODEL)?;
    let checker = PermissionsChecker::new(model).with_cache(Arc::new(MemoryCache::new()));

    let guard = Guard {
        authorizer: Arc::new(checker),
        routes: vec![
            Route {
                method: "GET",
                path: "/docs/readme",
                required: "role:viewer@doc:readme !suspended".parse()?,
            },
            Route {
                method: "PUT",
                path: "/docs/roadmap",
                required: "role:editor@doc:roadmap !suspended".parse()?,
            },
            Route {
                method: "DELETE",
                path: "/docs/roadmap",
                required: "admin".parse()?,
            },
        ],
    };

    let requests = [
        Request {
            caller: "alice",
            authorization: "admin role:editor@doc:roadmap".parse()?,
            method: "DELETE",
            path: "/docs/roadmap",
        },
        Request {
            caller: "bob",
            authorization: "role:editor@doc:roadmap role:viewer@doc:readme".parse()?,
            method: "PUT",
            path: "/docs/roadmap",
        },
        Request {
            caller: "carol",
            authorization: "role:viewer@doc:readme suspended".parse()?,
            method: "GET",
            path: "/docs/readme",
        },
        Request {
            caller: "dave",
            authorization: "role:viewer@doc:roadmap".parse()?,
            method: "PUT",
            path: "/docs/roadmap",
        },
        Request {
            caller: "erin",
            authorization: Authorization::empty(),
            method: "GET",
            path: "/nowhere",
        },
    ];

    for request in &requests {
        let status = guard.handle(request)?;
        println!(
            "{:<6} {:<7} {:<14} -> {}",
            request.caller, request.method, request.path, status
        );
    }

    Ok(())
}
