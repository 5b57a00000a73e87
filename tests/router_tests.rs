// tests/router_tests.rs
use ollama_proxy::registry::{parse_instances, BackendRegistry};
use ollama_proxy::router::{Route, RouteResolver};
use std::sync::Arc;

fn resolver(spec: &str) -> RouteResolver {
    RouteResolver::new(Arc::new(BackendRegistry::new(&parse_instances(spec))))
}

#[test]
fn known_prefix_routes_to_that_backend() {
    let resolver = resolver("a:localhost:11434,b:localhost:11435");

    assert_eq!(
        resolver.resolve("/a/api/tags"),
        Route::Forward {
            base_url: "http://localhost:11434".to_string(),
            forward_path: "api/tags".to_string(),
            instance: "a".to_string(),
        }
    );
    assert_eq!(
        resolver.resolve("/b/api/generate"),
        Route::Forward {
            base_url: "http://localhost:11435".to_string(),
            forward_path: "api/generate".to_string(),
            instance: "b".to_string(),
        }
    );
}

#[test]
fn unknown_prefix_keeps_full_path_to_default() {
    let resolver = resolver("a:localhost:11434,b:localhost:11435");

    // The first segment was never an instance selector, so it stays.
    assert_eq!(
        resolver.resolve("/unknown/api/tags"),
        Route::Forward {
            base_url: "http://localhost:11434".to_string(),
            forward_path: "unknown/api/tags".to_string(),
            instance: "default".to_string(),
        }
    );
}

#[test]
fn bare_api_path_goes_to_default() {
    let resolver = resolver("a:localhost:11434");

    assert_eq!(
        resolver.resolve("/api/tags"),
        Route::Forward {
            base_url: "http://localhost:11434".to_string(),
            forward_path: "api/tags".to_string(),
            instance: "default".to_string(),
        }
    );
}

#[test]
fn root_is_answered_locally() {
    let resolver = resolver("a:localhost:11434");

    assert_eq!(resolver.resolve("/"), Route::ServiceInfo);
}

#[test]
fn top_level_health_is_answered_locally() {
    let resolver = resolver("a:localhost:11434");

    assert_eq!(resolver.resolve("/health"), Route::Health);
}

#[test]
fn health_behind_instance_prefix_is_forwarded() {
    let resolver = resolver("a:localhost:11434");

    assert_eq!(
        resolver.resolve("/a/health"),
        Route::Forward {
            base_url: "http://localhost:11434".to_string(),
            forward_path: "health".to_string(),
            instance: "a".to_string(),
        }
    );
}

#[test]
fn health_with_remainder_is_not_a_health_check() {
    let resolver = resolver("a:localhost:11434");

    assert_eq!(
        resolver.resolve("/health/extra"),
        Route::Forward {
            base_url: "http://localhost:11434".to_string(),
            forward_path: "health/extra".to_string(),
            instance: "default".to_string(),
        }
    );
}

#[test]
fn instance_named_health_shadows_the_health_endpoint() {
    let resolver = resolver("health:localhost:9999");

    assert_eq!(
        resolver.resolve("/health"),
        Route::Forward {
            base_url: "http://localhost:9999".to_string(),
            forward_path: String::new(),
            instance: "health".to_string(),
        }
    );
}

#[test]
fn single_segment_instance_path_forwards_with_empty_path() {
    let resolver = resolver("a:localhost:11434");

    assert_eq!(
        resolver.resolve("/a"),
        Route::Forward {
            base_url: "http://localhost:11434".to_string(),
            forward_path: String::new(),
            instance: "a".to_string(),
        }
    );
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn segments() -> impl Strategy<Value = String> {
        proptest::collection::vec("[a-z0-9._-]{1,12}", 1..4).prop_map(|v| v.join("/"))
    }

    proptest! {
        #[test]
        fn configured_prefixes_always_route_to_their_backend(
            name in "[a-z][a-z0-9-]{1,10}",
            port in 1024u32..65536,
            path in segments(),
        ) {
            let resolver = resolver(&format!("{}:{}", name, port));

            prop_assert_eq!(
                resolver.resolve(&format!("/{}/{}", name, path)),
                Route::Forward {
                    base_url: format!("http://localhost:{}", port),
                    forward_path: path,
                    instance: name,
                }
            );
        }

        #[test]
        fn unrecognized_prefixes_never_lose_their_first_segment(
            first in "[a-z][a-z0-9-]{1,10}",
            rest in segments(),
        ) {
            prop_assume!(first != "configured" && first != "health");

            let resolver = resolver("configured:localhost:11434");
            let full = format!("{}/{}", first, rest);

            prop_assert_eq!(
                resolver.resolve(&format!("/{}", full)),
                Route::Forward {
                    base_url: "http://localhost:11434".to_string(),
                    forward_path: full,
                    instance: "default".to_string(),
                }
            );
        }
    }
}
