use super::*;
use crate::{build_route_spec, Config, Error, RoutesManager};
use clap::Parser;
use route_controller_core::{PortMapping, PortProtocol};
use std::num::NonZeroUsize;

fn mk_manager(api: FakeApi) -> RoutesManager<FakeApi> {
    init_tracing();
    RoutesManager::new(api, Config::default())
}

fn spec_for(vr: &VirtualRouter, route: &Route) -> RouteSpec {
    build_route_spec(vr, route, &mk_nodes(["node-a", "node-b"])).expect("route must convert")
}

#[tokio::test(flavor = "current_thread")]
async fn creates_routes_without_listing() {
    let vr = mk_router(vec![
        mk_http_route("r1", Some(80), "node-a"),
        mk_tcp_route("r2", Some(443), "node-b"),
    ]);
    let manager = mk_manager(FakeApi::default());

    let routes = manager
        .create(&mk_mesh(), &vr, &mk_nodes(["node-a", "node-b"]))
        .await
        .expect("create must succeed");

    assert_eq!(
        manager.api().calls(),
        vec![Call::Create("r1".to_string()), Call::Create("r2".to_string())]
    );
    assert_eq!(routes.keys().collect::<Vec<_>>(), vec!["r1", "r2"]);
    assert_eq!(Some(&routes["r1"]), manager.api().route("r1").as_ref());
    assert_eq!(routes["r2"].spec, spec_for(&vr, &vr.spec.routes[1]));
}

#[tokio::test(flavor = "current_thread")]
async fn create_stops_at_first_failure() {
    let vr = mk_router(vec![
        mk_http_route("r1", None, "node-a"),
        mk_http_route("r2", None, "node-a"),
        mk_http_route("r3", None, "node-a"),
    ]);
    let manager = mk_manager(FakeApi::default().with_failing_create("r2"));

    let error = manager
        .create(&mk_mesh(), &vr, &mk_nodes(["node-a"]))
        .await
        .expect_err("create must fail");

    assert!(matches!(error, Error::Api(ApiError::Other(_))), "{error}");
    assert_eq!(
        manager.api().calls(),
        vec![Call::Create("r1".to_string()), Call::Create("r2".to_string())]
    );
    // Routes created before the failure are kept.
    assert_eq!(manager.api().route_names(), vec!["r1"]);
}

#[tokio::test(flavor = "current_thread")]
async fn create_fails_on_unconvertible_route() {
    let vr = mk_router(vec![mk_http_route("r1", None, "node-missing")]);
    let manager = mk_manager(FakeApi::default());

    let error = manager
        .create(&mk_mesh(), &vr, &mk_nodes(["node-a"]))
        .await
        .expect_err("create must fail");

    match error {
        Error::Conversion { route, source } => {
            assert_eq!(route, "r1");
            assert_eq!(
                source,
                crate::ConversionError::UnknownVirtualNode(ResourceId::new(
                    NAMESPACE.to_string(),
                    "node-missing".to_string()
                ))
            );
        }
        error => panic!("unexpected error: {error}"),
    }
    assert!(manager.api().calls().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn update_is_idempotent() {
    let mut route = mk_http_route("r1", Some(80), "node-a");
    route.http_route.as_mut().unwrap().retry_policy = Some(k8s::HttpRetryPolicy {
        http_retry_events: vec!["server-error".to_string()],
        tcp_retry_events: vec![],
        per_retry_timeout: k8s::Duration::millis(500),
        max_retries: 3,
    });
    let vr = mk_router(vec![route, mk_tcp_route("r2", Some(443), "node-b")]);
    let manager = mk_manager(FakeApi::default());
    let mesh = mk_mesh();
    let nodes = mk_nodes(["node-a", "node-b"]);

    let created = manager.update(&mesh, &vr, &nodes).await.expect("update");
    assert_eq!(
        manager.api().mutations(),
        vec![Call::Create("r1".to_string()), Call::Create("r2".to_string())]
    );
    manager.api().clear_calls();

    // The control plane omits the empty retry events, which must not be
    // mistaken for a change.
    let updated = manager.update(&mesh, &vr, &nodes).await.expect("update");
    assert_eq!(
        manager.api().calls(),
        vec![
            Call::List(None),
            Call::Describe("r1".to_string()),
            Call::Describe("r2".to_string()),
        ]
    );
    assert_eq!(created, updated);
}

#[tokio::test(flavor = "current_thread")]
async fn update_applies_changed_routes() {
    let old = mk_router(vec![mk_http_route("r1", Some(80), "node-a")]);
    let mut route = mk_http_route("r1", Some(80), "node-a");
    route.http_route.as_mut().unwrap().action.weighted_targets = vec![
        mk_target("node-a", 1),
        mk_target("node-b", 1),
    ];
    let vr = mk_router(vec![route]);
    let api = FakeApi::default().with_route("r1", spec_for(&old, &old.spec.routes[0]));
    let manager = mk_manager(api);

    let routes = manager
        .update(&mk_mesh(), &vr, &mk_nodes(["node-a", "node-b"]))
        .await
        .expect("update must succeed");

    assert_eq!(
        manager.api().mutations(),
        vec![Call::Update("r1".to_string())]
    );
    assert_eq!(routes["r1"].metadata.version, 2);
    assert_eq!(
        routes["r1"]
            .spec
            .http_route
            .as_ref()
            .unwrap()
            .action
            .weighted_targets
            .len(),
        2
    );
}

#[tokio::test(flavor = "current_thread")]
async fn update_deletes_undesired_routes() {
    let vr = mk_router(vec![mk_http_route("r1", None, "node-a")]);
    let stale = mk_router(vec![mk_http_route("r2", None, "node-b")]);
    let api = FakeApi::default().with_route("r2", spec_for(&stale, &stale.spec.routes[0]));
    let manager = mk_manager(api);

    let routes = manager
        .update(&mk_mesh(), &vr, &mk_nodes(["node-a"]))
        .await
        .expect("update must succeed");

    assert_eq!(
        manager.api().calls(),
        vec![
            Call::List(None),
            Call::Create("r1".to_string()),
            Call::Describe("r2".to_string()),
            Call::Delete("r2".to_string()),
        ]
    );
    assert_eq!(routes.keys().collect::<Vec<_>>(), vec!["r1"]);
    assert_eq!(manager.api().route_names(), vec!["r1"]);
}

#[tokio::test(flavor = "current_thread")]
async fn update_fails_when_listed_route_vanishes() {
    let vr = mk_router(vec![mk_http_route("r1", None, "node-a")]);
    let manager = mk_manager(FakeApi::default().with_phantom("r1"));

    let error = manager
        .update(&mk_mesh(), &vr, &mk_nodes(["node-a"]))
        .await
        .expect_err("update must fail");

    assert!(matches!(&error, Error::RouteNotFound(name) if name == "r1"), "{error}");
    assert!(manager.api().mutations().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn update_rejects_duplicate_route_names() {
    let vr = mk_router(vec![
        mk_http_route("r1", None, "node-a"),
        mk_tcp_route("r1", None, "node-a"),
    ]);
    let manager = mk_manager(FakeApi::default());

    let error = manager
        .update(&mk_mesh(), &vr, &mk_nodes(["node-a"]))
        .await
        .expect_err("update must fail");

    assert!(matches!(error, Error::DuplicateRouteName(_)), "{error}");
    assert!(manager.api().mutations().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn update_follows_list_pagination() {
    let vr = mk_router(vec![
        mk_http_route("r1", None, "node-a"),
        mk_http_route("r2", None, "node-a"),
        mk_http_route("r3", None, "node-a"),
    ]);
    let api = vr
        .spec
        .routes
        .iter()
        .fold(FakeApi::default().with_page_size(1), |api, route| {
            api.with_route(&route.name, spec_for(&vr, route))
        });
    let manager = mk_manager(api);

    let routes = manager
        .update(&mk_mesh(), &vr, &mk_nodes(["node-a"]))
        .await
        .expect("update must succeed");

    let lists = manager
        .api()
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::List(_)))
        .collect::<Vec<_>>();
    assert_eq!(
        lists,
        vec![
            Call::List(None),
            Call::List(Some("1".to_string())),
            Call::List(Some("2".to_string())),
        ]
    );
    assert_eq!(routes.len(), 3);
    assert!(manager.api().mutations().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_batches_converge() {
    let routes = (0..8)
        .map(|i| mk_http_route(format!("r{i}"), None, "node-a"))
        .collect::<Vec<_>>();
    let vr = mk_router(routes);
    let stale = mk_router(vec![mk_http_route("stale", None, "node-a")]);
    let api = FakeApi::default().with_route("stale", spec_for(&stale, &stale.spec.routes[0]));
    init_tracing();
    let manager = RoutesManager::new(
        api,
        Config {
            concurrency: NonZeroUsize::new(4).unwrap(),
        },
    );

    let routes = manager
        .update(&mk_mesh(), &vr, &mk_nodes(["node-a"]))
        .await
        .expect("update must succeed");

    assert_eq!(routes.len(), 8);
    assert_eq!(
        manager.api().route_names(),
        (0..8).map(|i| format!("r{i}")).collect::<Vec<_>>()
    );

    // Deletes still run after every create.
    let mutations = manager.api().mutations();
    assert_eq!(mutations.last(), Some(&Call::Delete("stale".to_string())));
}

#[tokio::test(flavor = "current_thread")]
async fn remove_deletes_only_tainted_routes() {
    // r1 matches TCP on 443, which is now an HTTP listener; r2 still matches
    // its HTTP listener; r3 is no longer desired.
    let vr = mk_router(vec![
        mk_tcp_route("r1", Some(443), "node-a"),
        mk_http_route("r2", Some(80), "node-a"),
    ]);
    let stale = mk_router(vec![mk_http_route("r3", None, "node-a")]);
    let api = FakeApi::default()
        .with_route("r1", spec_for(&vr, &vr.spec.routes[0]))
        .with_route("r2", spec_for(&vr, &vr.spec.routes[1]))
        .with_route("r3", spec_for(&stale, &stale.spec.routes[0]));
    let manager = mk_manager(api);
    let listeners = [
        PortMapping {
            port: 80,
            protocol: PortProtocol::Http,
        },
        PortMapping {
            port: 443,
            protocol: PortProtocol::Http,
        },
    ];

    manager
        .remove(&mk_mesh(), &vr, &listeners)
        .await
        .expect("remove must succeed");

    assert_eq!(
        manager.api().calls(),
        vec![
            Call::List(None),
            Call::Delete("r1".to_string()),
            Call::Delete("r3".to_string()),
        ]
    );
    assert_eq!(manager.api().route_names(), vec!["r2"]);
}

#[tokio::test(flavor = "current_thread")]
async fn remove_tolerates_concurrent_deletes() {
    let vr = mk_router(vec![]);
    let stale = mk_router(vec![mk_http_route("r1", None, "node-a")]);
    let api = FakeApi::default()
        .with_route("r1", spec_for(&stale, &stale.spec.routes[0]))
        .with_racing_delete("r1");
    let manager = mk_manager(api);

    manager
        .remove(&mk_mesh(), &vr, &[])
        .await
        .expect("remove must succeed");

    assert!(manager.api().route_names().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn cleanup_deletes_all_routes() {
    let vr = mk_router(vec![
        mk_http_route("r1", None, "node-a"),
        mk_http_route("r2", None, "node-a"),
    ]);
    let api = FakeApi::default()
        .with_route("r1", spec_for(&vr, &vr.spec.routes[0]))
        .with_route("r2", spec_for(&vr, &vr.spec.routes[1]))
        .with_racing_delete("r2");
    let manager = mk_manager(api);

    manager
        .cleanup(&mk_mesh(), &vr)
        .await
        .expect("cleanup must succeed");

    assert_eq!(
        manager.api().mutations(),
        vec![Call::Delete("r1".to_string()), Call::Delete("r2".to_string())]
    );
    assert!(manager.api().route_names().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn cleanup_skips_routes_that_cannot_be_described() {
    let vr = mk_router(vec![]);
    let manager = mk_manager(FakeApi::default().with_phantom("r1"));

    manager
        .cleanup(&mk_mesh(), &vr)
        .await
        .expect("cleanup must succeed");

    assert_eq!(
        manager.api().calls(),
        vec![Call::List(None), Call::Describe("r1".to_string())]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn cleanup_of_empty_router_is_a_noop() {
    let manager = mk_manager(FakeApi::default());

    manager
        .cleanup(&mk_mesh(), &mk_router(vec![]))
        .await
        .expect("cleanup must succeed");

    assert_eq!(manager.api().calls(), vec![Call::List(None)]);
}

#[derive(Debug, Parser)]
struct Args {
    #[clap(flatten)]
    routes: Config,
}

#[test]
fn parses_concurrency_flag() {
    let args = Args::try_parse_from(["controller", "--route-reconcile-concurrency", "4"])
        .expect("flag must parse");
    assert_eq!(args.routes.concurrency.get(), 4);

    let args = Args::try_parse_from(["controller"]).expect("flag is optional");
    assert_eq!(args.routes.concurrency, Config::default().concurrency);

    assert!(Args::try_parse_from(["controller", "--route-reconcile-concurrency", "0"]).is_err());
}
