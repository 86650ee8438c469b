use super::*;
use crate::tainted_route_refs;
use route_controller_k8s_api::{PortMapping, PortProtocol};
use rstest::rstest;

fn listener(port: u16, protocol: PortProtocol) -> PortMapping {
    PortMapping { port, protocol }
}

fn tainted_names(routes: &[Route], listeners: &[PortMapping], refs: &[RouteRef]) -> Vec<String> {
    tainted_route_refs(routes, listeners, refs)
        .expect("names are unique")
        .into_iter()
        .map(|r| r.route_name.clone())
        .collect()
}

fn mk_grpc_route(name: &str, port: Option<u16>) -> Route {
    Route {
        name: name.to_string(),
        grpc_route: Some(k8s::GrpcRoute {
            match_: k8s::GrpcRouteMatch {
                service_name: Some("svc".to_string()),
                port,
                ..Default::default()
            },
            action: k8s::RouteAction {
                weighted_targets: vec![mk_target("node-a", 1)],
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn mk_http2_route(name: &str, port: Option<u16>) -> Route {
    let mut route = mk_http_route(name, port, "node-a");
    route.http2_route = route.http_route.take();
    route
}

#[rstest]
#[case::http_on_tcp_listener(mk_http_route("r1", Some(8080), "node-a"), PortProtocol::Tcp, true)]
#[case::http_on_http_listener(mk_http_route("r1", Some(8080), "node-a"), PortProtocol::Http, false)]
#[case::tcp_on_http_listener(mk_tcp_route("r1", Some(8080), "node-a"), PortProtocol::Http, true)]
#[case::tcp_on_tcp_listener(mk_tcp_route("r1", Some(8080), "node-a"), PortProtocol::Tcp, false)]
#[case::grpc_on_http2_listener(mk_grpc_route("r1", Some(8080)), PortProtocol::Http2, true)]
#[case::grpc_on_grpc_listener(mk_grpc_route("r1", Some(8080)), PortProtocol::Grpc, false)]
#[case::http2_on_http_listener(mk_http2_route("r1", Some(8080)), PortProtocol::Http, true)]
#[case::http2_on_http2_listener(mk_http2_route("r1", Some(8080)), PortProtocol::Http2, false)]
fn taints_matched_routes_on_protocol_conflict(
    #[case] route: Route,
    #[case] protocol: PortProtocol,
    #[case] tainted: bool,
) {
    init_tracing();

    let names = tainted_names(
        &[route],
        &[listener(8080, protocol)],
        &[mk_route_ref("r1")],
    );

    if tainted {
        assert_eq!(names, vec!["r1"]);
    } else {
        assert!(names.is_empty(), "unexpected taints: {names:?}");
    }
}

#[rstest]
#[case::tcp(mk_tcp_route("r1", None, "node-a"))]
#[case::http(mk_http_route("r1", None, "node-a"))]
#[case::grpc(mk_grpc_route("r1", None))]
fn routes_without_ports_are_never_tainted(#[case] route: Route) {
    let names = tainted_names(
        &[route],
        &[listener(8080, PortProtocol::Http2)],
        &[mk_route_ref("r1")],
    );
    assert!(names.is_empty(), "unexpected taints: {names:?}");
}

#[test]
fn taints_routes_on_ports_without_listeners() {
    let names = tainted_names(
        &[mk_http_route("r1", Some(9090), "node-a")],
        &[listener(8080, PortProtocol::Http)],
        &[mk_route_ref("r1")],
    );
    assert_eq!(names, vec!["r1"]);
}

#[test]
fn taints_remote_routes_that_are_no_longer_desired() {
    let names = tainted_names(
        &[mk_http_route("keep", Some(8080), "node-a")],
        &[listener(8080, PortProtocol::Http)],
        &[mk_route_ref("stale-b"), mk_route_ref("keep"), mk_route_ref("stale-a")],
    );
    assert_eq!(names, vec!["stale-a", "stale-b"]);
}

#[test]
fn never_taints_routes_that_do_not_exist_remotely() {
    let names = tainted_names(
        &[mk_http_route("new", Some(8080), "node-a")],
        &[listener(8080, PortProtocol::Tcp)],
        &[],
    );
    assert!(names.is_empty(), "unexpected taints: {names:?}");
}

#[test]
fn taints_tcp_route_on_http_listener() {
    // A TCP route still on port 443 must be removed before the listener on
    // 443 can become HTTP, even though the route is still desired.
    let names = tainted_names(
        &[mk_tcp_route("r1", Some(443), "node-a")],
        &[listener(443, PortProtocol::Http)],
        &[mk_route_ref("r1")],
    );
    assert_eq!(names, vec!["r1"]);
}
