//! The remote control plane's route spec.
//!
//! These mirror the route variants of the custom resource, except that
//! weighted targets name a concrete virtual node and collections may be
//! omitted by the remote API when they are empty.

use crate::equivalent::{equivalent_by_eq, equivalent_fields};
use serde::{Deserialize, Serialize};

pub use route_controller_k8s_api::{
    Duration, DurationUnit, GrpcRouteMetadata, HeaderMatchMethod, HttpPathMatch,
    HttpQueryParameter, HttpRouteHeader, MatchRange, QueryParameterMatch, RouteTimeout,
    TcpRouteMatch, TcpTimeout,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    pub priority: Option<u32>,
    pub grpc_route: Option<GrpcRoute>,
    pub http_route: Option<HttpRoute>,
    pub http2_route: Option<HttpRoute>,
    pub tcp_route: Option<TcpRoute>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRoute {
    #[serde(rename = "match")]
    pub match_: HttpRouteMatch,
    pub action: RouteAction,
    pub retry_policy: Option<HttpRetryPolicy>,
    pub timeout: Option<RouteTimeout>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteMatch {
    pub prefix: Option<String>,
    pub path: Option<HttpPathMatch>,
    pub method: Option<String>,
    pub scheme: Option<String>,
    pub headers: Option<Vec<HttpRouteHeader>>,
    pub query_parameters: Option<Vec<HttpQueryParameter>>,
    pub port: Option<u16>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRetryPolicy {
    pub http_retry_events: Option<Vec<String>>,
    pub tcp_retry_events: Option<Vec<String>>,
    pub per_retry_timeout: Duration,
    pub max_retries: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRoute {
    #[serde(rename = "match")]
    pub match_: GrpcRouteMatch,
    pub action: RouteAction,
    pub retry_policy: Option<GrpcRetryPolicy>,
    pub timeout: Option<RouteTimeout>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRouteMatch {
    pub service_name: Option<String>,
    pub method_name: Option<String>,
    pub metadata: Option<Vec<GrpcRouteMetadata>>,
    pub port: Option<u16>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRetryPolicy {
    pub grpc_retry_events: Option<Vec<String>>,
    pub http_retry_events: Option<Vec<String>>,
    pub tcp_retry_events: Option<Vec<String>>,
    pub per_retry_timeout: Duration,
    pub max_retries: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpRoute {
    #[serde(rename = "match")]
    pub match_: Option<TcpRouteMatch>,
    pub action: RouteAction,
    pub timeout: Option<TcpTimeout>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAction {
    pub weighted_targets: Vec<WeightedTarget>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedTarget {
    pub virtual_node: String,
    pub weight: u32,
    pub port: Option<u16>,
}

equivalent_by_eq!(
    Duration,
    GrpcRouteMetadata,
    HeaderMatchMethod,
    HttpPathMatch,
    HttpQueryParameter,
    HttpRouteHeader,
    QueryParameterMatch,
    RouteTimeout,
    TcpRouteMatch,
    TcpTimeout,
);

equivalent_fields! {
    RouteSpec { priority, grpc_route, http_route, http2_route, tcp_route }
    HttpRoute { match_, action, retry_policy, timeout }
    HttpRouteMatch { prefix, path, method, scheme, headers, query_parameters, port }
    HttpRetryPolicy { http_retry_events, tcp_retry_events, per_retry_timeout, max_retries }
    GrpcRoute { match_, action, retry_policy, timeout }
    GrpcRouteMatch { service_name, method_name, metadata, port }
    GrpcRetryPolicy {
        grpc_retry_events,
        http_retry_events,
        tcp_retry_events,
        per_retry_timeout,
        max_retries,
    }
    TcpRoute { match_, action, timeout }
    RouteAction { weighted_targets }
    WeightedTarget { virtual_node, weight, port }
}
