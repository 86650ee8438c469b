use crate::{duration::Duration, virtual_router::PortProtocol};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named route on a virtual router.
///
/// Exactly one of the route variants must be set. The name identifies the
/// route in the remote control plane and must be unique within the router.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub name: String,

    /// Routes are matched in priority order, from 0 (highest) to 1000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_route: Option<GrpcRoute>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_route: Option<HttpRoute>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http2_route: Option<HttpRoute>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_route: Option<TcpRoute>,
}

/// Routes HTTP/1 or HTTP/2 traffic, depending on which field of the
/// [`Route`] holds it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpRoute {
    #[serde(rename = "match")]
    pub match_: HttpRouteMatch,
    pub action: RouteAction,
    pub retry_policy: Option<HttpRetryPolicy>,
    pub timeout: Option<RouteTimeout>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteMatch {
    pub prefix: Option<String>,
    pub path: Option<HttpPathMatch>,
    pub method: Option<String>,
    pub scheme: Option<String>,
    #[serde(default)]
    pub headers: Vec<HttpRouteHeader>,
    #[serde(default)]
    pub query_parameters: Vec<HttpQueryParameter>,
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub struct HttpPathMatch {
    pub exact: Option<String>,
    pub regex: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteHeader {
    pub name: String,
    pub invert: Option<bool>,
    #[serde(rename = "match")]
    pub match_: Option<HeaderMatchMethod>,
}

/// Matches a header or gRPC metadata value. At most one method may be set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub struct HeaderMatchMethod {
    pub exact: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub regex: Option<String>,
    pub range: Option<MatchRange>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub struct MatchRange {
    pub start: i64,
    pub end: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct HttpQueryParameter {
    pub name: String,
    #[serde(rename = "match")]
    pub match_: Option<QueryParameterMatch>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub struct QueryParameterMatch {
    pub exact: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpRetryPolicy {
    #[serde(default)]
    pub http_retry_events: Vec<String>,
    #[serde(default)]
    pub tcp_retry_events: Vec<String>,
    pub per_retry_timeout: Duration,
    pub max_retries: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteTimeout {
    pub per_request: Option<Duration>,
    pub idle: Option<Duration>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRoute {
    #[serde(rename = "match")]
    pub match_: GrpcRouteMatch,
    pub action: RouteAction,
    pub retry_policy: Option<GrpcRetryPolicy>,
    pub timeout: Option<RouteTimeout>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRouteMatch {
    pub service_name: Option<String>,
    pub method_name: Option<String>,
    #[serde(default)]
    pub metadata: Vec<GrpcRouteMetadata>,
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct GrpcRouteMetadata {
    pub name: String,
    pub invert: Option<bool>,
    #[serde(rename = "match")]
    pub match_: Option<HeaderMatchMethod>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRetryPolicy {
    #[serde(default)]
    pub grpc_retry_events: Vec<String>,
    #[serde(default)]
    pub http_retry_events: Vec<String>,
    #[serde(default)]
    pub tcp_retry_events: Vec<String>,
    pub per_retry_timeout: Duration,
    pub max_retries: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TcpRoute {
    #[serde(rename = "match")]
    pub match_: Option<TcpRouteMatch>,
    pub action: RouteAction,
    pub timeout: Option<TcpTimeout>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub struct TcpRouteMatch {
    pub port: Option<u16>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub struct TcpTimeout {
    pub idle: Option<Duration>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteAction {
    pub weighted_targets: Vec<WeightedTarget>,
}

/// A share of a route's traffic sent to one virtual node.
///
/// The node is named either by a reference to a `VirtualNode` resource,
/// which is resolved when the route is converted, or directly by its ARN.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeightedTarget {
    pub virtual_node_ref: Option<VirtualNodeReference>,
    #[serde(rename = "virtualNodeARN")]
    pub virtual_node_arn: Option<String>,
    pub weight: u32,
    pub port: Option<u16>,
}

/// Refers to a `VirtualNode` resource. When the namespace is omitted, the
/// referring router's namespace is used.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub struct VirtualNodeReference {
    pub namespace: Option<String>,
    pub name: String,
}

// === impl Route ===

impl Route {
    /// Returns the protocol and match port of each route variant that
    /// constrains its port, in the order TCP, gRPC, HTTP/2, HTTP.
    pub fn match_ports(&self) -> impl Iterator<Item = (PortProtocol, u16)> + '_ {
        let tcp = self
            .tcp_route
            .as_ref()
            .and_then(|r| r.match_.as_ref())
            .and_then(|m| m.port)
            .map(|port| (PortProtocol::Tcp, port));
        let grpc = self
            .grpc_route
            .as_ref()
            .and_then(|r| r.match_.port)
            .map(|port| (PortProtocol::Grpc, port));
        let http2 = self
            .http2_route
            .as_ref()
            .and_then(|r| r.match_.port)
            .map(|port| (PortProtocol::Http2, port));
        let http = self
            .http_route
            .as_ref()
            .and_then(|r| r.match_.port)
            .map(|port| (PortProtocol::Http, port));
        tcp.into_iter().chain(grpc).chain(http2).chain(http)
    }

    /// Counts the route variants that are set.
    pub fn variant_count(&self) -> usize {
        [
            self.grpc_route.is_some(),
            self.http_route.is_some(),
            self.http2_route.is_some(),
            self.tcp_route.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}
