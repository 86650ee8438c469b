#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod duration;
pub mod mesh;
pub mod route;
pub mod virtual_router;

pub use self::{
    duration::{Duration, DurationUnit},
    mesh::{Mesh, MeshSpec},
    route::{
        GrpcRetryPolicy, GrpcRoute, GrpcRouteMatch, GrpcRouteMetadata, HeaderMatchMethod,
        HttpPathMatch, HttpQueryParameter, HttpRetryPolicy, HttpRoute, HttpRouteHeader,
        HttpRouteMatch, MatchRange, QueryParameterMatch, Route, RouteAction, RouteTimeout,
        TcpRoute, TcpRouteMatch, TcpTimeout, VirtualNodeReference, WeightedTarget,
    },
    virtual_router::{
        PortMapping, PortProtocol, VirtualRouter, VirtualRouterListener, VirtualRouterSpec,
    },
};
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
pub use kube::core::{Resource, ResourceExt};

/// The API group shared by all route-controller custom resources.
pub const API_GROUP: &str = "appmesh.k8s.aws";
