#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod api;
pub mod equivalent;
pub mod route;
mod router;

pub use self::{
    api::{ApiError, RouteApi, RoutePage},
    equivalent::{Equality, Equivalent},
    route::RouteSpec,
    router::{ResourceMetadata, RouteData, RouteRef, VirtualRouterRef},
};
pub use route_controller_k8s_api::{PortMapping, PortProtocol};
