use crate::resource_id::ResourceId;
use route_controller_core::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to convert route {route}: {source}")]
    Conversion {
        route: String,
        #[source]
        source: ConversionError,
    },

    /// A route that was just listed could not be described.
    #[error("route not found: {0}")]
    RouteNotFound(String),

    #[error(transparent)]
    DuplicateRouteName(#[from] DuplicateRouteName),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error(
        "route must specify exactly one of grpcRoute, httpRoute, http2Route or tcpRoute; {0} are set"
    )]
    RouteVariants(usize),

    #[error("weighted target must specify exactly one of virtualNodeRef or virtualNodeARN")]
    AmbiguousTarget,

    #[error("unknown virtual node: {0}")]
    UnknownVirtualNode(ResourceId),

    #[error("virtual node ARN does not name a virtual node: {0}")]
    InvalidVirtualNodeArn(String),

    #[error("virtual router has no namespace")]
    MissingNamespace,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("duplicate route name: {0}")]
pub struct DuplicateRouteName(pub String);
