use crate::{
    route::RouteSpec,
    router::{RouteData, RouteRef, VirtualRouterRef},
};

/// Models the remote control plane's route API.
///
/// Implementations map their transport's failures onto [`ApiError`]; in
/// particular, a missing route must be reported as [`ApiError::NotFound`].
#[async_trait::async_trait]
pub trait RouteApi: Send + Sync {
    /// Lists one page of the router's routes, starting at `next_token`.
    async fn list_routes(
        &self,
        router: &VirtualRouterRef,
        next_token: Option<String>,
    ) -> Result<RoutePage, ApiError>;

    async fn describe_route(&self, route: &RouteRef) -> Result<RouteData, ApiError>;

    async fn create_route(
        &self,
        router: &VirtualRouterRef,
        route_name: &str,
        spec: RouteSpec,
    ) -> Result<RouteData, ApiError>;

    async fn update_route(&self, route: &RouteRef, spec: RouteSpec) -> Result<RouteData, ApiError>;

    async fn delete_route(&self, route: &RouteRef) -> Result<(), ApiError>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutePage {
    pub routes: Vec<RouteRef>,

    /// Set when more routes remain to be listed.
    pub next_token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
