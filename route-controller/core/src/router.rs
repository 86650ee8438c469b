use crate::route::RouteSpec;
use route_controller_k8s_api::{Mesh, VirtualRouter};
use serde::{Deserialize, Serialize};

/// Identifies a virtual router in the remote control plane.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualRouterRef {
    pub mesh_name: String,
    pub mesh_owner: Option<String>,
    pub virtual_router_name: String,
}

/// Identifies a route in the remote control plane, as returned by listing a
/// router's routes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRef {
    pub mesh_name: String,
    pub mesh_owner: Option<String>,
    pub virtual_router_name: String,
    pub route_name: String,
}

/// A route as described by the remote control plane.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
    pub mesh_name: String,
    pub virtual_router_name: String,
    pub route_name: String,
    pub spec: RouteSpec,
    pub metadata: ResourceMetadata,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    pub arn: String,
    pub mesh_owner: Option<String>,
    pub resource_owner: Option<String>,
    pub uid: String,
    pub version: u64,
}

// === impl VirtualRouterRef ===

impl VirtualRouterRef {
    pub fn new(mesh: &Mesh, vr: &VirtualRouter) -> Self {
        Self {
            mesh_name: mesh.aws_name(),
            mesh_owner: mesh.spec.mesh_owner.clone(),
            virtual_router_name: vr.aws_name(),
        }
    }

    pub fn route(&self, route_name: impl ToString) -> RouteRef {
        RouteRef {
            mesh_name: self.mesh_name.clone(),
            mesh_owner: self.mesh_owner.clone(),
            virtual_router_name: self.virtual_router_name.clone(),
            route_name: route_name.to_string(),
        }
    }
}

// === impl RouteData ===

impl RouteData {
    /// Addresses the route by the identity the control plane reported for
    /// it, including the owner recorded in its metadata.
    pub fn route_ref(&self) -> RouteRef {
        RouteRef {
            mesh_name: self.mesh_name.clone(),
            mesh_owner: self.metadata.mesh_owner.clone(),
            virtual_router_name: self.virtual_router_name.clone(),
            route_name: self.route_name.clone(),
        }
    }
}
