use crate::route::Route;
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Describes a virtual router: a set of listeners and the ordered routes
/// that distribute traffic received on them across virtual nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "appmesh.k8s.aws",
    version = "v1beta2",
    kind = "VirtualRouter",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct VirtualRouterSpec {
    /// The router's name in the remote control plane. Defaults to
    /// `<name>_<namespace>`.
    pub aws_name: Option<String>,

    #[serde(default)]
    pub listeners: Vec<VirtualRouterListener>,

    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualRouterListener {
    pub port_mapping: PortMapping,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub struct PortMapping {
    pub port: u16,
    pub protocol: PortProtocol,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PortProtocol {
    Http,
    Http2,
    Grpc,
    Tcp,
}

// === impl VirtualRouter ===

impl VirtualRouter {
    pub fn aws_name(&self) -> String {
        if let Some(name) = self.spec.aws_name.as_ref() {
            return name.clone();
        }
        match self.namespace() {
            Some(ns) => format!("{}_{}", self.name_any(), ns),
            None => self.name_any(),
        }
    }
}

// === impl PortProtocol ===

impl fmt::Display for PortProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Http2 => f.write_str("http2"),
            Self::Grpc => f.write_str("grpc"),
            Self::Tcp => f.write_str("tcp"),
        }
    }
}
