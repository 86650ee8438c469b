use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Describes a service mesh that virtual routers are provisioned into.
#[derive(Clone, Debug, Default, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(group = "appmesh.k8s.aws", version = "v1beta2", kind = "Mesh")]
#[serde(rename_all = "camelCase")]
pub struct MeshSpec {
    /// The mesh's name in the remote control plane. Defaults to the name of
    /// the resource.
    pub aws_name: Option<String>,

    /// The account that owns the mesh, if it is shared with this one.
    pub mesh_owner: Option<String>,
}

impl Mesh {
    pub fn aws_name(&self) -> String {
        self.spec
            .aws_name
            .clone()
            .unwrap_or_else(|| self.name_any())
    }
}
