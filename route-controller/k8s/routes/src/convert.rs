use crate::{error::ConversionError, resource_id::ResourceId};
use ahash::AHashMap as HashMap;
use route_controller_core::route as remote;
use route_controller_k8s_api::{self as k8s, ResourceExt};

/// Maps virtual node resources to their names in the remote control plane.
pub type VirtualNodeTable = HashMap<ResourceId, String>;

/// Builds the remote spec for one of the virtual router's routes.
///
/// Virtual node references are resolved through `nodes`; references without
/// a namespace refer to nodes in the router's namespace.
pub fn build_route_spec(
    vr: &k8s::VirtualRouter,
    route: &k8s::Route,
    nodes: &VirtualNodeTable,
) -> Result<remote::RouteSpec, ConversionError> {
    let variants = route.variant_count();
    if variants != 1 {
        return Err(ConversionError::RouteVariants(variants));
    }

    let targets = Targets {
        namespace: vr.namespace(),
        nodes,
    };
    Ok(remote::RouteSpec {
        priority: route.priority,
        grpc_route: route
            .grpc_route
            .as_ref()
            .map(|r| convert_grpc_route(r, &targets))
            .transpose()?,
        http_route: route
            .http_route
            .as_ref()
            .map(|r| convert_http_route(r, &targets))
            .transpose()?,
        http2_route: route
            .http2_route
            .as_ref()
            .map(|r| convert_http_route(r, &targets))
            .transpose()?,
        tcp_route: route
            .tcp_route
            .as_ref()
            .map(|r| convert_tcp_route(r, &targets))
            .transpose()?,
    })
}

/// Resolves weighted targets to virtual node names.
struct Targets<'a> {
    namespace: Option<String>,
    nodes: &'a VirtualNodeTable,
}

fn convert_http_route(
    route: &k8s::HttpRoute,
    targets: &Targets<'_>,
) -> Result<remote::HttpRoute, ConversionError> {
    let k8s::HttpRouteMatch {
        prefix,
        path,
        method,
        scheme,
        headers,
        query_parameters,
        port,
    } = &route.match_;

    Ok(remote::HttpRoute {
        match_: remote::HttpRouteMatch {
            prefix: prefix.clone(),
            path: path.clone(),
            method: method.clone(),
            scheme: scheme.clone(),
            headers: Some(headers.clone()),
            query_parameters: Some(query_parameters.clone()),
            port: *port,
        },
        action: targets.convert_action(&route.action)?,
        retry_policy: route.retry_policy.as_ref().map(|policy| remote::HttpRetryPolicy {
            http_retry_events: Some(policy.http_retry_events.clone()),
            tcp_retry_events: Some(policy.tcp_retry_events.clone()),
            per_retry_timeout: policy.per_retry_timeout,
            max_retries: policy.max_retries,
        }),
        timeout: route.timeout.clone(),
    })
}

fn convert_grpc_route(
    route: &k8s::GrpcRoute,
    targets: &Targets<'_>,
) -> Result<remote::GrpcRoute, ConversionError> {
    let k8s::GrpcRouteMatch {
        service_name,
        method_name,
        metadata,
        port,
    } = &route.match_;

    Ok(remote::GrpcRoute {
        match_: remote::GrpcRouteMatch {
            service_name: service_name.clone(),
            method_name: method_name.clone(),
            metadata: Some(metadata.clone()),
            port: *port,
        },
        action: targets.convert_action(&route.action)?,
        retry_policy: route.retry_policy.as_ref().map(|policy| remote::GrpcRetryPolicy {
            grpc_retry_events: Some(policy.grpc_retry_events.clone()),
            http_retry_events: Some(policy.http_retry_events.clone()),
            tcp_retry_events: Some(policy.tcp_retry_events.clone()),
            per_retry_timeout: policy.per_retry_timeout,
            max_retries: policy.max_retries,
        }),
        timeout: route.timeout.clone(),
    })
}

fn convert_tcp_route(
    route: &k8s::TcpRoute,
    targets: &Targets<'_>,
) -> Result<remote::TcpRoute, ConversionError> {
    Ok(remote::TcpRoute {
        match_: route.match_,
        action: targets.convert_action(&route.action)?,
        timeout: route.timeout,
    })
}

// === impl Targets ===

impl Targets<'_> {
    fn convert_action(
        &self,
        action: &k8s::RouteAction,
    ) -> Result<remote::RouteAction, ConversionError> {
        let weighted_targets = action
            .weighted_targets
            .iter()
            .map(|target| self.convert_target(target))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(remote::RouteAction { weighted_targets })
    }

    fn convert_target(
        &self,
        target: &k8s::WeightedTarget,
    ) -> Result<remote::WeightedTarget, ConversionError> {
        let virtual_node = match (&target.virtual_node_ref, &target.virtual_node_arn) {
            (Some(node_ref), None) => self.resolve(node_ref)?,
            (None, Some(arn)) => virtual_node_name_from_arn(arn)?,
            _ => return Err(ConversionError::AmbiguousTarget),
        };
        Ok(remote::WeightedTarget {
            virtual_node,
            weight: target.weight,
            port: target.port,
        })
    }

    fn resolve(&self, node_ref: &k8s::VirtualNodeReference) -> Result<String, ConversionError> {
        let namespace = node_ref
            .namespace
            .as_ref()
            .or(self.namespace.as_ref())
            .ok_or(ConversionError::MissingNamespace)?;
        let id = ResourceId::new(namespace.clone(), node_ref.name.clone());
        match self.nodes.get(&id) {
            Some(name) => Ok(name.clone()),
            None => Err(ConversionError::UnknownVirtualNode(id)),
        }
    }
}

/// Extracts the node name from an ARN of the form
/// `arn:<partition>:appmesh:<region>:<account>:mesh/<mesh>/virtualNode/<name>`.
fn virtual_node_name_from_arn(arn: &str) -> Result<String, ConversionError> {
    let invalid = || ConversionError::InvalidVirtualNodeArn(arn.to_string());

    let resource = match arn.splitn(6, ':').collect::<Vec<_>>()[..] {
        ["arn", _, _, _, _, resource] => resource,
        _ => return Err(invalid()),
    };
    match resource.split('/').collect::<Vec<_>>()[..] {
        ["mesh", mesh, "virtualNode", name] if !mesh.is_empty() && !name.is_empty() => {
            Ok(name.to_string())
        }
        _ => Err(invalid()),
    }
}
