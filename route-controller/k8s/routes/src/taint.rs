use crate::{
    error::DuplicateRouteName,
    matching::{match_routes, MatchedRoute, RouteMatches},
};
use ahash::AHashMap as HashMap;
use route_controller_core::{PortMapping, RouteRef};
use route_controller_k8s_api::Route;
use std::collections::BTreeMap;

/// Returns the remote routes that must be deleted before the router's
/// listeners can be updated or deleted, sorted by name.
///
/// This includes both routes that are no longer desired and desired routes
/// whose match port is now bound to a listener of another protocol. A port
/// with no listener at all is treated as bound to another protocol.
pub fn tainted<'a>(matches: RouteMatches<'a>, listeners: &[PortMapping]) -> Vec<&'a RouteRef> {
    let protocol_by_port = listeners
        .iter()
        .map(|listener| (listener.port, listener.protocol))
        .collect::<HashMap<_, _>>();

    let mut tainted = matches
        .unmatched_refs
        .into_iter()
        .map(|route_ref| (route_ref.route_name.as_str(), route_ref))
        .collect::<BTreeMap<_, _>>();

    for MatchedRoute { route, route_ref } in matches.matched {
        let conflict = route
            .match_ports()
            .find(|(protocol, port)| protocol_by_port.get(port) != Some(protocol));
        if let Some((protocol, port)) = conflict {
            tracing::debug!(
                route = %route.name,
                port,
                %protocol,
                listener = ?protocol_by_port.get(&port),
                "Route conflicts with listener",
            );
            tainted.insert(route_ref.route_name.as_str(), route_ref);
        }
    }

    tainted.into_values().collect()
}

/// Matches `routes` against `route_refs` and returns the tainted references.
pub fn tainted_route_refs<'a>(
    routes: &'a [Route],
    listeners: &[PortMapping],
    route_refs: &'a [RouteRef],
) -> Result<Vec<&'a RouteRef>, DuplicateRouteName> {
    let matches = match_routes(routes, route_refs)?;
    Ok(tainted(matches, listeners))
}
