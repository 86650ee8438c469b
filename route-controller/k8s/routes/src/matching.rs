use crate::error::DuplicateRouteName;
use route_controller_core::RouteRef;
use route_controller_k8s_api::Route;
use std::collections::{btree_map::Entry, BTreeMap};

/// Desired routes and remote route references, partitioned by name.
///
/// Each list is sorted by route name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteMatches<'a> {
    /// Routes that are both desired and present remotely.
    pub matched: Vec<MatchedRoute<'a>>,

    /// Desired routes that are not present remotely.
    pub unmatched_routes: Vec<&'a Route>,

    /// Remote routes that are no longer desired.
    pub unmatched_refs: Vec<&'a RouteRef>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MatchedRoute<'a> {
    pub route: &'a Route,
    pub route_ref: &'a RouteRef,
}

/// Matches desired routes against remote route references by name.
///
/// Routes are never matched by content: a route that exists on only one side
/// is created or deleted, never updated.
pub fn match_routes<'a>(
    routes: &'a [Route],
    route_refs: &'a [RouteRef],
) -> Result<RouteMatches<'a>, DuplicateRouteName> {
    let routes_by_name = index_by_name(routes, |route| &route.name)?;
    let refs_by_name = index_by_name(route_refs, |route_ref| &route_ref.route_name)?;

    let mut matches = RouteMatches::default();
    for (name, &route) in &routes_by_name {
        match refs_by_name.get(name) {
            Some(&route_ref) => matches.matched.push(MatchedRoute { route, route_ref }),
            None => matches.unmatched_routes.push(route),
        }
    }
    matches.unmatched_refs = refs_by_name
        .iter()
        .filter(|(name, _)| !routes_by_name.contains_key(*name))
        .map(|(_, route_ref)| *route_ref)
        .collect();

    Ok(matches)
}

fn index_by_name<'a, T>(
    items: &'a [T],
    name: impl Fn(&'a T) -> &'a String,
) -> Result<BTreeMap<&'a str, &'a T>, DuplicateRouteName> {
    let mut by_name = BTreeMap::new();
    for item in items {
        match by_name.entry(name(item).as_str()) {
            Entry::Vacant(entry) => {
                entry.insert(item);
            }
            Entry::Occupied(entry) => return Err(DuplicateRouteName(entry.key().to_string())),
        }
    }
    Ok(by_name)
}
