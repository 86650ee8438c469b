#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Reconciles a virtual router's routes in the remote control plane with
//! the routes declared on its `VirtualRouter` resource.

mod config;
mod convert;
mod error;
mod manager;
mod matching;
mod resource_id;
mod taint;


pub use self::{
    config::Config,
    convert::{build_route_spec, VirtualNodeTable},
    error::{ConversionError, DuplicateRouteName, Error},
    manager::RoutesManager,
    matching::{match_routes, MatchedRoute, RouteMatches},
    resource_id::ResourceId,
    taint::{tainted, tainted_route_refs},
};
