use crate::{
    config::Config,
    convert::{build_route_spec, VirtualNodeTable},
    error::Error,
    matching::{match_routes, MatchedRoute, RouteMatches},
    taint,
};
use futures::prelude::*;
use route_controller_core::{
    Equality, Equivalent, PortMapping, RouteApi, RouteData, RoutePage, RouteRef,
    VirtualRouterRef,
};
use route_controller_k8s_api::{Mesh, Route, VirtualRouter};
use std::collections::BTreeMap;
use tracing::{info_span, Instrument};

/// Manages the routes of virtual routers in the remote control plane.
///
/// The manager holds no state between calls: each call lists (or assumes)
/// the remote routes, diffs them against the router's desired routes, and
/// applies creates, then updates, then deletes. The first failure aborts the
/// call without rolling back changes that were already applied; calling
/// again converges the remaining work.
///
/// Calls for the same router must not run concurrently.
pub struct RoutesManager<A> {
    api: A,
    config: Config,
}

impl<A: RouteApi> RoutesManager<A> {
    pub fn new(api: A, config: Config) -> Self {
        Self { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Creates all of the router's routes, assuming none exist remotely.
    pub async fn create(
        &self,
        mesh: &Mesh,
        vr: &VirtualRouter,
        nodes: &VirtualNodeTable,
    ) -> Result<BTreeMap<String, RouteData>, Error> {
        let router = VirtualRouterRef::new(mesh, vr);
        self.reconcile(&router, vr, nodes, &vr.spec.routes, &[])
            .instrument(router_span("create", &router))
            .await
    }

    /// Creates, updates and deletes remote routes so that they match the
    /// router's routes.
    pub async fn update(
        &self,
        mesh: &Mesh,
        vr: &VirtualRouter,
        nodes: &VirtualNodeTable,
    ) -> Result<BTreeMap<String, RouteData>, Error> {
        let router = VirtualRouterRef::new(mesh, vr);
        async {
            let route_refs = self.list_route_refs(&router).await?;
            self.reconcile(&router, vr, nodes, &vr.spec.routes, &route_refs)
                .await
        }
        .instrument(router_span("update", &router))
        .await
    }

    /// Deletes the remote routes that must be removed before the router's
    /// listeners can be changed.
    ///
    /// `listeners` are the router's listeners as currently configured in the
    /// remote control plane. Routes that remain compatible with them are left
    /// untouched.
    pub async fn remove(
        &self,
        mesh: &Mesh,
        vr: &VirtualRouter,
        listeners: &[PortMapping],
    ) -> Result<(), Error> {
        let router = VirtualRouterRef::new(mesh, vr);
        async {
            let route_refs = self.list_route_refs(&router).await?;
            let tainted = taint::tainted_route_refs(&vr.spec.routes, listeners, &route_refs)?;
            tracing::debug!(routes = tainted.len(), "Removing tainted routes");
            self.try_batch(tainted.into_iter().map(|route_ref| self.delete_route_ref(route_ref)))
                .await?;
            Ok(())
        }
        .instrument(router_span("remove", &router))
        .await
    }

    /// Deletes all of the router's remote routes.
    pub async fn cleanup(&self, mesh: &Mesh, vr: &VirtualRouter) -> Result<(), Error> {
        let router = VirtualRouterRef::new(mesh, vr);
        async {
            let route_refs = self.list_route_refs(&router).await?;
            self.reconcile(&router, vr, &VirtualNodeTable::default(), &[], &route_refs)
                .await?;
            Ok(())
        }
        .instrument(router_span("cleanup", &router))
        .await
    }

    async fn reconcile(
        &self,
        router: &VirtualRouterRef,
        vr: &VirtualRouter,
        nodes: &VirtualNodeTable,
        routes: &[Route],
        route_refs: &[RouteRef],
    ) -> Result<BTreeMap<String, RouteData>, Error> {
        let RouteMatches {
            matched,
            unmatched_routes,
            unmatched_refs,
        } = match_routes(routes, route_refs)?;
        tracing::debug!(
            create = unmatched_routes.len(),
            update = matched.len(),
            delete = unmatched_refs.len(),
            "Reconciling routes",
        );

        let mut routes_by_name = BTreeMap::new();

        let created = self
            .try_batch(
                unmatched_routes
                    .into_iter()
                    .map(|route| self.create_route(router, vr, route, nodes)),
            )
            .await?;
        routes_by_name.extend(created);

        let updated = self
            .try_batch(
                matched
                    .into_iter()
                    .map(|matched| self.update_route(vr, matched, nodes)),
            )
            .await?;
        routes_by_name.extend(updated);

        self.try_batch(
            unmatched_refs
                .into_iter()
                .map(|route_ref| self.delete_route(route_ref)),
        )
        .await?;

        Ok(routes_by_name)
    }

    /// Runs a batch of operations, at most `config.concurrency` at a time.
    /// The first failure drops the operations still in flight.
    async fn try_batch<T, F>(&self, ops: impl Iterator<Item = F>) -> Result<Vec<T>, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        stream::iter(ops)
            .buffer_unordered(self.config.concurrency.get())
            .try_collect()
            .await
    }

    async fn list_route_refs(&self, router: &VirtualRouterRef) -> Result<Vec<RouteRef>, Error> {
        let mut route_refs = Vec::new();
        let mut next_token = None;
        loop {
            let RoutePage { routes, next_token: next } =
                self.api.list_routes(router, next_token).await?;
            route_refs.extend(routes);
            match next {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        tracing::trace!(routes = route_refs.len(), "Listed routes");
        Ok(route_refs)
    }

    async fn create_route(
        &self,
        router: &VirtualRouterRef,
        vr: &VirtualRouter,
        route: &Route,
        nodes: &VirtualNodeTable,
    ) -> Result<(String, RouteData), Error> {
        let spec = build_spec(vr, route, nodes)?;
        tracing::info!(route = %route.name, "Creating route");
        let created = self.api.create_route(router, &route.name, spec).await?;
        Ok((route.name.clone(), created))
    }

    async fn update_route(
        &self,
        vr: &VirtualRouter,
        MatchedRoute { route, route_ref }: MatchedRoute<'_>,
        nodes: &VirtualNodeTable,
    ) -> Result<(String, RouteData), Error> {
        let actual = match self.api.describe_route(route_ref).await {
            Ok(actual) => actual,
            Err(error) if error.is_not_found() => {
                return Err(Error::RouteNotFound(route.name.clone()))
            }
            Err(error) => return Err(error.into()),
        };

        let desired = build_spec(vr, route, nodes)?;
        if desired.equivalent(&actual.spec, Equality::EQUATE_EMPTY) {
            tracing::trace!(route = %route.name, "Route is up to date");
            return Ok((route.name.clone(), actual));
        }

        tracing::debug!(
            route = %route.name,
            actual = ?actual.spec,
            ?desired,
            "Route spec changed",
        );
        tracing::info!(route = %route.name, "Updating route");
        let updated = self.api.update_route(&actual.route_ref(), desired).await?;
        Ok((route.name.clone(), updated))
    }

    /// Deletes a route that is no longer desired.
    async fn delete_route(&self, route_ref: &RouteRef) -> Result<(), Error> {
        let actual = match self.api.describe_route(route_ref).await {
            Ok(actual) => actual,
            Err(error) if error.is_not_found() => {
                tracing::debug!(route = %route_ref.route_name, "Route already deleted");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };
        self.delete_route_ref(&actual.route_ref()).await
    }

    async fn delete_route_ref(&self, route_ref: &RouteRef) -> Result<(), Error> {
        tracing::info!(route = %route_ref.route_name, "Deleting route");
        match self.api.delete_route(route_ref).await {
            Ok(()) => Ok(()),
            Err(error) if error.is_not_found() => {
                tracing::debug!(route = %route_ref.route_name, "Route already deleted");
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }
}

fn build_spec(
    vr: &VirtualRouter,
    route: &Route,
    nodes: &VirtualNodeTable,
) -> Result<route_controller_core::RouteSpec, Error> {
    build_route_spec(vr, route, nodes).map_err(|source| Error::Conversion {
        route: route.name.clone(),
        source,
    })
}

fn router_span(op: &'static str, router: &VirtualRouterRef) -> tracing::Span {
    info_span!(
        "routes",
        op,
        mesh = %router.mesh_name,
        router = %router.virtual_router_name,
    )
}
