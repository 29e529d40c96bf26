#[cfg(test)]
mod tests;

use std::{future::Future, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    bundles::{load_bundles, BundleLoader},
    routes::{RouteName, RouteParams, RouteTable},
    session::PermissionStore,
};

/// Where a navigation attempt stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// The path was matched, checks have not run yet.
    Resolving,
    /// Access was granted and the route's bundles are loading.
    LoadingPrerequisites,
    /// The view of the route may render.
    Allowed { route: RouteName },
    /// Nobody is signed in. `from` is the path to return to after login.
    RedirectLogin { from: String },
    /// The principal lacks a required permission.
    RedirectForbidden,
}

impl GuardState {
    pub fn is_settled(&self) -> bool {
        !matches!(
            self,
            GuardState::Resolving | GuardState::LoadingPrerequisites
        )
    }
}

/// What presentation observes about the latest navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardSnapshot {
    pub generation: u64,
    pub path: String,
    pub route: RouteName,
    pub params: RouteParams,
    pub state: GuardState,
}

struct Current {
    generation: u64,
    token: CancellationToken,
}

struct GuardInner {
    table: Arc<RouteTable>,
    permissions: Arc<dyn PermissionStore>,
    loader: Arc<dyn BundleLoader>,
    load_timeout: Duration,
    current: Mutex<Current>,
    snapshot: watch::Sender<Option<GuardSnapshot>>,
}

/// Gate evaluated on every navigation.
///
/// Each call to [`RouteGuard::navigate`] starts a new generation and cancels the
/// previous one. Only the latest navigation may publish states, so a slow bundle
/// load of an abandoned navigation can never overwrite a newer decision.
#[derive(Clone)]
pub struct RouteGuard {
    inner: Arc<GuardInner>,
}

impl RouteGuard {
    pub fn new(
        table: Arc<RouteTable>,
        permissions: Arc<dyn PermissionStore>,
        loader: Arc<dyn BundleLoader>,
        load_timeout: Duration,
    ) -> Self {
        let (snapshot, _) = watch::channel(None);

        Self {
            inner: Arc::new(GuardInner {
                table,
                permissions,
                loader,
                load_timeout,
                current: Mutex::new(Current {
                    generation: 0,
                    token: CancellationToken::new(),
                }),
                snapshot,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GuardSnapshot>> {
        self.inner.snapshot.subscribe()
    }

    /// The latest published snapshot, `None` before the first navigation.
    pub fn snapshot(&self) -> Option<GuardSnapshot> {
        self.inner.snapshot.borrow().clone()
    }

    /// Starts evaluating `path`.
    ///
    /// `Resolving` is published before this returns. The returned future drives
    /// the rest of the state machine and resolves to the settled state, or to
    /// `None` when a newer navigation superseded this one.
    pub fn navigate(
        &self,
        path: &str,
    ) -> impl Future<Output = Option<GuardState>> + Send + 'static {
        let inner = self.inner.clone();
        let (generation, token, route) = inner.begin(path);
        let path = path.to_string();

        async move { inner.evaluate(generation, token, path, route).await }
    }
}

impl GuardInner {
    fn begin(&self, path: &str) -> (u64, CancellationToken, RouteName) {
        let matched = self.table.resolve(path);
        let route = matched.route.name;
        let token = CancellationToken::new();

        let mut current = self.current.lock();
        current.token.cancel();
        current.token = token.clone();
        current.generation += 1;
        let generation = current.generation;

        debug!(generation, path, route = %route, "resolving navigation");
        self.snapshot.send_replace(Some(GuardSnapshot {
            generation,
            path: path.to_string(),
            route,
            params: matched.params,
            state: GuardState::Resolving,
        }));

        (generation, token, route)
    }

    async fn evaluate(
        &self,
        generation: u64,
        token: CancellationToken,
        path: String,
        route: RouteName,
    ) -> Option<GuardState> {
        let route = self.table.route(route);

        if !route.is_public() {
            if !self.permissions.is_authenticated() {
                return self.settle(generation, GuardState::RedirectLogin { from: path });
            }

            if !self
                .permissions
                .has_all_permissions(&route.required_permissions)
            {
                return self.settle(generation, GuardState::RedirectForbidden);
            }
        }

        if !self.loader.is_ready(&route.required_bundles) {
            if !self.publish(generation, GuardState::LoadingPrerequisites) {
                return None;
            }

            tokio::select! {
                _ = token.cancelled() => {
                    debug!(generation, "navigation superseded while loading bundles");
                    return None;
                }
                _ = load_bundles(
                    self.loader.as_ref(),
                    &route.required_bundles,
                    self.load_timeout,
                ) => {}
            }
        }

        self.settle(generation, GuardState::Allowed { route: route.name })
    }

    fn settle(&self, generation: u64, state: GuardState) -> Option<GuardState> {
        self.publish(generation, state.clone()).then_some(state)
    }

    /// Publishes `state` if `generation` is still the latest navigation.
    fn publish(&self, generation: u64, state: GuardState) -> bool {
        let current = self.current.lock();
        if current.generation != generation {
            debug!(
                generation,
                latest = current.generation,
                "discarding stale navigation state"
            );
            return false;
        }

        debug!(generation, state = ?state, "navigation state changed");
        self.snapshot.send_modify(|snapshot| {
            if let Some(snapshot) = snapshot.as_mut() {
                snapshot.state = state;
            }
        });

        true
    }
}
