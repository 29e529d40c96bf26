use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    navigation::history::History,
    routes::{interpolate, RouteDescriptor, RouteName, RouteParams, RouteTable},
    session::PermissionStore,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("you do not have permission to access '{route}'")]
    Forbidden { route: RouteName },
}

/// Entry point for programmatic navigation. One [`NavigationHandle`] per route.
///
/// The navigator holds the live permission store, never a snapshot of it, so
/// a login or logout is honoured by the next [`NavigationHandle::go`].
#[derive(Clone)]
pub struct Navigator {
    table: Arc<RouteTable>,
    permissions: Arc<dyn PermissionStore>,
    history: Arc<dyn History>,
}

impl Navigator {
    pub fn new(
        table: Arc<RouteTable>,
        permissions: Arc<dyn PermissionStore>,
        history: Arc<dyn History>,
    ) -> Self {
        Self {
            table,
            permissions,
            history,
        }
    }

    pub fn handle(&self, name: RouteName) -> NavigationHandle<'_> {
        NavigationHandle {
            navigator: self,
            route: self.table.route(name),
        }
    }

    /// Handles of every route, in table order.
    pub fn handles(&self) -> impl Iterator<Item = NavigationHandle<'_>> {
        self.table.routes().map(|route| NavigationHandle {
            navigator: self,
            route,
        })
    }
}

pub struct NavigationHandle<'a> {
    navigator: &'a Navigator,
    route: &'a RouteDescriptor,
}

impl NavigationHandle<'_> {
    pub fn name(&self) -> RouteName {
        self.route.name
    }

    pub fn route(&self) -> &RouteDescriptor {
        self.route
    }

    /// The concrete path of the route for `params`. Never fails: missing
    /// parameters are left as placeholders.
    pub fn get(&self, params: &RouteParams) -> String {
        interpolate(&self.route.path_template, params)
    }

    /// Navigates to the route when the current principal holds every required
    /// permission. History is left untouched otherwise.
    pub fn go(&self, params: &RouteParams) -> Result<String, NavigationError> {
        let path = self.get(params);
        let required = &self.route.required_permissions;

        if !required.is_empty() && !self.navigator.permissions.has_all_permissions(required) {
            warn!(
                route = %self.route.name,
                required = %required,
                "navigation refused, missing permissions"
            );

            return Err(NavigationError::Forbidden {
                route: self.route.name,
            });
        }

        debug!(route = %self.route.name, path = %path, "navigating");
        self.navigator.history.push(&path);

        Ok(path)
    }
}
