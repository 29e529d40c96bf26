use ahash::{HashMap, HashMapExt};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::trace;

use crate::permissions::{Permission, PermissionSet};
use crate::routes::interpolation::{placeholders, to_matcher_syntax, RouteParams};

/// Every route the application knows about.
///
/// Being a closed enum, referring to a route that does not exist is a compile error,
/// and [`RouteTable::new`] makes sure each variant has exactly one descriptor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[strum(serialize_all = "camelCase")]
pub enum RouteName {
    Login,
    Forbidden,
    NotFound,
    Dashboard,
    Posts,
    Post,
    PostEdit,
    PostComments,
    CreatePost,
}

impl RouteName {
    /// Routes the guard redirects to (or falls back to). They must stay reachable
    /// without signing in, otherwise redirects would loop.
    pub const FALLBACKS: [RouteName; 3] = [
        RouteName::Login,
        RouteName::Forbidden,
        RouteName::NotFound,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reachable without signing in.
    Public,
    /// Requires a signed-in principal holding every required permission.
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewLoading {
    Eager,
    Lazy,
}

/// Opaque reference to the view rendered for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRef {
    pub id: &'static str,
    pub loading: ViewLoading,
}

/// Static description of one navigable path.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub name: RouteName,
    pub path_template: String,
    pub view: ViewRef,
    pub access: Access,
    pub required_permissions: PermissionSet,
    pub required_bundles: Vec<String>,
}

impl RouteDescriptor {
    fn new(
        name: RouteName,
        path_template: impl Into<String>,
        view: &'static str,
        access: Access,
    ) -> Self {
        Self {
            name,
            path_template: path_template.into(),
            view: ViewRef {
                id: view,
                loading: ViewLoading::Lazy,
            },
            access,
            required_permissions: PermissionSet::new(),
            required_bundles: vec![],
        }
    }

    /// A route anybody can visit.
    pub fn public(name: RouteName, path_template: impl Into<String>, view: &'static str) -> Self {
        Self::new(name, path_template, view, Access::Public)
    }

    /// A route that needs a signed-in principal.
    pub fn authenticated(
        name: RouteName,
        path_template: impl Into<String>,
        view: &'static str,
    ) -> Self {
        Self::new(name, path_template, view, Access::Authenticated)
    }

    pub fn requires(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        for permission in permissions {
            self.required_permissions.insert(permission);
        }
        self
    }

    pub fn bundles<S: Into<String>>(mut self, bundles: impl IntoIterator<Item = S>) -> Self {
        for bundle in bundles {
            let bundle = bundle.into();
            if !self.required_bundles.contains(&bundle) {
                self.required_bundles.push(bundle);
            }
        }
        self
    }

    pub fn eager(mut self) -> Self {
        self.view.loading = ViewLoading::Eager;
        self
    }

    pub fn is_public(&self) -> bool {
        self.access == Access::Public
    }

    /// Names of the `:param` placeholders of the path template.
    pub fn params(&self) -> Vec<&str> {
        placeholders(&self.path_template)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouteTableError {
    #[error("route '{0}' is declared more than once")]
    DuplicateName(RouteName),
    #[error("route '{0}' has no descriptor")]
    MissingRoute(RouteName),
    #[error("path '{path}' of route '{name}' must start with '/'")]
    RelativePath { name: RouteName, path: String },
    #[error("path '{path}' of route '{name}' is invalid: {source}")]
    InvalidPath {
        name: RouteName,
        path: String,
        source: matchit::InsertError,
    },
    #[error("route '{0}' is a redirect target and must be public")]
    ProtectedFallback(RouteName),
    #[error("route '{0}' is public but requires permissions")]
    PublicWithPermissions(RouteName),
}

/// A path resolved against the table.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDescriptor,
    pub params: RouteParams,
}

/// The validated, ordered set of route descriptors.
pub struct RouteTable {
    order: Vec<RouteName>,
    by_name: HashMap<RouteName, RouteDescriptor>,
    matcher: matchit::Router<RouteName>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Result<Self, RouteTableError> {
        let mut order = Vec::with_capacity(routes.len());
        let mut by_name = HashMap::with_capacity(routes.len());
        let mut matcher = matchit::Router::new();

        for route in routes {
            if by_name.contains_key(&route.name) {
                return Err(RouteTableError::DuplicateName(route.name));
            }

            if !route.path_template.starts_with('/') {
                return Err(RouteTableError::RelativePath {
                    name: route.name,
                    path: route.path_template,
                });
            }

            if RouteName::FALLBACKS.contains(&route.name) && !route.is_public() {
                return Err(RouteTableError::ProtectedFallback(route.name));
            }

            if route.is_public() && !route.required_permissions.is_empty() {
                return Err(RouteTableError::PublicWithPermissions(route.name));
            }

            matcher
                .insert(to_matcher_syntax(&route.path_template), route.name)
                .map_err(|source| RouteTableError::InvalidPath {
                    name: route.name,
                    path: route.path_template.clone(),
                    source,
                })?;

            order.push(route.name);
            by_name.insert(route.name, route);
        }

        if let Some(missing) = RouteName::iter().find(|name| !by_name.contains_key(name)) {
            return Err(RouteTableError::MissingRoute(missing));
        }

        Ok(Self {
            order,
            by_name,
            matcher,
        })
    }

    /// The descriptor of `name`. Every [`RouteName`] is present once the table is built.
    pub fn route(&self, name: RouteName) -> &RouteDescriptor {
        &self.by_name[&name]
    }

    /// Descriptors in declaration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.order.iter().map(|name| self.route(*name))
    }

    /// Matches a concrete path (query string and fragment are ignored).
    /// Unknown paths resolve to the not-found route.
    pub fn resolve(&self, path: &str) -> RouteMatch<'_> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };

        match self.matcher.at(path) {
            Ok(matched) => {
                let params = matched
                    .params
                    .iter()
                    .fold(RouteParams::new(), |params, (name, value)| {
                        params.with(name, value)
                    });

                RouteMatch {
                    route: self.route(*matched.value),
                    params,
                }
            }
            Err(_) => {
                trace!(path, "no route matched, falling back to not-found");

                RouteMatch {
                    route: self.route(RouteName::NotFound),
                    params: RouteParams::new(),
                }
            }
        }
    }
}
