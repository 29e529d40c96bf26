use std::{sync::Arc, time::Duration};

use route_gate_config::RouteGateConfig;
use tracing::{debug, info};

use crate::{
    bundles::TranslationStore,
    error::RouterInitError,
    guard::{GuardSnapshot, GuardState, RouteGuard},
    navigation::{History, MemoryHistory, NavigationError, NavigationState, Navigator},
    routes::{default_route_table, RouteName, RouteParams, RouteTable},
    session::{Identities, Session, SessionError},
};

/// The view currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub snapshot: GuardSnapshot,
    pub view: &'static str,
    pub title: String,
}

/// Ties the session, history, navigation facade and guard together.
///
/// Guard redirects become history replacements, and a successful login
/// returns to the path recorded when the user was sent to the login page.
pub struct App {
    table: Arc<RouteTable>,
    session: Session,
    history: Arc<MemoryHistory>,
    translations: Arc<TranslationStore>,
    navigator: Navigator,
    guard: RouteGuard,
}

impl App {
    pub fn new(
        table: RouteTable,
        session: Session,
        translations: Arc<TranslationStore>,
        load_timeout: Duration,
    ) -> Self {
        let table = Arc::new(table);
        let history = Arc::new(MemoryHistory::default());
        let permissions = Arc::new(session.view());

        let navigator = Navigator::new(table.clone(), permissions.clone(), history.clone());
        let guard = RouteGuard::new(
            table.clone(),
            permissions,
            translations.clone(),
            load_timeout,
        );

        Self {
            table,
            session,
            history,
            translations,
            navigator,
            guard,
        }
    }

    pub fn from_config(config: &RouteGateConfig) -> Result<Self, RouterInitError> {
        let table = default_route_table()?;
        let identities = Identities::from_config(&config.identities)?;
        let session = match config.session_persist_path() {
            Some(path) => Session::with_persistence(identities, path)?,
            None => Session::new(identities),
        };
        let translations = Arc::new(TranslationStore::from_config(config));

        info!(
            routes = table.routes().count(),
            locale = %translations.locale(),
            "application router ready"
        );

        Ok(Self::new(
            table,
            session,
            translations,
            config.bundles.load_timeout,
        ))
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &MemoryHistory {
        &self.history
    }

    pub fn translations(&self) -> &TranslationStore {
        &self.translations
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Opens `path` as if typed into the address bar.
    pub async fn visit(&self, path: &str) -> Option<Screen> {
        self.history.push(path);
        self.render().await
    }

    /// Navigates through the route's handle, refusing routes the principal cannot access.
    pub async fn go(
        &self,
        route: RouteName,
        params: &RouteParams,
    ) -> Result<Option<Screen>, NavigationError> {
        self.navigator.handle(route).go(params)?;
        Ok(self.render().await)
    }

    pub async fn back(&self) -> Option<Screen> {
        if !self.history.back() {
            debug!("already at the first history entry");
        }
        self.render().await
    }

    /// Signs in and returns to the page that sent the user to the login screen.
    pub async fn login(&self, profile: &str) -> Result<Option<Screen>, SessionError> {
        self.session.login(profile)?;

        let target = self
            .history
            .current()
            .state
            .from
            .unwrap_or_else(|| self.home_path().to_string());
        self.history.replace(&target, NavigationState::default());

        Ok(self.render().await)
    }

    /// Signs out and re-evaluates the current page.
    pub async fn logout(&self) -> Result<Option<Screen>, SessionError> {
        self.session.logout()?;
        Ok(self.render().await)
    }

    /// Runs the guard against the current history entry until it settles on a view.
    ///
    /// Returns `None` when another navigation took over in the meantime.
    pub async fn render(&self) -> Option<Screen> {
        loop {
            let location = self.history.current();

            match self.guard.navigate(&location.path).await? {
                GuardState::RedirectLogin { from } => {
                    debug!(from = %from, "sign in required");
                    self.history.replace(
                        self.fallback_path(RouteName::Login),
                        NavigationState::from_path(from),
                    );
                }
                GuardState::RedirectForbidden => {
                    self.history.replace(
                        self.fallback_path(RouteName::Forbidden),
                        NavigationState::default(),
                    );
                }
                GuardState::Allowed {
                    route: RouteName::Login,
                } if self.session.current().is_some() => {
                    self.history
                        .replace(self.home_path(), NavigationState::default());
                }
                GuardState::Allowed { route } => return self.screen(route),
                GuardState::Resolving | GuardState::LoadingPrerequisites => return None,
            }
        }
    }

    fn screen(&self, route: RouteName) -> Option<Screen> {
        let snapshot = self.guard.snapshot()?;
        let descriptor = self.table.route(route);
        let title = match descriptor.required_bundles.first() {
            Some(bundle) => self
                .translations
                .translate(&format!("{}:title", bundle), descriptor.view.id),
            None => descriptor.view.id.to_string(),
        };

        Some(Screen {
            snapshot,
            view: descriptor.view.id,
            title,
        })
    }

    fn fallback_path(&self, route: RouteName) -> &str {
        &self.table.route(route).path_template
    }

    fn home_path(&self) -> &str {
        &self.table.route(RouteName::Dashboard).path_template
    }
}
