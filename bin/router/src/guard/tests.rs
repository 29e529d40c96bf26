use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use dashmap::DashSet;
use parking_lot::Mutex;
use route_gate_config::identities::IdentitiesConfig;
use tokio::sync::Semaphore;

use crate::{
    bundles::{BundleLoadError, BundleLoader},
    guard::{GuardSnapshot, GuardState, RouteGuard},
    permissions::{Permission, PermissionSet},
    routes::{default_route_table, default_routes, RouteDescriptor, RouteName, RouteTable},
    session::{Identities, Principal, Session},
    testkit::init_logger,
};

/// Records every load. Bundles listed in `gated` block until [`TestLoader::open`]
/// is called, `broken` always fails.
struct TestLoader {
    loaded: DashSet<String>,
    requested: Mutex<Vec<String>>,
    gated: Vec<String>,
    gate: Semaphore,
}

impl TestLoader {
    fn new(gated: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            loaded: DashSet::new(),
            requested: Mutex::new(vec![]),
            gated: gated.iter().map(|bundle| bundle.to_string()).collect(),
            gate: Semaphore::new(0),
        })
    }

    fn preloaded(bundles: &[&str]) -> Arc<Self> {
        let loader = Self::new(&[]);
        for bundle in bundles {
            loader.loaded.insert(bundle.to_string());
        }
        loader
    }

    fn open(&self) {
        self.gate.add_permits(16);
    }

    fn requested(&self) -> Vec<String> {
        let mut requested = self.requested.lock().clone();
        requested.sort();
        requested
    }
}

#[async_trait]
impl BundleLoader for TestLoader {
    fn is_ready(&self, bundles: &[String]) -> bool {
        bundles.iter().all(|bundle| self.loaded.contains(bundle))
    }

    async fn load(&self, bundle: &str) -> Result<(), BundleLoadError> {
        self.requested.lock().push(bundle.to_string());

        if self.gated.iter().any(|gated| gated == bundle) {
            drop(self.gate.acquire().await);
        }

        if bundle == "broken" {
            return Err(BundleLoadError::NotFound {
                bundle: bundle.to_string(),
                locales: vec!["tr".to_string()],
            });
        }

        self.loaded.insert(bundle.to_string());
        Ok(())
    }
}

fn session() -> Session {
    Session::new(Identities::from_config(&IdentitiesConfig::default()).unwrap())
}

fn guard(session: &Session, loader: Arc<TestLoader>) -> RouteGuard {
    RouteGuard::new(
        Arc::new(default_route_table().unwrap()),
        Arc::new(session.view()),
        loader,
        Duration::from_secs(5),
    )
}

fn is_loading(snapshot: &Option<GuardSnapshot>) -> bool {
    snapshot
        .as_ref()
        .is_some_and(|snapshot| snapshot.state == GuardState::LoadingPrerequisites)
}

#[tokio::test]
async fn unauthenticated_visitor_is_sent_to_login() {
    init_logger();
    let session = session();
    let loader = TestLoader::new(&[]);
    let guard = guard(&session, loader.clone());

    assert_eq!(
        guard.navigate("/").await,
        Some(GuardState::RedirectLogin {
            from: "/".to_string()
        })
    );
    assert_eq!(
        guard.navigate("/posts/create").await,
        Some(GuardState::RedirectLogin {
            from: "/posts/create".to_string()
        })
    );
    assert!(loader.requested().is_empty());
}

#[tokio::test]
async fn redirect_snapshot_keeps_the_requested_path() {
    init_logger();
    let session = session();
    let guard = guard(&session, TestLoader::new(&[]));

    guard.navigate("/posts/7/comments").await;

    insta::assert_debug_snapshot!(guard.snapshot(), @r#"
    Some(
        GuardSnapshot {
            generation: 1,
            path: "/posts/7/comments",
            route: PostComments,
            params: RouteParams(
                {
                    "id": "7",
                },
            ),
            state: RedirectLogin {
                from: "/posts/7/comments",
            },
        },
    )
    "#);
}

#[tokio::test]
async fn missing_permission_is_forbidden_before_any_bundle_loads() {
    init_logger();
    let session = session();
    session
        .login_as(Principal::new("Reader", [Permission::ViewPosts]))
        .unwrap();
    let loader = TestLoader::new(&[]);
    let guard = guard(&session, loader.clone());

    assert_eq!(
        guard.navigate("/posts/create").await,
        Some(GuardState::RedirectForbidden)
    );
    assert_eq!(guard.navigate("/").await, Some(GuardState::RedirectForbidden));
    assert!(loader.requested().is_empty());
}

#[tokio::test]
async fn bundles_settle_before_the_view_is_allowed() {
    init_logger();
    let session = session();
    session.login("viewer").unwrap();
    let loader = TestLoader::new(&["dashboard"]);
    let guard = guard(&session, loader.clone());
    let mut states = guard.subscribe();

    let navigation = guard.navigate("/");
    assert_eq!(
        guard.snapshot().map(|snapshot| snapshot.state),
        Some(GuardState::Resolving)
    );

    let navigation = tokio::spawn(navigation);
    states.wait_for(is_loading).await.unwrap();
    assert!(!loader.is_ready(&["dashboard".to_string()]));

    loader.open();
    assert_eq!(
        navigation.await.unwrap(),
        Some(GuardState::Allowed {
            route: RouteName::Dashboard
        })
    );
    assert_eq!(loader.requested(), vec!["comments", "dashboard", "posts"]);
    assert!(guard.snapshot().is_some_and(|snapshot| snapshot.state.is_settled()));
}

#[tokio::test]
async fn ready_bundles_are_not_loaded_again() {
    init_logger();
    let session = session();
    session.login("viewer").unwrap();
    let loader = TestLoader::preloaded(&["posts", "comments"]);
    let guard = guard(&session, loader.clone());

    assert_eq!(
        guard.navigate("/posts/12").await,
        Some(GuardState::Allowed {
            route: RouteName::Post
        })
    );
    assert!(loader.requested().is_empty());
}

#[tokio::test]
async fn failed_bundles_do_not_block_the_view() {
    init_logger();
    let session = session();
    session.login("admin").unwrap();
    let routes = default_routes()
        .into_iter()
        .map(|route| match route.name {
            RouteName::CreatePost => route.bundles(["broken"]),
            _ => route,
        })
        .collect();
    let loader = TestLoader::new(&[]);
    let guard = RouteGuard::new(
        Arc::new(RouteTable::new(routes).unwrap()),
        Arc::new(session.view()),
        loader.clone(),
        Duration::from_secs(5),
    );

    assert_eq!(
        guard.navigate("/posts/create").await,
        Some(GuardState::Allowed {
            route: RouteName::CreatePost
        })
    );
    assert_eq!(loader.requested(), vec!["broken", "posts"]);
    assert!(!loader.is_ready(&["broken".to_string()]));
}

#[tokio::test]
async fn newer_navigation_wins_over_a_pending_one() {
    init_logger();
    let session = session();
    session.login("viewer").unwrap();
    let loader = TestLoader::new(&["dashboard"]);
    let guard = guard(&session, loader.clone());
    let mut states = guard.subscribe();

    let first = tokio::spawn(guard.navigate("/"));
    states.wait_for(is_loading).await.unwrap();

    assert_eq!(
        guard.navigate("/posts").await,
        Some(GuardState::Allowed {
            route: RouteName::Posts
        })
    );
    assert_eq!(first.await.unwrap(), None);

    loader.open();
    tokio::task::yield_now().await;

    let snapshot = guard.snapshot().unwrap();
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.route, RouteName::Posts);
    assert_eq!(
        snapshot.state,
        GuardState::Allowed {
            route: RouteName::Posts
        }
    );
}

#[tokio::test]
async fn earlier_navigation_cannot_publish_after_a_newer_one() {
    init_logger();
    let session = session();
    session.login("viewer").unwrap();
    let loader = TestLoader::new(&["dashboard"]);
    let guard = guard(&session, loader.clone());

    let first = guard.navigate("/");
    let second = guard.navigate("/login");

    assert_eq!(first.await, None);
    assert_eq!(
        second.await,
        Some(GuardState::Allowed {
            route: RouteName::Login
        })
    );
    assert_eq!(guard.snapshot().unwrap().path, "/login");
}

#[tokio::test]
async fn public_and_unknown_paths_are_allowed_without_a_principal() {
    init_logger();
    let session = session();
    let guard = guard(&session, TestLoader::new(&[]));

    assert_eq!(
        guard.navigate("/login").await,
        Some(GuardState::Allowed {
            route: RouteName::Login
        })
    );
    assert_eq!(
        guard.navigate("/does/not/exist").await,
        Some(GuardState::Allowed {
            route: RouteName::NotFound
        })
    );
    assert_eq!(guard.snapshot().unwrap().path, "/does/not/exist");
}

#[tokio::test]
async fn guard_reads_the_live_principal() {
    init_logger();
    let session = session();
    let guard = guard(&session, TestLoader::new(&[]));

    assert!(matches!(
        guard.navigate("/posts/1/edit").await,
        Some(GuardState::RedirectLogin { .. })
    ));

    session.login("viewer").unwrap();
    assert_eq!(
        guard.navigate("/posts/1/edit").await,
        Some(GuardState::RedirectForbidden)
    );

    session.login("admin").unwrap();
    assert_eq!(
        guard.navigate("/posts/1/edit").await,
        Some(GuardState::Allowed {
            route: RouteName::PostEdit
        })
    );
}

#[tokio::test]
async fn sign_in_is_required_even_without_permissions() {
    init_logger();
    let session = session();
    let routes = default_routes()
        .into_iter()
        .map(|route| match route.name {
            RouteName::Posts => {
                RouteDescriptor::authenticated(RouteName::Posts, "/posts", "PostsPage")
            }
            _ => route,
        })
        .collect();
    let loader = TestLoader::new(&[]);
    let guard = RouteGuard::new(
        Arc::new(RouteTable::new(routes).unwrap()),
        Arc::new(session.view()),
        loader.clone(),
        Duration::from_secs(5),
    );

    assert_eq!(
        guard.navigate("/posts").await,
        Some(GuardState::RedirectLogin {
            from: "/posts".to_string()
        })
    );

    session
        .login_as(Principal::new("Nobody", PermissionSet::new()))
        .unwrap();
    assert_eq!(
        guard.navigate("/posts").await,
        Some(GuardState::Allowed {
            route: RouteName::Posts
        })
    );
}
