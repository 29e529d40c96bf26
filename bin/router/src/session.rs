use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use arc_swap::ArcSwapOption;
use route_gate_config::identities::IdentitiesConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::permissions::{Permission, PermissionSet, UnknownPermissionError};

/// The signed-in actor and the permissions it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub identity: String,
    pub permissions: PermissionSet,
}

impl Principal {
    pub fn new(identity: impl Into<String>, permissions: impl Into<PermissionSet>) -> Self {
        Self {
            identity: identity.into(),
            permissions: permissions.into(),
        }
    }
}

/// Read side of the current principal, as consumed by navigation and guards.
pub trait PermissionStore: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn has_permission(&self, permission: Permission) -> bool;
    fn has_all_permissions(&self, permissions: &PermissionSet) -> bool;
    fn has_any_permission(&self, permissions: &PermissionSet) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown login profile '{0}'")]
    UnknownProfile(String),
    #[error("identity profile '{profile}' is invalid: {source}")]
    InvalidIdentity {
        profile: String,
        source: UnknownPermissionError,
    },
    #[error("failed to read persisted session at '{path}': {source}")]
    PersistRead { path: PathBuf, source: io::Error },
    #[error("failed to write persisted session at '{path}': {source}")]
    PersistWrite { path: PathBuf, source: io::Error },
    #[error("persisted session at '{path}' is malformed: {source}")]
    PersistDecode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode session: {0}")]
    PersistEncode(serde_json::Error),
}

/// The canned identities a login can pick from, keyed by profile name.
#[derive(Debug, Clone, Default)]
pub struct Identities(BTreeMap<String, Principal>);

impl Identities {
    pub fn from_config(config: &IdentitiesConfig) -> Result<Self, SessionError> {
        config
            .0
            .iter()
            .map(|(profile, identity)| {
                let permissions = PermissionSet::parse(&identity.permissions).map_err(|source| {
                    SessionError::InvalidIdentity {
                        profile: profile.clone(),
                        source,
                    }
                })?;

                Ok((
                    profile.clone(),
                    Principal::new(identity.identity.clone(), permissions),
                ))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }

    pub fn get(&self, profile: &str) -> Option<&Principal> {
        self.0.get(profile)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Owner of the current principal. There is exactly one writer (login/logout);
/// everybody else reads through a [`SessionView`].
pub struct Session {
    current: Arc<ArcSwapOption<Principal>>,
    identities: Identities,
    persist_path: Option<PathBuf>,
}

impl Session {
    pub fn new(identities: Identities) -> Self {
        Self {
            current: Arc::new(ArcSwapOption::empty()),
            identities,
            persist_path: None,
        }
    }

    /// Creates a session backed by a JSON file, restoring the principal stored there.
    /// A missing file means nobody is signed in.
    pub fn with_persistence(
        identities: Identities,
        persist_path: impl Into<PathBuf>,
    ) -> Result<Self, SessionError> {
        let persist_path = persist_path.into();
        let restored = read_persisted(&persist_path)?;

        if let Some(principal) = restored.as_ref() {
            info!(
                identity = %principal.identity,
                "restored session from {}",
                persist_path.display()
            );
        }

        Ok(Self {
            current: Arc::new(ArcSwapOption::from(restored.map(Arc::new))),
            identities,
            persist_path: Some(persist_path),
        })
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            current: self.current.clone(),
        }
    }

    pub fn identities(&self) -> &Identities {
        &self.identities
    }

    pub fn current(&self) -> Option<Arc<Principal>> {
        self.current.load_full()
    }

    /// Signs in as one of the canned identities.
    pub fn login(&self, profile: &str) -> Result<Arc<Principal>, SessionError> {
        let principal = self
            .identities
            .get(profile)
            .cloned()
            .ok_or_else(|| SessionError::UnknownProfile(profile.to_string()))?;

        self.login_as(principal)
    }

    pub fn login_as(&self, principal: Principal) -> Result<Arc<Principal>, SessionError> {
        if let Some(path) = self.persist_path.as_deref() {
            write_persisted(path, &principal)?;
        }

        let principal = Arc::new(principal);
        self.current.store(Some(principal.clone()));
        info!(
            identity = %principal.identity,
            permissions = %principal.permissions,
            "signed in"
        );

        Ok(principal)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        if let Some(path) = self.persist_path.as_deref() {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(SessionError::PersistWrite {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            }
        }

        if let Some(previous) = self.current.swap(None) {
            info!(identity = %previous.identity, "signed out");
        }

        Ok(())
    }
}

fn read_persisted(path: &Path) -> Result<Option<Principal>, SessionError> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("no persisted session at {}", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(SessionError::PersistRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice::<Option<Principal>>(&raw).map_err(|source| {
        SessionError::PersistDecode {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn write_persisted(path: &Path, principal: &Principal) -> Result<(), SessionError> {
    let raw = serde_json::to_vec_pretty(principal).map_err(SessionError::PersistEncode)?;

    fs::write(path, raw).map_err(|source| SessionError::PersistWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Read-only, cheaply cloneable handle on the live principal.
///
/// Every call loads the current value, so a login or logout is visible to the
/// very next check.
#[derive(Clone)]
pub struct SessionView {
    current: Arc<ArcSwapOption<Principal>>,
}

impl SessionView {
    pub fn principal(&self) -> Option<Arc<Principal>> {
        self.current.load_full()
    }
}

impl PermissionStore for SessionView {
    fn is_authenticated(&self) -> bool {
        self.current.load().is_some()
    }

    fn has_permission(&self, permission: Permission) -> bool {
        self.current
            .load_full()
            .is_some_and(|principal| principal.permissions.contains(permission))
    }

    fn has_all_permissions(&self, permissions: &PermissionSet) -> bool {
        self.current
            .load_full()
            .is_some_and(|principal| principal.permissions.contains_all(permissions))
    }

    fn has_any_permission(&self, permissions: &PermissionSet) -> bool {
        self.current
            .load_full()
            .is_some_and(|principal| principal.permissions.contains_any(permissions))
    }
}
