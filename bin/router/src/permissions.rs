use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A discrete capability a principal can hold.
///
/// Tokens are independent of each other: holding one never implies another.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ViewPosts,
    ViewComments,
    EditPost,
    CreatePost,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission token '{0}'")]
pub struct UnknownPermissionError(pub String);

/// A set of permission tokens. Membership is the only relation between tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw tokens such as `"VIEW_POSTS"`, failing on the first unknown one.
    pub fn parse<I, S>(tokens: I) -> Result<Self, UnknownPermissionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .map(|token| {
                let token = token.as_ref();
                Permission::from_str(token).map_err(|_| UnknownPermissionError(token.to_string()))
            })
            .collect()
    }

    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// `true` when every token of `required` is held. An empty requirement is always satisfied.
    pub fn contains_all(&self, required: &PermissionSet) -> bool {
        self.0.is_superset(&required.0)
    }

    /// `true` when at least one token of `candidates` is held.
    pub fn contains_any(&self, candidates: &PermissionSet) -> bool {
        !self.0.is_disjoint(&candidates.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Permission; N]> for PermissionSet {
    fn from(permissions: [Permission; N]) -> Self {
        permissions.into_iter().collect()
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "-");
        }

        let tokens = self.0.iter().map(Permission::as_ref).collect::<Vec<_>>();
        write!(f, "{}", tokens.join(", "))
    }
}
