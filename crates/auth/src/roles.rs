use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role string carried on a principal record.
///
/// Roles are opaque at this layer except for the one distinction the guard
/// needs: whether an institution administrator is school-level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

/// Role value identifying a school-level administrator.
pub const SCHOOL_LEVEL_ROLE: &str = "teacher";

/// Administrative reach of an institution administrator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminTier {
    Platform,
    School,
}

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_school_level(&self) -> bool {
        self.as_str() == SCHOOL_LEVEL_ROLE
    }

    pub fn admin_tier(&self) -> AdminTier {
        if self.is_school_level() {
            AdminTier::School
        } else {
            AdminTier::Platform
        }
    }
}

impl AdminTier {
    /// Tier for an optional role; a missing role is platform-level.
    pub fn of(role: Option<&Role>) -> Self {
        role.map(Role::admin_tier).unwrap_or(AdminTier::Platform)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
