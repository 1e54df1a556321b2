//! The four user realms and their fixed destinations and storage keys.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An independent user category with its own credential lifecycle.
///
/// The set is closed: every realm owns exactly one session, one login
/// destination and one disjoint slice of persistent storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Realm {
    Learner,
    Instructor,
    InstitutionAdmin,
    ChannelPartner,
}

/// Persistent storage keys owned by one realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageKeys {
    pub access: &'static str,
    pub refresh: &'static str,
    pub principal: &'static str,
    /// Realm-specific nested profile (only the instructor's institution summary today).
    pub institution: Option<&'static str>,
    /// Older key names still honoured when reading and removed when clearing.
    pub legacy_access: &'static [&'static str],
    pub legacy_refresh: &'static [&'static str],
}

impl StorageKeys {
    /// Every key this realm may have written, including legacy aliases.
    pub fn all(&self) -> impl Iterator<Item = &'static str> + '_ {
        [self.access, self.refresh, self.principal]
            .into_iter()
            .chain(self.institution)
            .chain(self.legacy_access.iter().copied())
            .chain(self.legacy_refresh.iter().copied())
    }

    /// Access credential keys in lookup order (primary first).
    pub fn access_lookup(&self) -> impl Iterator<Item = &'static str> + '_ {
        core::iter::once(self.access).chain(self.legacy_access.iter().copied())
    }

    /// Refresh credential keys in lookup order (primary first).
    pub fn refresh_lookup(&self) -> impl Iterator<Item = &'static str> + '_ {
        core::iter::once(self.refresh).chain(self.legacy_refresh.iter().copied())
    }
}

const LEARNER_KEYS: StorageKeys = StorageKeys {
    access: "access_token",
    refresh: "refresh_token",
    principal: "user_info",
    institution: None,
    legacy_access: &["student_access_token"],
    legacy_refresh: &["student_refresh_token"],
};

const INSTRUCTOR_KEYS: StorageKeys = StorageKeys {
    access: "teacher_access_token",
    refresh: "teacher_refresh_token",
    principal: "teacher_info",
    institution: Some("teacher_school_info"),
    legacy_access: &[],
    legacy_refresh: &[],
};

const ADMIN_KEYS: StorageKeys = StorageKeys {
    access: "admin_access_token",
    refresh: "admin_refresh_token",
    principal: "admin_info",
    institution: None,
    legacy_access: &[],
    legacy_refresh: &[],
};

const CHANNEL_KEYS: StorageKeys = StorageKeys {
    access: "channel_access_token",
    refresh: "channel_refresh_token",
    principal: "channel_info",
    institution: None,
    legacy_access: &[],
    legacy_refresh: &[],
};

/// Restricted home for school-level institution administrators.
pub const SCHOOL_ADMIN_HOME: &str = "/admin/classes";

/// Secondary login page for platform-level administrators.
pub const PLATFORM_ADMIN_LOGIN: &str = "/platform-admin/login";

impl Realm {
    pub const ALL: [Realm; 4] = [
        Realm::Learner,
        Realm::Instructor,
        Realm::InstitutionAdmin,
        Realm::ChannelPartner,
    ];

    /// Order in which the navigation guard evaluates realm requirements.
    pub const PRECEDENCE: [Realm; 4] = [
        Realm::ChannelPartner,
        Realm::Instructor,
        Realm::InstitutionAdmin,
        Realm::Learner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Realm::Learner => "learner",
            Realm::Instructor => "instructor",
            Realm::InstitutionAdmin => "institution_admin",
            Realm::ChannelPartner => "channel_partner",
        }
    }

    /// Dense index, stable for the lifetime of the process.
    pub fn index(&self) -> usize {
        match self {
            Realm::Learner => 0,
            Realm::Instructor => 1,
            Realm::InstitutionAdmin => 2,
            Realm::ChannelPartner => 3,
        }
    }

    pub fn login_path(&self) -> &'static str {
        match self {
            Realm::Learner => "/login",
            Realm::Instructor => "/teacher/login",
            Realm::InstitutionAdmin => "/admin/login",
            Realm::ChannelPartner => "/channel/login",
        }
    }

    /// Default landing page once authenticated.
    pub fn home_path(&self) -> &'static str {
        match self {
            Realm::Learner => "/",
            Realm::Instructor => "/teacher",
            Realm::InstitutionAdmin => "/admin",
            Realm::ChannelPartner => "/channel",
        }
    }

    pub fn storage_keys(&self) -> &'static StorageKeys {
        match self {
            Realm::Learner => &LEARNER_KEYS,
            Realm::Instructor => &INSTRUCTOR_KEYS,
            Realm::InstitutionAdmin => &ADMIN_KEYS,
            Realm::ChannelPartner => &CHANNEL_KEYS,
        }
    }
}

impl core::fmt::Display for Realm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown realm '{0}'")]
pub struct ParseRealmError(pub String);

impl FromStr for Realm {
    type Err = ParseRealmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "learner" | "student" => Ok(Realm::Learner),
            "instructor" | "teacher" => Ok(Realm::Instructor),
            "institution_admin" | "admin" => Ok(Realm::InstitutionAdmin),
            "channel_partner" | "channel" => Ok(Realm::ChannelPartner),
            other => Err(ParseRealmError(other.to_string())),
        }
    }
}
