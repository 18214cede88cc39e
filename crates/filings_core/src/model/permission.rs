//! Role-based permission model.
//!
//! # Responsibility
//! - Define the fixed action catalog and canonical role grant tables.
//! - Answer `has_permission` checks with hierarchical prefix matching.
//!
//! # Invariants
//! - A grant of `action` authorizes every action whose text starts with it
//!   (`update` authorizes `update-representative`).
//! - A role with no grant for an object denies every action on it.
//! - Unknown role names resolve to an empty grant set.

use crate::error::{CoreError, CoreResult};
use crate::model::ident::EntityKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const ACTION_CREATE: &str = "create";
pub const ACTION_READ_ALL: &str = "read-all";
pub const ACTION_READ_SUPERVISORS: &str = "read-supervisors";
pub const ACTION_READ_REPRESENTATIVES: &str = "read-representatives";
pub const ACTION_READ_ASSIGNED: &str = "read-assigned";
pub const ACTION_READ_OPEN: &str = "read-open";
pub const ACTION_READ_OWN: &str = "read-own";
pub const ACTION_UPDATE: &str = "update";
pub const ACTION_UPDATE_REPRESENTATIVE: &str = "update-representative";
pub const ACTION_UPDATE_SUPERVISOR: &str = "update-supervisor";
pub const ACTION_UPDATE_OPEN_STATE: &str = "update-open-state";
pub const ACTION_UPDATE_OWN: &str = "update-own";
pub const ACTION_DELETE: &str = "delete";
pub const ACTION_DELETE_EMPTY: &str = "delete-empty";
pub const ACTION_DELETE_OWN: &str = "delete-own";
pub const ACTION_SUPERVISE: &str = "supervise";
pub const ACTION_REPRESENT: &str = "represent";

const ACTION_CATALOG: &[&str] = &[
    ACTION_CREATE,
    ACTION_READ_ALL,
    ACTION_READ_SUPERVISORS,
    ACTION_READ_REPRESENTATIVES,
    ACTION_READ_ASSIGNED,
    ACTION_READ_OPEN,
    ACTION_READ_OWN,
    ACTION_UPDATE,
    ACTION_UPDATE_REPRESENTATIVE,
    ACTION_UPDATE_SUPERVISOR,
    ACTION_UPDATE_OPEN_STATE,
    ACTION_UPDATE_OWN,
    ACTION_DELETE,
    ACTION_DELETE_EMPTY,
    ACTION_DELETE_OWN,
    ACTION_SUPERVISE,
    ACTION_REPRESENT,
];

// `Object:action`, e.g. `Calls:read-open`.
static GRANT_SPEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+):([a-z]+(?:-[a-z]+)*)$").expect("valid grant spec regex")
});

/// Returns the fixed action catalog.
pub fn action_catalog() -> &'static [&'static str] {
    ACTION_CATALOG
}

/// One immutable (object, action) grant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Permission {
    object: EntityKind,
    action: String,
}

impl Permission {
    /// Creates a grant after checking the action against the catalog.
    pub fn new(object: EntityKind, action: &str) -> CoreResult<Self> {
        let action = action.trim();
        if !ACTION_CATALOG.contains(&action) {
            return Err(CoreError::format(
                "permission action",
                format!("`{action}` is not in the action catalog"),
            ));
        }
        Ok(Self {
            object,
            action: action.to_string(),
        })
    }

    pub fn object(&self) -> EntityKind {
        self.object
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns whether this grant authorizes `action` on `object`.
    pub fn authorizes(&self, object: EntityKind, action: &str) -> bool {
        self.object == object && action.starts_with(self.action.as_str())
    }

    /// Parses a whitespace-separated list of `Object:action` grants.
    pub fn parse_list(spec: &str) -> CoreResult<Vec<Self>> {
        spec.split_whitespace().map(str::parse).collect()
    }

    // Catalog tables only hold catalog actions.
    fn from_catalog(object: EntityKind, action: &'static str) -> Self {
        Self {
            object,
            action: action.to_string(),
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.object, self.action)
    }
}

impl FromStr for Permission {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        let captures = GRANT_SPEC_RE.captures(spec).ok_or_else(|| {
            CoreError::format("permission", format!("`{spec}` is not an `Object:action` grant"))
        })?;
        let tag = &captures[1];
        let object = EntityKind::parse(tag).ok_or_else(|| {
            CoreError::format("permission object", format!("`{tag}` is not an object tag"))
        })?;
        Self::new(object, &captures[2])
    }
}

/// Canonical roles shipped with fixed grant tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleKind {
    Administrator,
    ChiefSupervisor,
    Supervisor,
    AccountableRepresentative,
}

type GrantTable = &'static [(EntityKind, &'static [&'static str])];

const ADMINISTRATOR_GRANTS: GrantTable = &[
    (
        EntityKind::Users,
        &[ACTION_CREATE, ACTION_UPDATE, ACTION_DELETE, ACTION_READ_ALL],
    ),
    (
        EntityKind::Municipalities,
        &[ACTION_CREATE, ACTION_UPDATE, ACTION_DELETE, ACTION_READ_ALL],
    ),
    (
        EntityKind::Calls,
        &[ACTION_CREATE, ACTION_UPDATE, ACTION_DELETE, ACTION_READ_ALL],
    ),
    (
        EntityKind::Submissions,
        &[ACTION_UPDATE, ACTION_DELETE, ACTION_READ_ALL],
    ),
];

const CHIEF_SUPERVISOR_GRANTS: GrantTable = &[
    (
        EntityKind::Users,
        &[ACTION_READ_SUPERVISORS, ACTION_READ_REPRESENTATIVES],
    ),
    (
        EntityKind::Municipalities,
        &[
            ACTION_READ_ALL,
            ACTION_UPDATE_REPRESENTATIVE,
            ACTION_UPDATE_SUPERVISOR,
        ],
    ),
    (
        EntityKind::Calls,
        &[
            ACTION_CREATE,
            ACTION_UPDATE,
            ACTION_DELETE_EMPTY,
            ACTION_READ_ALL,
        ],
    ),
    (
        EntityKind::Submissions,
        &[ACTION_UPDATE_OPEN_STATE, ACTION_READ_ALL],
    ),
];

const SUPERVISOR_GRANTS: GrantTable = &[
    (
        EntityKind::Municipalities,
        &[ACTION_READ_ALL, ACTION_SUPERVISE],
    ),
    (EntityKind::Calls, &[ACTION_READ_ALL]),
    (EntityKind::Submissions, &[ACTION_READ_ASSIGNED]),
];

const ACCOUNTABLE_REPRESENTATIVE_GRANTS: GrantTable = &[
    (
        EntityKind::Municipalities,
        &[ACTION_READ_ASSIGNED, ACTION_REPRESENT],
    ),
    (EntityKind::Calls, &[ACTION_READ_OPEN]),
    (
        EntityKind::Submissions,
        &[
            ACTION_CREATE,
            ACTION_UPDATE_OWN,
            ACTION_DELETE_OWN,
            ACTION_READ_OWN,
        ],
    ),
];

impl RoleKind {
    pub const ALL: [RoleKind; 4] = [
        RoleKind::Administrator,
        RoleKind::ChiefSupervisor,
        RoleKind::Supervisor,
        RoleKind::AccountableRepresentative,
    ];

    /// Persisted role name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Administrator => "Administrador",
            Self::ChiefSupervisor => "SupervisorJefe",
            Self::Supervisor => "Supervisor",
            Self::AccountableRepresentative => "Cuentadante",
        }
    }

    /// Resolves a persisted role name. Matching is exact.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn grants(self) -> GrantTable {
        match self {
            Self::Administrator => ADMINISTRATOR_GRANTS,
            Self::ChiefSupervisor => CHIEF_SUPERVISOR_GRANTS,
            Self::Supervisor => SUPERVISOR_GRANTS,
            Self::AccountableRepresentative => ACCOUNTABLE_REPRESENTATIVE_GRANTS,
        }
    }
}

/// Named, ordered set of grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    name: String,
    permissions: Vec<Permission>,
}

impl Role {
    /// Builds a role by name from the canonical catalog.
    ///
    /// Unknown names produce a role with no grants.
    pub fn named(name: &str) -> Self {
        match RoleKind::from_name(name.trim()) {
            Some(kind) => Self::canonical(kind),
            None => Self::custom(name.trim(), Vec::new()),
        }
    }

    /// Builds one of the canonical roles.
    pub fn canonical(kind: RoleKind) -> Self {
        let permissions = kind
            .grants()
            .iter()
            .flat_map(|(object, actions)| {
                actions
                    .iter()
                    .map(move |action| Permission::from_catalog(*object, *action))
            })
            .collect();
        Self {
            name: kind.name().to_string(),
            permissions,
        }
    }

    /// Builds a role with an explicit grant list. Duplicate grants collapse.
    pub fn custom(name: impl Into<String>, permissions: Vec<Permission>) -> Self {
        let mut role = Self {
            name: name.into(),
            permissions: Vec::with_capacity(permissions.len()),
        };
        for permission in permissions {
            role.grant(permission);
        }
        role
    }

    /// Adds a grant, keeping insertion order and skipping duplicates.
    pub fn grant(&mut self, permission: Permission) {
        if !self.permissions.contains(&permission) {
            self.permissions.push(permission);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical kind when the role name is one of the catalog names.
    pub fn kind(&self) -> Option<RoleKind> {
        RoleKind::from_name(&self.name)
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Returns whether the grants are exactly the canonical table for the name.
    pub fn is_canonical(&self) -> bool {
        self.kind()
            .is_some_and(|kind| Role::canonical(kind).permissions == self.permissions)
    }

    /// Grants in `Object:action` form, separated by single spaces.
    pub fn grant_spec(&self) -> String {
        self.permissions
            .iter()
            .map(Permission::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns whether any grant authorizes `action` on `object`.
    pub fn has_permission(&self, object: EntityKind, action: &str) -> bool {
        self.permissions
            .iter()
            .any(|permission| permission.authorizes(object, action))
    }

    /// Guard form of [`Role::has_permission`].
    pub fn require(&self, object: EntityKind, action: &str) -> Result<(), AccessDenied> {
        if self.has_permission(object, action) {
            return Ok(());
        }
        Err(AccessDenied {
            role: self.name.clone(),
            object,
            action: action.to_string(),
        })
    }
}

/// Raised by [`Role::require`] when no grant matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    pub role: String,
    pub object: EntityKind,
    pub action: String,
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "role `{}` may not `{}` on {}",
            self.role, self.action, self.object
        )
    }
}

impl Error for AccessDenied {}
