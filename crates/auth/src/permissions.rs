use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are colon-delimited `resource:action` strings (e.g.
/// `"inventory:delete"`). A grant of the form `resource:*` covers every action
/// on that resource. No other wildcard shape exists: a bare `"*"` or
/// `"*:read"` is just a literal that matches itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

const WILDCARD_SUFFIX: &str = ":*";

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resource segment (before the first colon).
    pub fn resource(&self) -> Option<&str> {
        self.as_str().split_once(':').map(|(resource, _)| resource)
    }

    /// Action segment (after the first colon).
    pub fn action(&self) -> Option<&str> {
        self.as_str().split_once(':').map(|(_, action)| action)
    }

    /// For a `resource:*` grant, the resource it covers.
    pub fn wildcard_resource(&self) -> Option<&str> {
        self.as_str()
            .strip_suffix(WILDCARD_SUFFIX)
            .filter(|resource| !resource.is_empty())
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard_resource().is_some()
    }

    /// Whether holding `self` satisfies a check for `required`.
    ///
    /// Wildcards only match on a whole resource segment followed by a literal
    /// colon, so `inventory:*` never covers `inventoryextra:delete`.
    pub fn grants(&self, required: &Permission) -> bool {
        if self == required {
            return true;
        }
        match self.wildcard_resource() {
            Some(resource) => required
                .as_str()
                .strip_prefix(resource)
                .is_some_and(|rest| rest.starts_with(':')),
            None => false,
        }
    }

    /// Whether this permission belongs to the known catalog (wildcard grants
    /// for catalog resources included).
    pub fn is_known(&self) -> bool {
        match self.as_str().split_once(':') {
            Some((resource, action)) => {
                catalog::RESOURCES.contains(&resource)
                    && (action == "*" || catalog::ACTIONS.contains(&action))
            }
            None => false,
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Sorted list of every concrete (non-wildcard) permission in the catalog.
pub fn all_permissions() -> Vec<Permission> {
    let mut perms: Vec<Permission> = catalog::RESOURCES
        .iter()
        .flat_map(|resource| {
            catalog::ACTIONS
                .iter()
                .map(move |action| Permission::new(format!("{resource}:{action}")))
        })
        .collect();
    perms.sort();
    perms
}

/// Well-known permissions of the inventory system.
pub mod catalog {
    use super::Permission;

    pub const RESOURCES: [&str; 5] = ["inventory", "order", "product", "user", "role"];
    pub const ACTIONS: [&str; 4] = ["create", "read", "update", "delete"];

    pub const INVENTORY_ALL: Permission = Permission::from_static("inventory:*");
    pub const ORDER_ALL: Permission = Permission::from_static("order:*");
    pub const PRODUCT_ALL: Permission = Permission::from_static("product:*");
    pub const USER_ALL: Permission = Permission::from_static("user:*");
    pub const ROLE_ALL: Permission = Permission::from_static("role:*");

    pub const INVENTORY_CREATE: Permission = Permission::from_static("inventory:create");
    pub const INVENTORY_READ: Permission = Permission::from_static("inventory:read");
    pub const INVENTORY_UPDATE: Permission = Permission::from_static("inventory:update");
    pub const INVENTORY_DELETE: Permission = Permission::from_static("inventory:delete");

    pub const ORDER_CREATE: Permission = Permission::from_static("order:create");
    pub const ORDER_READ: Permission = Permission::from_static("order:read");
    pub const ORDER_UPDATE: Permission = Permission::from_static("order:update");
    pub const ORDER_DELETE: Permission = Permission::from_static("order:delete");

    pub const PRODUCT_CREATE: Permission = Permission::from_static("product:create");
    pub const PRODUCT_READ: Permission = Permission::from_static("product:read");
    pub const PRODUCT_UPDATE: Permission = Permission::from_static("product:update");
    pub const PRODUCT_DELETE: Permission = Permission::from_static("product:delete");

    pub const USER_CREATE: Permission = Permission::from_static("user:create");
    pub const USER_READ: Permission = Permission::from_static("user:read");
    pub const USER_UPDATE: Permission = Permission::from_static("user:update");
    pub const USER_DELETE: Permission = Permission::from_static("user:delete");

    pub const ROLE_CREATE: Permission = Permission::from_static("role:create");
    pub const ROLE_READ: Permission = Permission::from_static("role:read");
    pub const ROLE_UPDATE: Permission = Permission::from_static("role:update");
    pub const ROLE_DELETE: Permission = Permission::from_static("role:delete");

    /// Wildcard grants for every catalog resource (superuser policy).
    pub fn all_wildcards() -> Vec<Permission> {
        vec![INVENTORY_ALL, ORDER_ALL, PRODUCT_ALL, USER_ALL, ROLE_ALL]
    }
}
