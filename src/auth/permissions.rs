//! # Roles and Permissions
//!
//! Admin capabilities are a closed registry; each admin route declares
//! the permission it requires, so the route table is the source of truth
//! for what exists. Roles map onto permission sets here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{AuthError, AuthResult};

/// Admin capability required by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    MenuEdit,
    MenuReorder,
    PromotionsEdit,
    OrdersView,
    OrdersTransition,
    LoyaltyAdjust,
    UsersManage,
    ReportsView,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::MenuEdit => "menu.edit",
            Permission::MenuReorder => "menu.reorder",
            Permission::PromotionsEdit => "promotions.edit",
            Permission::OrdersView => "orders.view",
            Permission::OrdersTransition => "orders.transition",
            Permission::LoyaltyAdjust => "loyalty.adjust",
            Permission::UsersManage => "users.manage",
            Permission::ReportsView => "reports.view",
        }
    }

    /// Every permission the system knows about.
    pub fn all() -> &'static [Permission] {
        &[
            Permission::MenuEdit,
            Permission::MenuReorder,
            Permission::PromotionsEdit,
            Permission::OrdersView,
            Permission::OrdersTransition,
            Permission::LoyaltyAdjust,
            Permission::UsersManage,
            Permission::ReportsView,
        ]
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User role, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Staff,
    Manager,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
            Role::Manager => "manager",
            Role::Owner => "owner",
        }
    }

    /// Permissions granted to this role. Owner holds everything.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Customer => &[],
            Role::Staff => &[Permission::OrdersView, Permission::OrdersTransition],
            Role::Manager => &[
                Permission::OrdersView,
                Permission::OrdersTransition,
                Permission::MenuEdit,
                Permission::MenuReorder,
                Permission::PromotionsEdit,
                Permission::LoyaltyAdjust,
                Permission::ReportsView,
            ],
            Role::Owner => Permission::all(),
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "staff" => Ok(Role::Staff),
            "manager" => Ok(Role::Manager),
            "owner" => Ok(Role::Owner),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller identity carried with each request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthContext {
    /// Reject with 403 unless the caller's role grants `permission`.
    pub fn require(&self, permission: Permission) -> AuthResult<()> {
        if self.role.allows(permission) {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied(permission))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_holds_every_permission() {
        for permission in Permission::all() {
            assert!(Role::Owner.allows(*permission));
        }
    }

    #[test]
    fn test_customer_holds_none() {
        for permission in Permission::all() {
            assert!(!Role::Customer.allows(*permission));
        }
    }

    #[test]
    fn test_staff_can_work_orders_but_not_menu() {
        assert!(Role::Staff.allows(Permission::OrdersTransition));
        assert!(!Role::Staff.allows(Permission::MenuEdit));
        assert!(!Role::Staff.allows(Permission::UsersManage));
    }

    #[test]
    fn test_manager_cannot_manage_users() {
        assert!(Role::Manager.allows(Permission::PromotionsEdit));
        assert!(!Role::Manager.allows(Permission::UsersManage));
    }

    #[test]
    fn test_context_require() {
        let ctx = AuthContext {
            user_id: Uuid::new_v4(),
            email: "staff@example.com".to_string(),
            role: Role::Staff,
        };
        assert!(ctx.require(Permission::OrdersView).is_ok());
        assert!(matches!(
            ctx.require(Permission::UsersManage),
            Err(AuthError::PermissionDenied(Permission::UsersManage))
        ));
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
        assert!("root".parse::<Role>().is_err());
    }
}
