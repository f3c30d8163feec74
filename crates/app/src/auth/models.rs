//! Auth data models.

use platter::ids::CustomerId;
use serde::{Deserialize, Serialize};

/// What an authenticated caller may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Restaurant,
    Rider,
    Admin,
}

impl Role {
    /// Restaurant, rider and admin callers may see and move any order.
    #[must_use]
    pub fn is_staff(self) -> bool {
        !matches!(self, Self::Customer)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Restaurant => "restaurant",
            Self::Rider => "rider",
            Self::Admin => "admin",
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The caller's id. Carts and orders of customers are keyed by it.
    pub customer: CustomerId,

    pub role: Role,
}

impl Principal {
    #[must_use]
    pub fn new(customer: CustomerId, role: Role) -> Self {
        Self { customer, role }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller owns `customer`'s data or is staff.
    #[must_use]
    pub fn can_see(&self, customer: CustomerId) -> bool {
        self.customer == customer || self.role.is_staff()
    }
}
