//! Authenticated caller in the depot.

use platter_app::auth::Principal;
use salvo::prelude::{Depot, StatusError};

const PRINCIPAL_DEPOT_KEY: &str = "principal";

pub(crate) trait PrincipalExt {
    fn insert_principal(&mut self, principal: Principal);

    /// The caller placed in the depot by the auth middleware.
    fn principal_or_401(&self) -> Result<Principal, StatusError>;

    /// The caller, provided they hold an admin token.
    fn admin_or_403(&self) -> Result<Principal, StatusError>;
}

impl PrincipalExt for Depot {
    fn insert_principal(&mut self, principal: Principal) {
        self.insert(PRINCIPAL_DEPOT_KEY, principal);
    }

    fn principal_or_401(&self) -> Result<Principal, StatusError> {
        self.get::<Principal>(PRINCIPAL_DEPOT_KEY)
            .copied()
            .map_err(|_missing| StatusError::unauthorized())
    }

    fn admin_or_403(&self) -> Result<Principal, StatusError> {
        let principal = self.principal_or_401()?;

        if !principal.is_admin() {
            return Err(StatusError::forbidden().brief("Admin token required"));
        }

        Ok(principal)
    }
}
