//! Read-modify-write of versioned aggregates
//!
//! Each attempt loads the aggregate, applies the change to the loaded copy
//! and saves it against the version it was loaded at. Version conflicts are
//! retried from a fresh load, up to [`MAX_ATTEMPTS`] times in total.

use jiff::Timestamp;
use platter::{
    cart::Cart,
    ids::{CustomerId, OrderId},
    orders::Order,
};
use tracing::debug;

use crate::stores::{CartStore, OrderStore, StoreError};

pub(crate) const MAX_ATTEMPTS: u32 = 3;

/// Load the cart of `owner`, or a fresh one if none has been saved yet.
pub(crate) async fn load_cart(
    carts: &dyn CartStore,
    owner: CustomerId,
) -> Result<Cart, StoreError> {
    Ok(carts
        .load_cart(owner)
        .await?
        .unwrap_or_else(|| Cart::new(owner, Timestamp::now())))
}

/// Apply `change` to the cart of `owner` and save it.
///
/// An error from `change` aborts without saving.
pub(crate) async fn update_cart<T, E, F>(
    carts: &dyn CartStore,
    owner: CustomerId,
    operation: &'static str,
    mut change: F,
) -> Result<(Cart, T), E>
where
    F: FnMut(&mut Cart) -> Result<T, E> + Send,
    E: From<StoreError>,
    T: Send,
{
    let mut attempt = 1;

    loop {
        let mut cart = load_cart(carts, owner).await?;
        let expected_version = cart.version();
        let output = change(&mut cart)?;

        match carts.save_cart(cart, expected_version).await {
            Ok(saved) => return Ok((saved, output)),
            Err(StoreError::Conflict) if attempt < MAX_ATTEMPTS => {
                debug!(operation, attempt, customer = %owner, "cart version conflict, retrying");

                attempt += 1;
            }
            Err(error) => return Err(error.into()),
        }
    }
}

/// Apply `change` to order `id` and save it. An order `change` leaves
/// untouched is returned without a save.
///
/// An error from `change` aborts without saving.
pub(crate) async fn update_order<T, E, F>(
    orders: &dyn OrderStore,
    id: OrderId,
    operation: &'static str,
    mut change: F,
) -> Result<(Order, T), E>
where
    F: FnMut(&mut Order) -> Result<T, E> + Send,
    E: From<StoreError>,
    T: Send,
{
    let mut attempt = 1;

    loop {
        let loaded = orders.load_order(id).await?;
        let expected_version = loaded.version();

        let mut order = loaded.clone();
        let output = change(&mut order)?;

        if order == loaded {
            return Ok((order, output));
        }

        match orders.save_order(order, expected_version).await {
            Ok(saved) => return Ok((saved, output)),
            Err(StoreError::Conflict) if attempt < MAX_ATTEMPTS => {
                debug!(operation, attempt, order_id = %id, "order version conflict, retrying");

                attempt += 1;
            }
            Err(error) => return Err(error.into()),
        }
    }
}
