//! Carts service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use platter::{
    cart::{AddItemOutcome, Cart, NewLineItem},
    coupons::{CouponCode, CouponOutcome},
    ids::{CustomerId, ProductId},
    prices::Price,
};
use tracing::{debug, info};

use crate::{
    catalog::{self, Catalog},
    domain::{
        carts::errors::CartsServiceError,
        versioned::{load_cart, update_cart},
    },
    settings::ServiceSettings,
    stores::{CartStore, CouponStore},
};

#[derive(Clone)]
pub struct DefaultCartsService {
    carts: Arc<dyn CartStore>,
    coupons: Arc<dyn CouponStore>,
    catalog: Arc<dyn Catalog>,
    settings: ServiceSettings,
}

impl DefaultCartsService {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartStore>,
        coupons: Arc<dyn CouponStore>,
        catalog: Arc<dyn Catalog>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            carts,
            coupons,
            catalog,
            settings,
        }
    }
}

#[async_trait]
impl CartsService for DefaultCartsService {
    async fn get_cart(&self, owner: CustomerId) -> Result<Cart, CartsServiceError> {
        Ok(load_cart(&*self.carts, owner).await?)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip_all,
        fields(customer = %owner, product = %product, quantity = request.quantity)
    )]
    async fn add_item(
        &self,
        owner: CustomerId,
        product: ProductId,
        request: NewLineItem,
    ) -> Result<(Cart, AddItemOutcome), CartsServiceError> {
        let limit = self.settings.catalog_timeout;
        let product = catalog::within(limit, self.catalog.get_product(product)).await?;
        let restaurant =
            catalog::within(limit, self.catalog.get_restaurant(product.restaurant)).await?;
        let policy = self.settings.policy;

        let (cart, outcome) = update_cart(&*self.carts, owner, "carts.add_item", |cart| {
            Ok::<_, CartsServiceError>(cart.add_item(
                &product,
                &restaurant,
                request.clone(),
                &policy,
            )?)
        })
        .await?;

        if let AddItemOutcome::RestaurantSwitched { cleared } = outcome {
            info!(cleared, restaurant = %restaurant.id, "cart switched restaurant");
        }

        Ok((cart, outcome))
    }

    async fn update_quantity(
        &self,
        owner: CustomerId,
        product: ProductId,
        quantity: i64,
    ) -> Result<Cart, CartsServiceError> {
        let policy = self.settings.policy;

        let (cart, ()) = update_cart(&*self.carts, owner, "carts.update_quantity", |cart| {
            Ok::<_, CartsServiceError>(cart.update_quantity(product, quantity, &policy)?)
        })
        .await?;

        Ok(cart)
    }

    async fn remove_item(
        &self,
        owner: CustomerId,
        product: ProductId,
    ) -> Result<Cart, CartsServiceError> {
        let policy = self.settings.policy;

        let (cart, ()) = update_cart(&*self.carts, owner, "carts.remove_item", |cart| {
            Ok::<_, CartsServiceError>(cart.remove_item(product, &policy)?)
        })
        .await?;

        Ok(cart)
    }

    async fn clear_cart(&self, owner: CustomerId) -> Result<Cart, CartsServiceError> {
        let (cart, ()) = update_cart(&*self.carts, owner, "carts.clear", |cart| {
            cart.clear();

            Ok::<_, CartsServiceError>(())
        })
        .await?;

        Ok(cart)
    }

    #[tracing::instrument(name = "carts.service.apply_coupon", skip_all, fields(customer = %owner))]
    async fn apply_coupon(
        &self,
        owner: CustomerId,
        code: String,
    ) -> Result<(Cart, Price), CartsServiceError> {
        let code = CouponCode::new(&code);

        let coupon = if code.is_empty() {
            None
        } else {
            self.coupons.find_coupon(&code).await?
        };

        let prior_redemptions = match &coupon {
            Some(coupon) => self.coupons.redemptions(&coupon.code, owner).await?,
            None => 0,
        };

        let now = Timestamp::now();
        let policy = self.settings.policy;

        let result = update_cart(&*self.carts, owner, "carts.apply_coupon", |cart| {
            match cart.apply_coupon(coupon.as_ref(), prior_redemptions, now, &policy)? {
                CouponOutcome::Accepted { discount } => Ok(discount),
                CouponOutcome::Rejected(rejection) => {
                    Err(CartsServiceError::CouponRejected(rejection))
                }
            }
        })
        .await;

        match &result {
            Ok((_, discount)) => debug!(%code, %discount, "coupon applied"),
            Err(CartsServiceError::CouponRejected(rejection)) => {
                info!(%code, reason = rejection.code(), "coupon rejected");
            }
            Err(_) => {}
        }

        result
    }

    async fn remove_coupon(&self, owner: CustomerId) -> Result<Cart, CartsServiceError> {
        let policy = self.settings.policy;

        let (cart, ()) = update_cart(&*self.carts, owner, "carts.remove_coupon", |cart| {
            Ok::<_, CartsServiceError>(cart.remove_coupon(&policy)?)
        })
        .await?;

        Ok(cart)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The customer's cart, or an empty one if they have never saved one.
    async fn get_cart(&self, owner: CustomerId) -> Result<Cart, CartsServiceError>;

    /// Add a catalog product to the cart.
    async fn add_item(
        &self,
        owner: CustomerId,
        product: ProductId,
        request: NewLineItem,
    ) -> Result<(Cart, AddItemOutcome), CartsServiceError>;

    /// Set the quantity of a product; zero or less removes it.
    async fn update_quantity(
        &self,
        owner: CustomerId,
        product: ProductId,
        quantity: i64,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove every line of a product.
    async fn remove_item(
        &self,
        owner: CustomerId,
        product: ProductId,
    ) -> Result<Cart, CartsServiceError>;

    async fn clear_cart(&self, owner: CustomerId) -> Result<Cart, CartsServiceError>;

    /// Validate and apply a coupon code, returning the discount it gives.
    async fn apply_coupon(
        &self,
        owner: CustomerId,
        code: String,
    ) -> Result<(Cart, Price), CartsServiceError>;

    async fn remove_coupon(&self, owner: CustomerId) -> Result<Cart, CartsServiceError>;
}
