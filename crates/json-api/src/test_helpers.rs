//! Test helpers.

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use platter::{
    cart::{Cart, NewLineItem},
    ids::{CustomerId, ProductId, RestaurantId},
    items::AddOn,
    orders::{DeliveryAddress, Order, OrderNumber, PaymentMethod, PlaceOrder},
    prices::Price,
    pricing::PricingPolicy,
    products::{Category, Product, Restaurant},
    receipt::default_currency,
};
use platter_app::{
    auth::{MockAuthService, Principal, Role},
    context::AppContext,
    domain::{carts::MockCartsService, coupons::MockCouponsService, orders::MockOrdersService},
};
use salvo::{affix_state, prelude::*};
use uuid::Uuid;

use crate::state::State;

pub(crate) const TEST_CUSTOMER: CustomerId = CustomerId::from_uuid(Uuid::nil());

pub(crate) fn customer() -> Principal {
    Principal::new(TEST_CUSTOMER, Role::Customer)
}

pub(crate) fn admin() -> Principal {
    Principal::new(CustomerId::new(), Role::Admin)
}

/// Service mocks behind an [`AppContext`]. Unconfigured mocks fail any call.
#[derive(Default)]
pub(crate) struct MockApp {
    pub(crate) carts: MockCartsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) coupons: MockCouponsService,
    pub(crate) auth: MockAuthService,
}

impl MockApp {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::shared(
            AppContext {
                carts: Arc::new(self.carts),
                orders: Arc::new(self.orders),
                coupons: Arc::new(self.coupons),
                auth: Arc::new(self.auth),
            },
            default_currency(),
        )
    }
}

/// Serve `route` as if `principal` had authenticated.
pub(crate) fn service_as(principal: Principal, app: MockApp, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(affix_state::inject(app.into_state()))
            .hoop(affix_state::insert("principal", principal))
            .push(route),
    )
}

pub(crate) fn restaurant() -> Restaurant {
    Restaurant {
        id: RestaurantId::from_uuid(Uuid::from_u128(1)),
        name: "Tandoor House".to_string(),
        delivery_fee: Some(Price::new(250)),
        is_open: true,
    }
}

pub(crate) fn product() -> Product {
    Product {
        id: ProductId::from_uuid(Uuid::from_u128(2)),
        restaurant: restaurant().id,
        name: "Paneer Tikka".to_string(),
        category: Category::Appetizers,
        price: Price::new(900),
        add_ons: vec![AddOn::new("Mint chutney", Price::new(50))],
        available: true,
    }
}

/// A cart holding two paneer tikkas with mint chutney.
pub(crate) fn cart() -> Cart {
    let mut cart = Cart::new(TEST_CUSTOMER, Timestamp::UNIX_EPOCH);

    // The fixed catalog above always fits in a cart.
    let _outcome = cart.add_item(
        &product(),
        &restaurant(),
        NewLineItem {
            quantity: 2,
            add_ons: vec!["Mint chutney".to_string()],
            notes: None,
        },
        &PricingPolicy::default(),
    );

    cart
}

pub(crate) fn place_order() -> PlaceOrder {
    PlaceOrder {
        address: DeliveryAddress {
            street: "4 Canal Street".to_string(),
            city: "Mumbai".to_string(),
            ..DeliveryAddress::default()
        },
        payment_method: PaymentMethod::Card,
        special_instructions: None,
    }
}

/// An order placed from [`cart`].
pub(crate) fn order() -> Result<Order, platter::orders::OrderError> {
    Order::place(
        &cart(),
        OrderNumber::generate(Timestamp::UNIX_EPOCH, 1),
        place_order(),
        Timestamp::UNIX_EPOCH + SignedDuration::from_mins(40),
        Timestamp::UNIX_EPOCH,
    )
}
