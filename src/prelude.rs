//! Platter prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{AddItemOutcome, Cart, CartError, NewLineItem},
    coupons::{
        Coupon, CouponCode, CouponContext, CouponOutcome, CouponScope, DiscountKind, Rejection,
        validate_and_price,
    },
    discounts::{DiscountError, percent_of},
    errors::ErrorKind,
    fixtures::{Fixture, FixtureError},
    ids::{CustomerId, OrderId, ProductId, RestaurantId, RiderId},
    items::{AddOn, LineItem},
    orders::{
        DeliveryAddress, Order, OrderError, OrderNumber, OrderStatus, PaymentMethod,
        PaymentStatus, PlaceOrder, Rating, RefundStatus, StatusEntry,
    },
    prices::Price,
    pricing::{PricingError, PricingPolicy, Totals, compute_totals},
    products::{Category, Product, Restaurant},
    receipt::{Receipt, ReceiptError},
};
