//! App Router

use salvo::Router;

use crate::{auth, carts, coupons, orders, payments};

/// Every authenticated route. `/cart/coupon` is registered ahead of
/// `/cart/{product}` so the literal segment wins.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("cart")
                .get(carts::get::handler)
                .delete(carts::clear::handler)
                .push(Router::with_path("add").post(carts::add::handler))
                .push(Router::with_path("update").put(carts::update::handler))
                .push(
                    Router::with_path("coupon")
                        .post(carts::apply_coupon::handler)
                        .delete(carts::remove_coupon::handler),
                )
                .push(Router::with_path("{product}").delete(carts::remove::handler)),
        )
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .post(orders::create::handler)
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .push(Router::with_path("receipt").get(orders::receipt::handler))
                        .push(Router::with_path("status").put(orders::status::handler))
                        .push(Router::with_path("assign-rider").post(orders::assign_rider::handler))
                        .push(Router::with_path("rate").post(orders::rate::handler))
                        .push(
                            Router::with_path("refund")
                                .post(orders::refund::handler)
                                .push(
                                    Router::with_path("complete")
                                        .post(orders::complete_refund::handler),
                                ),
                        ),
                ),
        )
        .push(
            Router::with_path("payments/{order}")
                .push(Router::with_path("confirmed").post(payments::confirmed::handler))
                .push(Router::with_path("failed").post(payments::failed::handler)),
        )
        .push(
            Router::with_path("coupons")
                .get(coupons::index::handler)
                .post(coupons::create::handler),
        )
}
