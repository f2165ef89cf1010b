pub mod orders;
pub mod products;

use actix_web::web;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        products::list_products,
        products::get_product,
        orders::create_order,
        orders::get_order,
        orders::mark_payment_done,
    ),
    components(schemas(
        products::ProductResponse,
        orders::OrderItemBody,
        orders::ShippingAddressBody,
        orders::CreateOrderRequest,
        orders::CreateOrderResponse,
        orders::OrderHeaderResponse,
        orders::OrderItemResponse,
        orders::OrderResponse,
        orders::MessageResponse,
    )),
    tags(
        (name = "products", description = "Catalog lookups"),
        (name = "orders", description = "Order placement and payment acknowledgment"),
    )
)]
pub struct ApiDoc;

/// Registers the public API routes. Payment confirmation is operator-only and
/// is reachable through the CLI instead.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/products", web::get().to(products::list_products))
            .route("/products/{id}", web::get().to(products::get_product))
            .route("/orders", web::post().to(orders::create_order))
            .route("/orders/{id}", web::get().to(orders::get_order))
            .route(
                "/orders/{id}/payment-done",
                web::put().to(orders::mark_payment_done),
            ),
    );
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::str::FromStr;
    use std::sync::Arc;

    use actix_web::web;
    use bigdecimal::BigDecimal;
    use chrono::{TimeZone, Utc};

    use crate::application::order_service::OrderService;
    use crate::domain::product::ProductUpsert;
    use crate::infrastructure::in_memory::InMemoryStore;
    use crate::payment_link::PaymentLinkConfig;

    /// Service over an in-memory store seeded with "a" @ 10.00, "b" @ 5.50
    /// and an inactive "retired" product.
    pub fn app_data() -> (
        web::Data<OrderService>,
        web::Data<PaymentLinkConfig>,
        InMemoryStore,
    ) {
        let store = InMemoryStore::new();
        let service = OrderService::new(Arc::new(store.clone()), Arc::new(store.clone()));
        let entry = |key: &str, name: &str, price: &str, active: bool| ProductUpsert {
            key: key.to_string(),
            name: name.to_string(),
            description: String::new(),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            active,
        };
        service
            .load_catalog(
                &[
                    entry("a", "Anchor", "10.00", true),
                    entry("b", "Bloom", "5.50", true),
                    entry("retired", "Retired", "1.00", false),
                ],
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            )
            .expect("seeding catalog failed");

        (
            web::Data::new(service),
            web::Data::new(PaymentLinkConfig::new("stringart@upi", "StringArt")),
            store,
        )
    }
}
