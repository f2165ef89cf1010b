use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::order_service::OrderService;
use crate::domain::order::{
    format_amount, NewOrderRequest, OrderAggregate, OrderHeader, OrderItemRequest, OrderLineView,
    ShippingAddress,
};
use crate::errors::AppError;
use crate::payment_link::PaymentLinkConfig;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemBody {
    /// Catalog key of the product, e.g. "lotus"
    pub product: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddressBody {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
}

impl From<ShippingAddressBody> for ShippingAddress {
    fn from(body: ShippingAddressBody) -> Self {
        ShippingAddress {
            name: body.name,
            street: body.street,
            city: body.city,
            region: body.state,
            postal_code: body.pincode,
            phone: body.phone,
        }
    }
}

impl From<ShippingAddress> for ShippingAddressBody {
    fn from(address: ShippingAddress) -> Self {
        ShippingAddressBody {
            name: address.name,
            street: address.street,
            city: address.city,
            state: address.region,
            pincode: address.postal_code,
            phone: address.phone,
        }
    }
}

/// Totals are always computed server-side; there is no total field to send.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemBody>,
    pub shipping_address: ShippingAddressBody,
    #[serde(default)]
    pub comments: Option<String>,
}

impl From<CreateOrderRequest> for NewOrderRequest {
    fn from(body: CreateOrderRequest) -> Self {
        NewOrderRequest {
            items: body
                .items
                .into_iter()
                .map(|i| OrderItemRequest::new(i.product, i.quantity))
                .collect(),
            shipping_address: body.shipping_address.into(),
            comment: body.comments,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: i32,
    pub total_amount: String,
    pub payment_qr_code: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderHeaderResponse {
    pub id: i32,
    pub total_amount: String,
    pub payment_done: bool,
    pub payment_done_at: Option<String>,
    pub payment_received: bool,
    pub payment_received_at: Option<String>,
    pub comments: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderHeader> for OrderHeaderResponse {
    fn from(h: OrderHeader) -> Self {
        OrderHeaderResponse {
            id: h.id,
            total_amount: format_amount(&h.total_amount),
            payment_done: h.payment_done,
            payment_done_at: h.payment_done_at.map(|t| t.to_rfc3339()),
            payment_received: h.payment_received,
            payment_received_at: h.payment_received_at.map(|t| t.to_rfc3339()),
            comments: h.comment,
            created_at: h.created_at.to_rfc3339(),
            updated_at: h.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: i32,
    pub product_key: Option<String>,
    pub product_name: Option<String>,
    /// Unit price captured when the order was placed
    pub price: String,
    pub quantity: i32,
}

impl From<OrderLineView> for OrderItemResponse {
    fn from(l: OrderLineView) -> Self {
        OrderItemResponse {
            product_id: l.product_id,
            product_key: l.product_key,
            product_name: l.product_name,
            price: format_amount(&l.unit_price),
            quantity: l.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub order: OrderHeaderResponse,
    pub items: Vec<OrderItemResponse>,
    pub shipping_address: ShippingAddressBody,
}

impl From<OrderAggregate> for OrderResponse {
    fn from(a: OrderAggregate) -> Self {
        OrderResponse {
            order: a.header.into(),
            items: a.items.into_iter().map(OrderItemResponse::from).collect(),
            shipping_address: a.shipping_address.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders
///
/// Prices the requested items against the active catalog and stores the
/// order, its line items and its shipping address in one transaction.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderResponse),
        (status = 400, description = "Unknown product, invalid quantity or empty order"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    links: web::Data<PaymentLinkConfig>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = NewOrderRequest::from(body.into_inner());
    let now = Utc::now();

    let created = web::block(move || service.create_order(request, now))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreateOrderResponse {
        id: created.id,
        total_amount: format_amount(&created.total_amount),
        payment_qr_code: links.upi_link(&created.total_amount, created.id),
        created_at: created.created_at.to_rfc3339(),
    }))
}

/// GET /api/orders/{id}
///
/// Returns the order together with its line items and shipping address.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /api/orders/{id}/payment-done
///
/// Buyer acknowledgment that the payment was sent. Repeating the call is
/// harmless and keeps the first acknowledgment time.
#[utoipa::path(
    put,
    path = "/api/orders/{id}/payment-done",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Payment acknowledged", body = MessageResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn mark_payment_done(
    service: web::Data<OrderService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let now = Utc::now();

    web::block(move || service.mark_payment_done(order_id, now))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Payment acknowledged".to_string(),
    }))
}
