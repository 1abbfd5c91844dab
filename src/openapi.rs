use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Paysim API",
        version = "0.1.0",
        description = r#"
A payment-gateway simulator. Merchants create orders, the checkout page
submits a payment against an order, and the backend simulates settlement
after a delay.

Merchant-scoped endpoints authenticate with the `X-Api-Key` and
`X-Api-Secret` headers. Public endpoints (`/public` variants) take no
credentials; they exist for the hosted checkout page.

Amounts are integers in minor currency units throughout. Errors share one
body shape: `{ "error": { "code": ..., "description": ... } }`.
"#
    ),
    paths(
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_public_order,
        crate::handlers::payments::create_payment,
        crate::handlers::payments::create_public_payment,
        crate::handlers::payments::get_payment,
        crate::handlers::payments::get_public_payment,
        crate::handlers::payments::list_payments,
        crate::handlers::stats::get_stats,
        crate::handlers::health::get_health,
        crate::handlers::test_merchant::get_test_merchant,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::errors::ErrorBody,
        crate::services::orders::CreateOrderRequest,
        crate::services::orders::OrderResponse,
        crate::services::orders::PublicOrderResponse,
        crate::services::payments::CreatePaymentRequest,
        crate::services::payments::CardPayload,
        crate::services::payments::PaymentResponse,
        crate::services::stats::StatsResponse,
        crate::handlers::health::HealthResponse,
        crate::handlers::test_merchant::TestMerchantResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Orders", description = "Merchant order management"),
        (name = "Payments", description = "Payment creation and polling"),
        (name = "Stats", description = "Merchant transaction summaries"),
        (name = "Health", description = "Service health"),
        (name = "Test", description = "Local development bootstrap")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "X-Api-Key",
                    "Merchant API key; pair with the X-Api-Secret header",
                ))),
            );
        }
    }
}

/// Swagger UI mount, served at `/docs`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
