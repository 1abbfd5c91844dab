//! Request-body extraction. Axum's stock `Json` rejection renders a
//! plain-text 422, which breaks the one error-body contract every endpoint
//! promises; this wrapper funnels deserialization failures through
//! [`ServiceError`] so malformed bodies come back as 400
//! `BAD_REQUEST_ERROR` with the nested `{"error": …}` shape.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::errors::ServiceError;

/// Drop-in replacement for `axum::Json` in handler arguments.
#[derive(Debug, Clone, Copy)]
pub struct Json<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(ServiceError::BadRequest(rejection.body_text())),
        }
    }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;

    use crate::services::orders::CreateOrderRequest;

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn well_formed_body_deserializes() {
        let req = json_request(r#"{"amount": 500}"#);
        let Json(parsed) = Json::<CreateOrderRequest>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(parsed.amount, 500);
    }

    #[tokio::test]
    async fn non_integer_amount_renders_the_shared_error_body() {
        let req = json_request(r#"{"amount": 99.5}"#);
        let err = Json::<CreateOrderRequest>::from_request(req, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST_ERROR");
        assert!(json["error"]["description"].is_string());
    }

    #[tokio::test]
    async fn malformed_json_renders_the_shared_error_body() {
        let req = json_request("{not json");
        let err = Json::<CreateOrderRequest>::from_request(req, &())
            .await
            .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST_ERROR");
    }
}
