//! REST adapter for [`CartGateway`] over a pluggable HTTP transport.
//!
//! Routes:
//!
//! | operation | request |
//! |---|---|
//! | fetch | `GET /cart` |
//! | add | `POST /cart/items` `{productId, quantity, variant?}` |
//! | update | `PUT /cart/items/{lineId}` `{quantity}` |
//! | remove | `DELETE /cart/items/{lineId}` |
//! | clear | `DELETE /cart` |
//!
//! Geo hints travel as `lat`/`lng` query parameters. Responses are either a
//! bare cart snapshot or one wrapped in `{"data": ...}`.

use async_trait::async_trait;
use cart_model::{CartSnapshot, LineId, ProductId, VariantRef};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{CartGateway, GeoPoint};
use crate::{GatewayConfig, GatewayError};

/// Sends one HTTP request. Implemented by the embedding application with
/// whatever client it already uses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, GatewayError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddLineBody<'a> {
    product_id: &'a ProductId,
    quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant: Option<&'a VariantRef>,
}

#[derive(Serialize)]
struct QuantityBody {
    quantity: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotBody {
    Wrapped { data: CartSnapshot },
    Bare(CartSnapshot),
}

impl From<SnapshotBody> for CartSnapshot {
    fn from(body: SnapshotBody) -> Self {
        match body {
            SnapshotBody::Wrapped { data } => data,
            SnapshotBody::Bare(snapshot) => snapshot,
        }
    }
}

/// [`CartGateway`] speaking JSON over HTTP.
pub struct HttpCartGateway<T> {
    transport: T,
    config: GatewayConfig,
}

impl<T: HttpTransport> HttpCartGateway<T> {
    pub fn new(transport: T, config: GatewayConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn path_with_geo(path: &str, geo: Option<GeoPoint>) -> String {
        match geo {
            Some(g) => format!("{}?lat={}&lng={}", path, g.latitude, g.longitude),
            None => path.to_string(),
        }
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Request<Vec<u8>>, GatewayError> {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{}{}", self.config.base(), path))
            .header(ACCEPT, "application/json");
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        if let Some(token) = &self.config.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        Ok(builder.body(body.unwrap_or_default())?)
    }

    async fn execute(
        &self,
        method: Method,
        path: String,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, GatewayError> {
        let request = self.build(method.clone(), &path, body)?;
        tracing::debug!(%method, %path, "cart api request");
        let response = self.transport.send(request).await?;
        let status = response.status();
        check_status(status, &path)?;
        Ok(response.into_body())
    }

    async fn snapshot(
        &self,
        method: Method,
        path: String,
        body: Option<Vec<u8>>,
    ) -> Result<CartSnapshot, GatewayError> {
        let bytes = self.execute(method, path, body).await?;
        let body: SnapshotBody = serde_json::from_slice(&bytes)?;
        Ok(body.into())
    }
}

fn check_status(status: StatusCode, path: &str) -> Result<(), GatewayError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GatewayError::Unauthorized),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            Err(GatewayError::Timeout(path.to_string()))
        }
        _ => Err(GatewayError::Http {
            status: status.as_u16(),
            path: path.to_string(),
        }),
    }
}

#[async_trait]
impl<T: HttpTransport> CartGateway for HttpCartGateway<T> {
    async fn fetch(&self, geo: Option<GeoPoint>) -> Result<CartSnapshot, GatewayError> {
        self.snapshot(Method::GET, Self::path_with_geo("/cart", geo), None)
            .await
    }

    async fn add(
        &self,
        product_id: &ProductId,
        quantity: u32,
        variant: Option<&VariantRef>,
        geo: Option<GeoPoint>,
    ) -> Result<CartSnapshot, GatewayError> {
        let body = serde_json::to_vec(&AddLineBody {
            product_id,
            quantity,
            variant,
        })?;
        self.snapshot(
            Method::POST,
            Self::path_with_geo("/cart/items", geo),
            Some(body),
        )
        .await
    }

    async fn update_quantity(
        &self,
        line_id: &LineId,
        quantity: u32,
        geo: Option<GeoPoint>,
    ) -> Result<CartSnapshot, GatewayError> {
        let body = serde_json::to_vec(&QuantityBody { quantity })?;
        let path = Self::path_with_geo(&format!("/cart/items/{}", line_id), geo);
        self.snapshot(Method::PUT, path, Some(body)).await
    }

    async fn remove(
        &self,
        line_id: &LineId,
        geo: Option<GeoPoint>,
    ) -> Result<CartSnapshot, GatewayError> {
        let path = Self::path_with_geo(&format!("/cart/items/{}", line_id), geo);
        self.snapshot(Method::DELETE, path, None).await
    }

    async fn clear(&self) -> Result<(), GatewayError> {
        self.execute(Method::DELETE, "/cart".to_string(), None)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorded {
        status: StatusCode,
        body: &'static str,
        seen: Mutex<Vec<Request<Vec<u8>>>>,
    }

    impl Recorded {
        fn new(status: StatusCode, body: &'static str) -> Self {
            Self {
                status,
                body,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for Recorded {
        async fn send(
            &self,
            request: Request<Vec<u8>>,
        ) -> Result<Response<Vec<u8>>, GatewayError> {
            self.seen.lock().unwrap().push(request);
            Ok(Response::builder()
                .status(self.status)
                .body(self.body.as_bytes().to_vec())
                .unwrap())
        }
    }

    const SNAPSHOT: &str = r#"{"data":{"items":[{"_id":"l1","quantity":1,
        "product":{"_id":"65af","name":"Milk","price":{"amount_minor":3000,"currency":"INR"}}}],
        "platformFee":{"amount_minor":500,"currency":"INR"}}}"#;

    #[tokio::test]
    async fn test_add_builds_authorized_json_request() {
        let transport = Recorded::new(StatusCode::OK, SNAPSHOT);
        let gateway = HttpCartGateway::new(
            transport,
            GatewayConfig::new("https://api.example.com/v1/").with_token("tok"),
        );

        let snapshot = gateway
            .add(
                &ProductId::new("65af"),
                1,
                Some(&VariantRef::by_title("1 L")),
                Some(GeoPoint::new(12.5, 77.25)),
            )
            .await
            .unwrap();
        assert_eq!(snapshot.lines.len(), 1);
        assert_eq!(snapshot.fees.platform_fee.map(|m| m.amount_minor), Some(500));

        let seen = gateway.transport().seen.lock().unwrap();
        let req = &seen[0];
        assert_eq!(req.method(), Method::POST);
        assert_eq!(
            req.uri().to_string(),
            "https://api.example.com/v1/cart/items?lat=12.5&lng=77.25"
        );
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer tok");
        let body: serde_json::Value = serde_json::from_slice(req.body()).unwrap();
        assert_eq!(body["productId"], "65af");
        assert_eq!(body["quantity"], 1);
        assert_eq!(body["variant"]["title"], "1 L");
    }

    #[tokio::test]
    async fn test_bare_snapshot_and_routes() {
        let transport = Recorded::new(StatusCode::OK, r#"{"items":[]}"#);
        let gateway = HttpCartGateway::new(transport, GatewayConfig::new("http://localhost"));

        gateway.update_quantity(&LineId::new("l1"), 4, None).await.unwrap();
        gateway.remove(&LineId::new("l1"), None).await.unwrap();
        gateway.fetch(None).await.unwrap();

        let seen = gateway.transport().seen.lock().unwrap();
        let routes: Vec<String> = seen
            .iter()
            .map(|r| format!("{} {}", r.method(), r.uri().path()))
            .collect();
        assert_eq!(
            routes,
            vec![
                "PUT /cart/items/l1",
                "DELETE /cart/items/l1",
                "GET /cart"
            ]
        );
        assert!(!seen[2].headers().contains_key(AUTHORIZATION));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let transport = Recorded::new(StatusCode::UNAUTHORIZED, "");
        let gateway = HttpCartGateway::new(transport, GatewayConfig::new("http://localhost"));
        assert_eq!(gateway.fetch(None).await, Err(GatewayError::Unauthorized));

        let transport = Recorded::new(StatusCode::BAD_GATEWAY, "");
        let gateway = HttpCartGateway::new(transport, GatewayConfig::new("http://localhost"));
        assert_eq!(
            gateway.clear().await,
            Err(GatewayError::Http {
                status: 502,
                path: "/cart".into()
            })
        );
    }

    #[tokio::test]
    async fn test_garbage_body_is_decode_error() {
        let transport = Recorded::new(StatusCode::OK, "<html>");
        let gateway = HttpCartGateway::new(transport, GatewayConfig::new("http://localhost"));
        assert!(matches!(
            gateway.fetch(None).await,
            Err(GatewayError::Decode(_))
        ));
    }
}
