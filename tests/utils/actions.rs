use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Request, StatusCode,
    },
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// Test Actions - requests against the full router
// ============================================================================

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

impl TestSetup {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse { status, body }
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/v1/users/register",
            json!({"username": username, "email": email, "password": password}),
        )
        .await
    }

    pub async fn login(&self, login: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/v1/users/login",
            json!({"login": login, "password": password}),
        )
        .await
    }

    /// Registers and logs in a user, returning the issued access and refresh tokens
    pub async fn register_and_login(&self, username: &str) -> (String, String) {
        let email = format!("{}@example.com", username);
        let response = self.register(username, &email, "password1").await;
        assert_eq!(response.status, StatusCode::OK);

        let response = self.login(username, "password1").await;
        assert_eq!(response.status, StatusCode::OK);
        let body = response.json();
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn logout(&self, authorization: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/users/logout");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }
}
