//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, minting identity tokens
//! and making HTTP requests.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use huddle_api::{create_app, create_app_state, serve};
use huddle_common::{AppConfig, IdentityClaims, JwtService};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::fixtures::{ErrorEnvelope, IdBody, SyncUser};

/// Shared secret of the test identity provider
pub const TEST_SECRET: &str = "integration-test-secret-0123456789";

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    jwt: JwtService,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a new test server on the in-memory store
    pub async fn start() -> Result<Self> {
        Self::start_with(|_| None).await
    }

    /// Start a test server; `overrides` can replace any environment variable
    pub async fn start_with(overrides: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = test_config(overrides)?;
        let state = create_app_state(config).await?;
        let app = create_app(state)?;

        // Ephemeral port
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let (shutdown, signal) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = serve(listener, app, async move {
                let _ = signal.await;
            })
            .await;
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            jwt: JwtService::with_secret(TEST_SECRET),
            shutdown: Some(shutdown),
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Identity token for `auth_id`, as the identity provider would issue it
    pub fn token_for(&self, auth_id: &str) -> String {
        self.jwt
            .issue(&IdentityClaims::new(auth_id, chrono::Duration::minutes(5)))
            .expect("test tokens are signed with a shared secret")
    }

    /// Mint a token for `name` and sync the user; returns the session
    pub async fn sign_in(&self, name: &str) -> Result<Session> {
        let auth_id = format!("idp|{}", name.to_lowercase());
        let token = self.token_for(&auth_id);
        let response = self
            .post_auth("/api/v1/users/@me/sync", &token, &SyncUser::named(name))
            .await?;
        let body: IdBody = assert_json(response, StatusCode::OK).await?;
        Ok(Session {
            user_id: body.id,
            token,
        })
    }

    fn authed(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {token}"))
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.authed(self.client.get(self.url(path)), token).send().await?)
    }

    /// Make a POST request with auth token and JSON body
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .authed(self.client.post(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a POST request with auth token and no body
    pub async fn post_empty(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.authed(self.client.post(self.url(path)), token).send().await?)
    }

    /// Make a PUT request with auth token
    pub async fn put_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .authed(self.client.put(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PATCH request with auth token
    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .authed(self.client.patch(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.authed(self.client.delete(self.url(path)), token).send().await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// A synced caller
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub token: String,
}

/// Test configuration: in-memory store, no Redis, HS256 test secret
pub fn test_config(overrides: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
    AppConfig::from_lookup(|key| {
        overrides(key).or_else(|| match key {
            "DATABASE_URL" => Some("memory://".to_string()),
            "AUTH_JWT_SECRET" => Some(TEST_SECRET.to_string()),
            "SERVER_HOST" => Some("127.0.0.1".to_string()),
            _ => None,
        })
    })
    .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}

/// Assert an error status and return the machine-readable code
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: ErrorEnvelope = assert_json(response, expected_status).await?;
    Ok(body.error.code)
}
