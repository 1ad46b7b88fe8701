//! REST adapter: one function per backend call.
//!
//! Single attempt per call (no retries, no timeout, no backoff). Every
//! authenticated request carries `Authorization: Bearer <token>` and a JSON
//! content type.

use std::fmt;

use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use stockroom_core::ProductId;
use stockroom_products::{NewProduct, Product, ProductChanges};

pub const UNAUTHORIZED_LOGIN_MESSAGE: &str = "Unauthorized: Invalid username or password.";

/// Which adapter call failed; selects the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    FetchProducts,
    AddProduct,
    UpdateProduct,
    DeleteProduct,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Login => "Login failed. Please try again.",
            Operation::FetchProducts => "Failed to fetch products",
            Operation::AddProduct => "Failed to add product",
            Operation::UpdateProduct => "Failed to update product",
            Operation::DeleteProduct => "Failed to delete product",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Login => "login",
            Operation::FetchProducts => "fetch products",
            Operation::AddProduct => "add product",
            Operation::UpdateProduct => "update product",
            Operation::DeleteProduct => "delete product",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// No response (connection refused, DNS, broken pipe...).
    #[error("{op}: request failed: {source}")]
    Network {
        op: Operation,
        #[source]
        source: reqwest::Error,
    },

    #[error("{op}: unauthorized")]
    Unauthorized { op: Operation },

    #[error("{op}: unexpected status {status}")]
    Status { op: Operation, status: StatusCode },

    /// Success status, but the body was not the expected JSON.
    #[error("{op}: unexpected response body: {source}")]
    Decode {
        op: Operation,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    pub fn operation(&self) -> Operation {
        match self {
            ClientError::Network { op, .. }
            | ClientError::Unauthorized { op }
            | ClientError::Status { op, .. }
            | ClientError::Decode { op, .. } => *op,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// Message for the error banner. Only login distinguishes 401.
    pub fn user_message(&self) -> &'static str {
        match self {
            ClientError::Unauthorized { op: Operation::Login } => UNAUTHORIZED_LOGIN_MESSAGE,
            other => other.operation().failure_message(),
        }
    }
}

/// Body of a successful login. `token_type` is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RestAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl RestAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
    }

    /// `POST /auth/login` with an OAuth2 password-grant form.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let op = Operation::Login;
        let form = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("scope", ""),
            ("client_id", ""),
            ("client_secret", ""),
        ];

        let res = self
            .http
            .post(self.url("/auth/login"))
            .form(&form)
            .send()
            .await
            .map_err(|source| ClientError::Network { op, source })?;

        decode(op, check(op, res)?).await
    }

    pub async fn fetch_products(&self, token: &str) -> Result<Vec<Product>, ClientError> {
        let op = Operation::FetchProducts;
        let res = send(op, self.authorized(Method::GET, "/products", token)).await?;
        decode(op, res).await
    }

    pub async fn add_product(&self, token: &str, input: &NewProduct) -> Result<Product, ClientError> {
        let op = Operation::AddProduct;
        let res = send(op, self.authorized(Method::POST, "/products", token).json(input)).await?;
        decode(op, res).await
    }

    pub async fn update_product(
        &self,
        token: &str,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, ClientError> {
        let op = Operation::UpdateProduct;
        let path = format!("/products/{id}");
        let res = send(op, self.authorized(Method::PUT, &path, token).json(changes)).await?;
        decode(op, res).await
    }

    pub async fn delete_product(&self, token: &str, id: ProductId) -> Result<(), ClientError> {
        let op = Operation::DeleteProduct;
        let path = format!("/products/{id}");
        send(op, self.authorized(Method::DELETE, &path, token)).await?;
        Ok(())
    }
}

async fn send(op: Operation, request: RequestBuilder) -> Result<Response, ClientError> {
    let res = request
        .send()
        .await
        .map_err(|source| ClientError::Network { op, source })?;
    check(op, res)
}

fn check(op: Operation, res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    tracing::debug!(%op, %status, "request rejected");
    if status == StatusCode::UNAUTHORIZED {
        Err(ClientError::Unauthorized { op })
    } else {
        Err(ClientError::Status { op, status })
    }
}

async fn decode<T: DeserializeOwned>(op: Operation, res: Response) -> Result<T, ClientError> {
    res.json::<T>()
        .await
        .map_err(|source| ClientError::Decode { op, source })
}
