//! HTTP transport shared by every resource client.
//!
//! One [`Client`] wraps a single `reqwest::Client` carrying the bearer token
//! as a default header. Assistant-family routes additionally get the
//! `OpenAI-Beta` marker. Non-2xx responses are decoded from the standard
//! `{"error": {...}}` envelope into [`Error::Api`].

use crate::{ApiResult, Credentials, Error};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    multipart::Form,
    Client as HttpClient, Method, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

const OPENAI_BETA: &str = "OpenAI-Beta";
const ASSISTANTS_VERSION: &str = "assistants=v1";

#[derive(Clone)]
pub struct Client {
    credentials: Credentials,
    http: HttpClient,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.credentials.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
    param: Option<String>,
    code: Option<String>,
}

/// Deletion acknowledgement returned by the delete endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Deleted {
    pub id: String,
    pub object: String,
    pub deleted: bool,
}

/// One page of a list response.
///
/// `has_more` signals that further items exist after `last_id`; callers
/// continue by re-querying with `after = last_id`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    pub object: String,
    pub data: Vec<T>,
    pub first_id: Option<String>,
    pub last_id: Option<String>,
    /// Absent on endpoints that do not paginate (e.g. the files list).
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    Desc,
}

/// Query parameters accepted by every list endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl ListQuery {
    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: u8) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn before(mut self, before: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self
    }

    pub fn after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }
}

impl Client {
    pub fn new(credentials: Credentials) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.api_key))
            .map_err(|_| Error::Validation("api key contains invalid header characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        let http = HttpClient::builder().default_headers(headers).build()?;
        Ok(Self { credentials, http })
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.credentials.base_url, route)
    }

    // The beta marker belongs on the assistants surface only; files, audio,
    // chat and embeddings are stable endpoints.
    fn is_assistants_route(route: &str) -> bool {
        route.starts_with("assistants") || route.starts_with("threads")
    }

    async fn send<F>(&self, method: Method, route: &str, build: F) -> ApiResult<Response>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.url(route);
        log::debug!("request [{method}] {url}");

        let mut request = self.http.request(method.clone(), &url);
        if Self::is_assistants_route(route) {
            request = request.header(OPENAI_BETA, ASSISTANTS_VERSION);
        }
        let response = build(request).send().await?;

        log::debug!("response [{method}] {} {url}", response.status().as_str());
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::decode_error(response).await)
    }

    async fn decode_error(response: Response) -> Error {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return Error::Transport(err),
        };
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => Error::Api {
                status,
                message: envelope.error.message,
                error_type: envelope.error.error_type,
                param: envelope.error.param,
                code: envelope.error.code,
            },
            Err(_) => Error::Api {
                status,
                message: body,
                error_type: "unknown".to_string(),
                param: None,
                code: None,
            },
        }
    }

    pub async fn get<T>(&self, route: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(Method::GET, route, |request| request).await?;
        Ok(response.json().await?)
    }

    pub async fn get_query<T>(&self, route: &str, query: &ListQuery) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .send(Method::GET, route, |request| request.query(query))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn post<S, T>(&self, route: &str, body: &S) -> ApiResult<T>
    where
        S: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(Method::POST, route, |request| request.json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// POST without a body, used by endpoints such as run cancellation.
    pub async fn post_empty<T>(&self, route: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, route, |request| request).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, route: &str) -> ApiResult<Deleted> {
        let response = self.send(Method::DELETE, route, |request| request).await?;
        Ok(response.json().await?)
    }

    pub async fn get_bytes(&self, route: &str) -> ApiResult<Vec<u8>> {
        let response = self.send(Method::GET, route, |request| request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn post_bytes<S>(&self, route: &str, body: &S) -> ApiResult<Vec<u8>>
    where
        S: Serialize + ?Sized,
    {
        let response = self
            .send(Method::POST, route, |request| request.json(body))
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn post_multipart<T>(&self, route: &str, form: Form) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .send(Method::POST, route, |request| request.multipart(form))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn post_multipart_text(&self, route: &str, form: Form) -> ApiResult<String> {
        let response = self
            .send(Method::POST, route, |request| request.multipart(form))
            .await?;
        Ok(response.text().await?)
    }
}
