//! HTTP client for the study manager REST API.
//!
//! `ApiClient` owns the connection pool, the base URL (resolved once when the
//! client is built) and a handle to the `SessionManager` that supplies the
//! bearer token. Typed endpoint groups hang off it (`client.subjects()`,
//! `client.exams()`, ...).

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{
    ApiError, AttachmentsApi, AuthApi, ExamsApi, HealthApi, ReferencesApi, StudentsApi,
    StudyContentsApi, SubjectsApi,
};
use crate::auth::SessionManager;
use crate::config::{ApiEndpoint, Config, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::status::ServiceStatus;

pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const USER_ID_HEADER: &str = "x-user-id";

const USER_AGENT: &str = concat!("studyhub/", env!("CARGO_PKG_VERSION"));

/// Which identity a request presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthMode {
    /// `Authorization: Bearer` plus `X-Client-ID`.
    Bearer,
    /// No credentials (auth exchanges, health).
    Public,
    /// `X-User-ID: <email>` in place of a token (student creation).
    UserId,
}

pub(crate) enum Payload<'a, B: ?Sized> {
    Empty,
    Json(&'a B),
    Multipart(Form),
}

/// API client for the study manager service.
/// Clone is cheap: the pool, session and status are shared.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    endpoint: ApiEndpoint,
    client_id: Option<String>,
    session: Arc<SessionManager>,
    status: ServiceStatus,
}

impl ApiClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Build from configuration with default settings otherwise.
    pub fn from_config(config: &Config, session: Arc<SessionManager>) -> Result<Self, ApiError> {
        Self::builder().config(config).build(session)
    }

    pub fn base_url(&self) -> &Url {
        self.inner.endpoint.url()
    }

    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.inner.endpoint
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.inner.session
    }

    /// Loading flag and last error of data calls.
    pub fn status(&self) -> &ServiceStatus {
        &self.inner.status
    }

    pub fn clear_error(&self) {
        self.inner.status.clear_error();
    }

    // ===== Endpoint groups =====

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    pub fn students(&self) -> StudentsApi {
        StudentsApi::new(self.clone())
    }

    pub fn subjects(&self) -> SubjectsApi {
        SubjectsApi::new(self.clone())
    }

    pub fn exams(&self) -> ExamsApi {
        ExamsApi::new(self.clone())
    }

    pub fn study_contents(&self) -> StudyContentsApi {
        StudyContentsApi::new(self.clone())
    }

    pub fn attachments(&self) -> AttachmentsApi {
        AttachmentsApi::new(self.clone())
    }

    pub fn references(&self) -> ReferencesApi {
        ReferencesApi::new(self.clone())
    }

    pub fn health(&self) -> HealthApi {
        HealthApi::new(self.clone())
    }

    // ===== Headers =====

    /// Headers for JSON calls: content type, bearer token when logged in,
    /// client id when configured.
    pub fn build_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = self.build_upload_headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Same as `build_headers` minus the content type, which the transport
    /// fills in with the multipart boundary.
    pub fn build_upload_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.inner.session.token() {
            let mut value = header_value(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(ref client_id) = self.inner.client_id {
            headers.insert(HeaderName::from_static(CLIENT_ID_HEADER), header_value(client_id)?);
        }
        Ok(headers)
    }

    fn public_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn user_id_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = Self::public_headers();
        let email = self
            .inner
            .session
            .current_user()
            .map(|u| u.email)
            .unwrap_or_default();
        headers.insert(HeaderName::from_static(USER_ID_HEADER), header_value(&email)?);
        Ok(headers)
    }

    // ===== Request plumbing =====

    /// Join a relative API path onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        let path = path.trim_start_matches('/');
        self.inner
            .endpoint
            .url()
            .join(path)
            .map_err(|e| ApiError::Config(format!("Invalid API path '{}': {}", path, e)))
    }

    /// Send one request and classify the status. Exactly one attempt.
    ///
    /// A 401/403 on a request that carried a bearer token ends the session
    /// before the error is returned, unless that token has since been
    /// replaced.
    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        payload: Payload<'_, B>,
        auth: AuthMode,
    ) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let headers = match (auth, &payload) {
            (AuthMode::Bearer, Payload::Multipart(_)) => self.build_upload_headers()?,
            (AuthMode::Bearer, _) => self.build_headers()?,
            (AuthMode::Public, _) => Self::public_headers(),
            (AuthMode::UserId, _) => self.user_id_headers()?,
        };
        let sent_token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);

        let request = self.inner.http.request(method.clone(), url).headers(headers);
        let request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(body),
            Payload::Multipart(form) => request.multipart(form),
        };

        debug!(%method, path, "API request");
        let response = request.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "API request failed to send");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "API response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);
        if let (true, Some(token)) = (error.is_unauthorized(), sent_token.as_deref()) {
            if self.inner.session.logout_if_token(token) {
                warn!(%method, path, status = status.as_u16(), "Token rejected, ending session");
            }
        }
        Err(error)
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })
    }

    /// Publish a failed call on the status channel.
    fn record<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(ref e) = result {
            self.inner.status.set_error(e.user_message());
        }
        result
    }

    pub(crate) async fn request_json<T, B>(
        &self,
        method: Method,
        path: &str,
        payload: Payload<'_, B>,
        auth: AuthMode,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let _loading = self.inner.status.begin();
        let result = match self.send(method, path, payload, auth).await {
            Ok(response) => Self::decode(response, path).await,
            Err(e) => Err(e),
        };
        self.record(result)
    }

    /// For endpoints whose success body is empty or irrelevant.
    pub(crate) async fn request_unit<B>(
        &self,
        method: Method,
        path: &str,
        payload: Payload<'_, B>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let _loading = self.inner.status.begin();
        let result = self
            .send(method, path, payload, AuthMode::Bearer)
            .await
            .map(drop);
        self.record(result)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_json(Method::GET, path, Payload::<()>::Empty, AuthMode::Bearer)
            .await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_json(Method::POST, path, Payload::Json(body), AuthMode::Bearer)
            .await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_json(Method::PUT, path, Payload::Json(body), AuthMode::Bearer)
            .await
    }

    pub(crate) async fn put_unit<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.request_unit(Method::PUT, path, Payload::Json(body)).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request_unit(Method::DELETE, path, Payload::<()>::Empty)
            .await
    }

    /// Multipart POST. Never retried: the body is consumed by the attempt.
    pub(crate) async fn post_multipart<T>(&self, path: &str, form: Form) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, Payload::<()>::Multipart(form), AuthMode::Bearer)
            .await
    }

    /// Raw response body, for file downloads.
    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let _loading = self.inner.status.begin();
        let result = match self
            .send(Method::GET, path, Payload::<()>::Empty, AuthMode::Bearer)
            .await
        {
            Ok(response) => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(ApiError::from),
            Err(e) => Err(e),
        };
        self.record(result)
    }
}

/// One path segment from a caller-supplied id. The id is percent-encoded so
/// it can never add segments or climb out of its endpoint. `%` is encoded
/// too, so only the literal dot segments need refusing.
pub(crate) fn segment(id: &str) -> Result<Cow<'_, str>, ApiError> {
    match id {
        "" | "." | ".." => Err(ApiError::Config(format!("Invalid id '{}'", id))),
        _ => Ok(urlencoding::encode(id)),
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value)
        .map_err(|_| ApiError::Config("Header value contains invalid characters".to_string()))
}

/// Builder for `ApiClient`.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_url: Option<String>,
    served_from: Option<String>,
    client_id: Option<String>,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            api_url: None,
            served_from: None,
            client_id: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Take everything the configuration says about the connection.
    pub fn config(mut self, config: &Config) -> Self {
        self.api_url = config.api_url.clone();
        self.served_from = config.served_from.clone();
        self.client_id = config.client_id.clone();
        self.timeout = config.request_timeout();
        self
    }

    /// Direct service address (including `/api/v1`).
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Origin the client is served from; development origins use the proxy.
    pub fn served_from(mut self, origin: impl Into<String>) -> Self {
        self.served_from = Some(origin.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolve the base URL and build the client. The URL is fixed from here on.
    pub fn build(self, session: Arc<SessionManager>) -> Result<ApiClient, ApiError> {
        let endpoint = ApiEndpoint::resolve(self.served_from.as_deref(), self.api_url.as_deref())
            .map_err(ApiError::Config)?;

        let client_id = self.client_id.filter(|id| !id.trim().is_empty());
        if let Some(ref id) = client_id {
            header_value(id)?;
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()?;

        debug!(
            base_url = %endpoint.url(),
            proxy = endpoint.is_proxy(),
            "API client configured"
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                endpoint,
                client_id,
                session,
                status: ServiceStatus::new(),
            }),
        })
    }
}
