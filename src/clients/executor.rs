//! The request executor.
//!
//! [`RequestExecutor`] turns a [`RequestDescriptor`] into a wire request,
//! dispatches it through a [`Transport`], and routes the outcome through
//! validation and error classification. Every call resolves to exactly one
//! `Result<T, ApiError>`.
//!
//! # Request shapes
//!
//! - **multipart**: the descriptor carries `form_data`
//! - **array payload**: the descriptor carries `array_parameters`
//! - **standard**: everything else, encoded per [`select_encoding`]
//!
//! # Outcome routing
//!
//! 1. status 401 → [`ApiError::unauthorized`], body ignored
//! 2. transport timeout → [`Reason::RequestTimeout`]
//! 3. other transport failure → [`Reason::NetworkConnectionError`]
//! 4. classifier / status check via [`validate_response`]
//! 5. JSON parse and [`ResponseBuilder::build`]

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;

use crate::clients::classifier::{validate_response, BackendErrorClassifier, ErrorClassifier};
use crate::clients::encoding::{query_string, select_encoding, EncodedParameters, JSON_CONTENT_TYPE};
use crate::clients::errors::{ApiError, InvalidHttpRequestError, Reason};
use crate::clients::http_request::{Parameters, RequestDescriptor};
use crate::clients::http_response::TransportResponse;
use crate::clients::multipart::build_parts;
use crate::clients::response_builder::ResponseBuilder;
use crate::clients::transport::{RequestBody, Transport, TransportRequest};
use crate::config::ApiKey;
use crate::credentials::CredentialProvider;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Whether a call is expected to carry a credential.
///
/// Both policies run the same orchestration. The policy only documents the
/// caller's intent: an authenticated call made without a stored key is
/// logged as a warning, while for unauthenticated endpoints (sign-in,
/// sign-up) a missing key is expected. A server that requires the key
/// answers 401, which surfaces as [`Reason::Unauthorized`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AuthorizationPolicy {
    /// The endpoint requires the stored API key.
    #[default]
    Authenticated,
    /// The endpoint does not require an API key.
    Unauthenticated,
}

/// Lifecycle of a single call, traced at `trace` level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CallState {
    Created,
    CredentialResolved,
    Dispatched,
    Succeeded,
    Failed(Reason),
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Variant {
    Auto,
    Multipart,
    ArrayPayload,
    Standard,
}

/// Executes request descriptors against the API.
///
/// The executor holds no per-call state: the credential is fetched from the
/// [`CredentialProvider`] at the start of every call, so concurrent calls
/// never share a mutable key.
///
/// # Thread Safety
///
/// `RequestExecutor` is `Clone + Send + Sync`; clones share their collaborators.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use lyst_network::{
///     ApiKey, HttpMethod, Json, MemoryCredentialStore, RequestDescriptor, RequestExecutor,
///     ReqwestTransport,
/// };
///
/// let store = Arc::new(MemoryCredentialStore::with_key(ApiKey::new("K1")?));
/// let transport = Arc::new(ReqwestTransport::new(Some(&config))?);
/// let executor = RequestExecutor::new(store, transport);
///
/// let descriptor = config.descriptor("dogURL", HttpMethod::Get)?.parameter("page", 2).build();
/// let dogs: Vec<Dog> = executor.execute(&descriptor, &Json::new()).await?;
/// ```
#[derive(Clone)]
pub struct RequestExecutor {
    credentials: Arc<dyn CredentialProvider>,
    transport: Arc<dyn Transport>,
    classifier: Arc<dyn ErrorClassifier>,
}

// Verify RequestExecutor is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RequestExecutor>();
};

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor").finish_non_exhaustive()
    }
}

impl RequestExecutor {
    /// Creates an executor using [`BackendErrorClassifier`].
    ///
    /// The stored credential is read once and written back to the store.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialProvider>, transport: Arc<dyn Transport>) -> Self {
        Self::with_classifier(credentials, transport, Arc::new(BackendErrorClassifier))
    }

    /// Creates an executor with a custom error classifier.
    #[must_use]
    pub fn with_classifier(
        credentials: Arc<dyn CredentialProvider>,
        transport: Arc<dyn Transport>,
        classifier: Arc<dyn ErrorClassifier>,
    ) -> Self {
        let stored = credentials.fetch();
        tracing::debug!(has_credential = stored.is_some(), "Request executor created");
        credentials.save(stored);

        Self {
            credentials,
            transport,
            classifier,
        }
    }

    /// Executes an authenticated call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request cannot be built, the transport
    /// fails, the response is rejected, or decoding fails.
    pub async fn execute<B: ResponseBuilder>(
        &self,
        descriptor: &RequestDescriptor,
        builder: &B,
    ) -> Result<B::Output, ApiError> {
        self.execute_with_policy(AuthorizationPolicy::Authenticated, descriptor, builder)
            .await
    }

    /// Executes a call to an endpoint that does not require a credential,
    /// such as sign-in or sign-up.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn execute_unauthenticated<B: ResponseBuilder>(
        &self,
        descriptor: &RequestDescriptor,
        builder: &B,
    ) -> Result<B::Output, ApiError> {
        self.execute_with_policy(AuthorizationPolicy::Unauthenticated, descriptor, builder)
            .await
    }

    /// Executes a call under an explicit [`AuthorizationPolicy`].
    ///
    /// The request shape is picked from the descriptor: `form_data` selects
    /// multipart, `array_parameters` selects the array payload, anything
    /// else is a standard request.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn execute_with_policy<B: ResponseBuilder>(
        &self,
        policy: AuthorizationPolicy,
        descriptor: &RequestDescriptor,
        builder: &B,
    ) -> Result<B::Output, ApiError> {
        self.run(policy, descriptor, builder, Variant::Auto).await
    }

    /// Executes a multipart upload.
    ///
    /// # Errors
    ///
    /// Returns a [`Reason::Generic`] error with status `0` if the descriptor
    /// has no `form_data` or lacks the `withName`, `fileName` or `mimeType`
    /// parameters; otherwise see [`execute`](Self::execute).
    pub async fn execute_multipart<B: ResponseBuilder>(
        &self,
        policy: AuthorizationPolicy,
        descriptor: &RequestDescriptor,
        builder: &B,
    ) -> Result<B::Output, ApiError> {
        self.run(policy, descriptor, builder, Variant::Multipart).await
    }

    /// Executes a call whose body is a top-level JSON array.
    ///
    /// The body is `array_parameters`, or `[{}]` when the descriptor has none.
    ///
    /// # Errors
    ///
    /// Returns `ApiError { status_code: 0, message: "Invalid Request" }` without
    /// dispatching if the endpoint is not a valid URL; otherwise see
    /// [`execute`](Self::execute).
    pub async fn execute_array_payload<B: ResponseBuilder>(
        &self,
        policy: AuthorizationPolicy,
        descriptor: &RequestDescriptor,
        builder: &B,
    ) -> Result<B::Output, ApiError> {
        self.run(policy, descriptor, builder, Variant::ArrayPayload).await
    }

    /// Spawns the call on the Tokio runtime and hands its result to
    /// `completion` exactly once.
    pub fn execute_detached<B, F>(
        &self,
        policy: AuthorizationPolicy,
        descriptor: RequestDescriptor,
        builder: B,
        completion: F,
    ) -> tokio::task::JoinHandle<()>
    where
        B: ResponseBuilder + 'static,
        B::Output: Send + 'static,
        F: FnOnce(Result<B::Output, ApiError>) + Send + 'static,
    {
        let executor = self.clone();
        tokio::spawn(async move {
            let result = executor
                .execute_with_policy(policy, &descriptor, &builder)
                .await;
            completion(result);
        })
    }

    async fn run<B: ResponseBuilder>(
        &self,
        policy: AuthorizationPolicy,
        descriptor: &RequestDescriptor,
        builder: &B,
        variant: Variant,
    ) -> Result<B::Output, ApiError> {
        let endpoint = descriptor.endpoint();
        trace_state(endpoint, CallState::Created);

        tracing::debug!(
            endpoint,
            method = %descriptor.method(),
            ?policy,
            x_api_key = ?descriptor.x_api_key(),
            "Executing request"
        );

        let credential = self.resolve_credential(policy, descriptor);
        trace_state(endpoint, CallState::CredentialResolved);

        let variant = match variant {
            Variant::Auto if descriptor.form_data().is_some() => Variant::Multipart,
            Variant::Auto if descriptor.array_parameters().is_some() => Variant::ArrayPayload,
            Variant::Auto => Variant::Standard,
            explicit => explicit,
        };

        let built = match variant {
            Variant::Multipart => build_multipart(descriptor, credential.as_ref()),
            Variant::ArrayPayload => build_array_payload(descriptor, credential.as_ref()),
            Variant::Auto | Variant::Standard => build_standard(descriptor, credential.as_ref()),
        };

        let outcome = match built {
            Ok(request) => {
                trace_state(endpoint, CallState::Dispatched);
                self.dispatch(request, builder).await
            }
            Err(error) => {
                tracing::debug!(endpoint, %error, "Request could not be built");
                Err(ApiError::from(error))
            }
        };

        match &outcome {
            Ok(_) => trace_state(endpoint, CallState::Succeeded),
            Err(error) => trace_state(endpoint, CallState::Failed(error.reason())),
        }
        trace_state(endpoint, CallState::Completed);

        outcome
    }

    fn resolve_credential(
        &self,
        policy: AuthorizationPolicy,
        descriptor: &RequestDescriptor,
    ) -> Option<ApiKey> {
        let credential = self.credentials.fetch();

        if credential.is_none() && descriptor.headers().is_empty() {
            match policy {
                AuthorizationPolicy::Authenticated => tracing::warn!(
                    endpoint = descriptor.endpoint(),
                    "No API key stored; sending authenticated request without x-api-key"
                ),
                AuthorizationPolicy::Unauthenticated => tracing::debug!(
                    endpoint = descriptor.endpoint(),
                    "No API key stored for unauthenticated request"
                ),
            }
        }

        credential
    }

    async fn dispatch<B: ResponseBuilder>(
        &self,
        request: TransportRequest,
        builder: &B,
    ) -> Result<B::Output, ApiError> {
        tracing::debug!(method = %request.method, url = %request.url, "Dispatching request");

        match self.transport.send(request).await {
            Ok(response) => self.handle_response(&response, builder),
            Err(error) if error.status == Some(401) => Err(ApiError::unauthorized()),
            Err(error) => {
                tracing::debug!(kind = ?error.kind, %error, "Transport failed");
                Err(ApiError::from(error))
            }
        }
    }

    fn handle_response<B: ResponseBuilder>(
        &self,
        response: &TransportResponse,
        builder: &B,
    ) -> Result<B::Output, ApiError> {
        let status = response.status;
        tracing::debug!(status, request_id = response.request_id(), "Response received");

        if status == 401 {
            return Err(ApiError::unauthorized());
        }

        if let Err(error) = validate_response(self.classifier.as_ref(), status, response.body()) {
            tracing::debug!(
                status,
                reason = %error.reason(),
                body = %response.body_text(),
                "Response rejected"
            );
            return Err(error);
        }

        let value = match response.body() {
            None => Value::Null,
            Some(bytes) => serde_json::from_slice(bytes).map_err(|e| {
                tracing::debug!(status, error = %e, "Response body is not JSON");
                ApiError::new(
                    i32::from(status),
                    "Invalid Response",
                    Reason::Generic,
                    response.body_text(),
                )
            })?,
        };

        builder.build(value).map_err(|e| {
            ApiError::new(
                i32::from(status),
                format!("Invalid Response: {e}"),
                Reason::Generic,
                response.body_text(),
            )
        })
    }
}

fn trace_state(endpoint: &str, state: CallState) {
    tracing::trace!(endpoint, ?state, "Call state");
}

fn parse_endpoint(endpoint: &str) -> Result<Url, InvalidHttpRequestError> {
    Url::parse(endpoint).map_err(|_| InvalidHttpRequestError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
    })
}

/// Picks the headers for a call.
///
/// Non-empty descriptor headers are used verbatim. Otherwise the API key
/// (when one is stored) and `Accept: application/json` are synthesized.
fn resolve_headers(
    descriptor: &RequestDescriptor,
    credential: Option<&ApiKey>,
) -> HashMap<String, String> {
    if !descriptor.headers().is_empty() {
        return descriptor.headers().clone();
    }

    let mut headers = HashMap::new();
    if let Some(key) = credential {
        headers.insert(API_KEY_HEADER.to_string(), key.as_ref().to_string());
    }
    headers.insert("Accept".to_string(), JSON_CONTENT_TYPE.to_string());
    headers
}

fn has_header(headers: &HashMap<String, String>, name: &str) -> bool {
    headers.keys().any(|key| key.eq_ignore_ascii_case(name))
}

fn append_query(url: &mut Url, query: &str) {
    if query.is_empty() {
        return;
    }
    let merged = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
        _ => query.to_string(),
    };
    url.set_query(Some(&merged));
}

fn apply_encoded(
    url: &mut Url,
    headers: &mut HashMap<String, String>,
    encoded: EncodedParameters,
) -> RequestBody {
    if let Some(query) = &encoded.query {
        append_query(url, query);
    }

    if let Some(content_type) = encoded.content_type {
        if !has_header(headers, "content-type") {
            headers.insert("Content-Type".to_string(), content_type);
        }
    }

    encoded.body.map_or(RequestBody::Empty, RequestBody::Bytes)
}

fn build_standard(
    descriptor: &RequestDescriptor,
    credential: Option<&ApiKey>,
) -> Result<TransportRequest, InvalidHttpRequestError> {
    let mut url = parse_endpoint(descriptor.endpoint())?;
    let mut headers = resolve_headers(descriptor, credential);

    let encoding = select_encoding(
        descriptor.method(),
        descriptor.is_form_url_encoded(),
        descriptor.custom_encoding(),
    );
    let encoded = encoding.encode(descriptor.method(), descriptor.parameters())?;
    let body = apply_encoded(&mut url, &mut headers, encoded);

    Ok(TransportRequest {
        method: descriptor.method(),
        url,
        headers,
        body,
    })
}

fn build_array_payload(
    descriptor: &RequestDescriptor,
    credential: Option<&ApiKey>,
) -> Result<TransportRequest, InvalidHttpRequestError> {
    let mut url = parse_endpoint(descriptor.endpoint())?;
    let mut headers = resolve_headers(descriptor, credential);

    // The body is always the array; the encoding only decides whether the
    // scalar parameters ride along in the URL.
    let encoding = select_encoding(
        descriptor.method(),
        descriptor.is_form_url_encoded(),
        descriptor.custom_encoding(),
    );
    if encoding.is_query() {
        append_query(&mut url, &query_string(descriptor.parameters()));
    }

    let default_items = [Parameters::new()];
    let items = descriptor.array_parameters().unwrap_or(&default_items);
    let body = serde_json::to_vec(items).map_err(|e| InvalidHttpRequestError::Encoding {
        reason: e.to_string(),
    })?;

    if !has_header(&headers, "content-type") {
        headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
    }

    Ok(TransportRequest {
        method: descriptor.method(),
        url,
        headers,
        body: RequestBody::Bytes(body),
    })
}

fn build_multipart(
    descriptor: &RequestDescriptor,
    credential: Option<&ApiKey>,
) -> Result<TransportRequest, InvalidHttpRequestError> {
    let url = parse_endpoint(descriptor.endpoint())?;
    let parts = build_parts(descriptor)?;
    let headers = resolve_headers(descriptor, credential);

    Ok(TransportRequest {
        method: descriptor.method(),
        url,
        headers,
        body: RequestBody::Multipart(parts),
    })
}
