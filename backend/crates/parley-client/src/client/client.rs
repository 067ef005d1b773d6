use crate::client::event_stream::decode_body;
use crate::{ClientError, ClientResult, EventStream};

use futures::StreamExt;
use parley_core::api::{
    ErrorResponse, FileContentResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse, SendMessageRequest, SendOtpRequest, SendOtpResponse, VerifyOtpRequest,
    VerifyOtpResponse,
};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// HTTP client for the parley server API
#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    client: ReqwestClient,
}

impl Client {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Server URL (e.g., "http://127.0.0.1:3000")
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: ReqwestClient::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url)
    }

    /// Send the request and map non-2xx replies to `ClientError::Api`
    async fn send(&self, req: RequestBuilder) -> ClientResult<Response> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await?;
        let message = match serde_json::from_slice::<ErrorResponse>(&body) {
            Ok(error) => error.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };
        Err(ClientError::api(status.as_u16(), message))
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let response = self.send(req).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Ask the server to email a sign-in code
    pub async fn send_otp(&self, email: &str) -> ClientResult<SendOtpResponse> {
        let body = SendOtpRequest {
            email: email.to_string(),
        };
        let req = self.request(Method::POST, "/api/send-otp").json(&body);
        self.execute(req).await
    }

    /// Exchange an emailed code for a session
    pub async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        username: Option<&str>,
    ) -> ClientResult<VerifyOtpResponse> {
        let body = VerifyOtpRequest {
            email: email.to_string(),
            otp: otp.to_string(),
            username: username.map(String::from),
        };
        let req = self.request(Method::POST, "/api/verify-otp").json(&body);
        self.execute(req).await
    }

    /// Create an unverified account; a code is emailed as a side effect
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<RegisterResponse> {
        let req = self.request(Method::POST, "/api/register").json(request);
        self.execute(req).await
    }

    /// Password sign-in for verified accounts
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let req = self.request(Method::POST, "/api/login").json(&body);
        self.execute(req).await
    }

    // =========================================================================
    // Chat
    // =========================================================================

    /// Send a chat message and stream the reply.
    ///
    /// Rejections that happen before streaming starts (bad session, empty
    /// message) come back as `ClientError::Api`. Once the stream is open,
    /// failures arrive as `RelayEvent::Error` items.
    pub async fn send_message(&self, request: &SendMessageRequest) -> ClientResult<EventStream> {
        let mut req = self.request(Method::POST, "/api/send-message").json(request);
        if let Some(token) = request.session_token.as_deref() {
            req = req.bearer_auth(token);
        }

        let response = self.send(req).await?;
        Ok(decode_body(response.bytes_stream().boxed()))
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Read back an uploaded file by its stored name
    pub async fn file_content(&self, filename: &str) -> ClientResult<FileContentResponse> {
        let req = self.request(Method::GET, &format!("/api/file-content/{}", filename));
        self.execute(req).await
    }
}
