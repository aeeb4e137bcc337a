use crate::core::errors::GlobeError;
use crate::core::kernel::signer::{RequestDescriptor, Signer};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, trace};

/// REST client trait for making HTTP requests
///
/// Every call is independent; implementations must be usable from several
/// tasks at once.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Make a GET request and return the body as raw text
    ///
    /// # Arguments
    /// * `endpoint` - The API endpoint path, e.g. `/api/v1/positions`
    /// * `query_params` - Query parameters as key-value pairs
    /// * `authenticated` - Whether to sign the request
    async fn get_text(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<String, GlobeError>;

    /// Make a GET request and decode the body as JSON
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<Value, GlobeError> {
        let text = self.get_text(endpoint, query_params, authenticated).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API, without the `/api/v1` prefix
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds; `None` leaves requests unbounded
    pub timeout_seconds: Option<u64>,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: None,
            user_agent: crate::core::config::DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            signer: None,
        }
    }

    /// Set the signer for authenticated requests
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn build(self) -> Result<ReqwestRest, GlobeError> {
        let mut builder = Client::builder().user_agent(&self.config.user_agent);
        if let Some(timeout) = self.config.timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }
        let client = builder.build()?;

        Ok(ReqwestRest {
            client,
            config: self.config,
            signer: self.signer,
        })
    }
}

/// Implementation of `RestClient` using reqwest
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Build the full URL for an endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    /// Read the body, mapping non-2xx statuses to `HttpError`
    #[instrument(skip(self, response), fields(exchange = %self.config.exchange_name, status = %response.status()))]
    async fn handle_response(&self, response: Response) -> Result<String, GlobeError> {
        let status = response.status();
        let body = response.text().await?;

        trace!("Response body: {}", body);

        if status.is_success() {
            Ok(body)
        } else {
            Err(GlobeError::HttpError {
                status: status.as_u16(),
                body,
            })
        }
    }

    #[instrument(skip(self, query_params), fields(exchange = %self.config.exchange_name, method = %method, endpoint = %endpoint))]
    async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<String, GlobeError> {
        let mut request = self
            .client
            .request(method.clone(), self.build_url(endpoint))
            .query(query_params);

        if authenticated {
            let signer = self.signer.as_ref().ok_or(GlobeError::MissingCredentials)?;
            // The signature covers the path only, never the query string
            let descriptor = RequestDescriptor::new(method.as_str(), endpoint);
            for (name, value) in signer.sign_request(&descriptor)? {
                request = request.header(name, value);
            }
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, query_params), fields(exchange = %self.config.exchange_name, endpoint = %endpoint, param_count = query_params.len()))]
    async fn get_text(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<String, GlobeError> {
        self.make_request(Method::GET, endpoint, query_params, authenticated)
            .await
    }
}
