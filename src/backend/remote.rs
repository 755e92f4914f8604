use crate::service::Error as ServiceError;

pub struct Client {
    client: reqwest::Client,
    endpoint_url: String,
    key: String,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Reqwest(#[from] reqwest::Error),

    // The body goes to the log only, never into the error message.
    #[error("{0}")]
    ReqwestWithBody(reqwest::Error, String),

    #[error("credential is not a valid header value")]
    InvalidCredential,
}

#[derive(serde::Serialize)]
struct Request<'a> {
    text: &'a str,
}

impl Client {
    pub fn new(config: &crate::config::DownstreamConfig, timeout: std::time::Duration) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::CONTENT_TYPE, reqwest::header::HeaderValue::from_static("application/json"));
        headers.insert(reqwest::header::AUTHORIZATION, {
            let mut v = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.key)).map_err(|_| Error::InvalidCredential)?;
            v.set_sensitive(true);
            v
        });
        Ok(Self {
            client: reqwest::ClientBuilder::new().default_headers(headers).timeout(timeout).build()?,
            endpoint_url: config.endpoint_url.clone(),
            key: config.key.clone(),
        })
    }

    pub async fn classify(&self, text: &str) -> Result<String, Error> {
        let resp = self
            .client
            .post(&self.endpoint_url)
            .json(&Request { text })
            .send()
            .await
            .map_err(|e| e.without_url())?;

        if let Err(e) = resp.error_for_status_ref() {
            let body = resp.text().await.map_err(|e| e.without_url())?;
            return Err(Error::ReqwestWithBody(e.without_url(), body));
        }

        Ok(resp.text().await.map_err(|e| e.without_url())?)
    }

    /// Blanks out the credential wherever it appears in `s`.
    pub fn redact(&self, s: &str) -> String {
        s.replace(&self.key, "<redacted>")
    }
}

/// Forwards to the model endpoint named by `MODEL_ENDPOINT_URL`, authenticating with `MODEL_KEY`.
///
/// Nothing is looked up until the first request. A successful lookup is kept for
/// the life of the process; a failed one is tried again on the next request.
pub struct Backend {
    lookup: crate::config::Lookup,
    timeout: std::time::Duration,
    client: once_cell::sync::OnceCell<Client>,
}

impl Backend {
    pub fn new(lookup: crate::config::Lookup, timeout: std::time::Duration) -> Self {
        Self {
            lookup,
            timeout,
            client: once_cell::sync::OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&Client, ServiceError> {
        self.client.get_or_try_init(|| {
            let config = crate::config::DownstreamConfig::resolve(&*self.lookup)?;
            log::info!("model endpoint resolved: {:?}", config);
            Client::new(&config, self.timeout).map_err(|e| ServiceError::Unexpected(format!("building model client: {}", e)))
        })
    }
}

#[async_trait::async_trait]
impl super::Backend for Backend {
    async fn classify(&self, text: &str) -> Result<String, ServiceError> {
        let client = self.client()?;
        log::debug!("model request: {} bytes of text", text.len());

        client.classify(text).await.map_err(|e| {
            log::error!("error calling model endpoint: {}", client.redact(&format!("{:?}", e)));
            ServiceError::Upstream(client.redact(&e.to_string()))
        })
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
