/// Everything that can go wrong with one classification request.
///
/// `Display` is for logs. The caller only ever sees `message`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("missing or empty text")]
    MissingText,

    #[error("input must be a string, got {0}")]
    InvalidInputType(&'static str),

    #[error("configuration: {0}")]
    ConfigurationMissing(#[from] crate::config::ConfigError),

    #[error("upstream: {0}")]
    Upstream(String),

    #[error("unexpected: {0}")]
    Unexpected(String),
}

impl From<crate::model::ModelError> for Error {
    fn from(e: crate::model::ModelError) -> Self {
        match e {
            crate::model::ModelError::InvalidInputType(t) => Error::InvalidInputType(t),
            crate::model::ModelError::Prediction(m) => Error::Unexpected(format!("prediction: {}", m)),
        }
    }
}

impl Error {
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MalformedRequest(..) | Error::MissingText | Error::InvalidInputType(..) => 400,
            Error::ConfigurationMissing(..) | Error::Upstream(..) | Error::Unexpected(..) => 500,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Error::MalformedRequest(..) => "Invalid JSON in request body".to_string(),
            Error::MissingText => "Please pass a non-empty 'text' property in the request body".to_string(),
            Error::InvalidInputType(..) => "Input must be a string".to_string(),
            Error::ConfigurationMissing(e) => format!("Model endpoint is not configured: {}", e),
            Error::Upstream(detail) => format!("Error processing request: {}", detail),
            Error::Unexpected(..) => "Internal server error".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServiceOutcome {
    pub body: String,
    pub status_code: u16,
}

impl ServiceOutcome {
    pub fn ok(body: String) -> Self {
        Self { body, status_code: 200 }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl From<Error> for ServiceOutcome {
    fn from(e: Error) -> Self {
        Self {
            body: e.message(),
            status_code: e.status_code(),
        }
    }
}

fn parse_text(raw_body: &[u8]) -> Result<String, Error> {
    let value = serde_json::from_slice::<serde_json::Value>(raw_body).map_err(|e| Error::MalformedRequest(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::MalformedRequest(format!("expected an object, got {}", crate::model::json_type_name(&value))))?;

    match object.get("text") {
        None | Some(serde_json::Value::Null) => Err(Error::MissingText),
        Some(serde_json::Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(Error::InvalidInputType(crate::model::json_type_name(other))),
    }
}

pub struct ClassificationService {
    backend: Box<dyn crate::backend::Backend + Send + Sync>,
}

impl ClassificationService {
    pub fn new(backend: Box<dyn crate::backend::Backend + Send + Sync>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Runs one request body through validation and the backend. Always produces an outcome.
    pub async fn handle(&self, raw_body: &[u8]) -> ServiceOutcome {
        match parse_text(raw_body) {
            Ok(text) => self.classify(&text).await,
            Err(e) => self.fail(e),
        }
    }

    pub async fn classify(&self, text: &str) -> ServiceOutcome {
        if text.is_empty() {
            return self.fail(Error::MissingText);
        }

        log::info!("classifying {} chars via {} backend", text.chars().count(), self.backend.name());
        match self.backend.classify(text).await {
            Ok(body) => ServiceOutcome::ok(body),
            Err(e) => self.fail(e),
        }
    }

    fn fail(&self, e: Error) -> ServiceOutcome {
        if e.status_code() >= 500 {
            log::error!("request failed ({}): {}", e.status_code(), e);
        } else {
            log::warn!("request rejected ({}): {}", e.status_code(), e);
        }
        ServiceOutcome::from(e)
    }
}
