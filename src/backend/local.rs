use crate::service::Error as ServiceError;

/// Answers from an in-process model instead of calling out.
pub struct Backend {
    model: std::sync::Arc<dyn crate::model::TopicModel>,
}

#[derive(serde::Serialize)]
struct Response<'a> {
    result: &'a crate::model::ClassificationResult,
}

impl Backend {
    pub fn new(model: std::sync::Arc<dyn crate::model::TopicModel>) -> Self {
        Self { model }
    }
}

#[async_trait::async_trait]
impl super::Backend for Backend {
    async fn classify(&self, text: &str) -> Result<String, ServiceError> {
        let result = self.model.predict(&serde_json::Value::from(text))?;
        serde_json::to_string(&Response { result: &result }).map_err(|e| ServiceError::Unexpected(format!("encoding result: {}", e)))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
