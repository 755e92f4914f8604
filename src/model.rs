/// Topic probabilities, in the model's topic order.
pub type ClassificationResult = indexmap::IndexMap<String, f64>;

#[derive(thiserror::Error, Debug, Clone)]
pub enum ModelError {
    #[error("input must be a string, got {0}")]
    InvalidInputType(&'static str),

    #[error("prediction: {0}")]
    Prediction(String),
}

pub(crate) fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

pub trait TopicModel: Send + Sync {
    /// The fixed, ordered label set every prediction is keyed by.
    fn topics(&self) -> &[String];

    fn predict_text(&self, text: &str) -> Result<ClassificationResult, ModelError>;

    /// Like `predict_text`, but for input that has not been type checked yet.
    /// Anything other than a JSON string is rejected rather than stringified.
    fn predict(&self, input: &serde_json::Value) -> Result<ClassificationResult, ModelError> {
        match input {
            serde_json::Value::String(text) => self.predict_text(text),
            other => Err(ModelError::InvalidInputType(json_type_name(other))),
        }
    }
}

pub const DEFAULT_TOPICS: [&str; 5] = ["soccer", "fashion", "food", "technology", "travel"];

/// Stand-in classifier: ignores the text and draws from a flat Dirichlet over its topics.
pub struct DummyTopicClassifier {
    topics: Vec<String>,
}

impl Default for DummyTopicClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect())
    }
}

impl DummyTopicClassifier {
    pub fn new(topics: Vec<String>) -> Self {
        Self { topics }
    }

    pub fn predict_with_rng<R: rand::Rng>(&self, _text: &str, rng: &mut R) -> ClassificationResult {
        // Dirichlet(1, ..., 1): normalized Gamma(1, 1) draws, and Gamma(1, 1) is Exp(1).
        let draws = self
            .topics
            .iter()
            .map(|_| -rng.sample::<f64, _>(rand::distr::Open01).ln())
            .collect::<Vec<_>>();
        let total = draws.iter().sum::<f64>();

        self.topics.iter().cloned().zip(draws.into_iter().map(|d| d / total)).collect()
    }
}

impl TopicModel for DummyTopicClassifier {
    fn topics(&self) -> &[String] {
        &self.topics
    }

    fn predict_text(&self, text: &str) -> Result<ClassificationResult, ModelError> {
        Ok(self.predict_with_rng(text, &mut rand::rng()))
    }
}
