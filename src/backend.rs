pub mod local;
pub mod remote;

/// Whatever turns validated text into a response body.
#[async_trait::async_trait]
pub trait Backend {
    async fn classify(&self, text: &str) -> Result<String, crate::service::Error>;
    fn name(&self) -> &'static str;
}

pub fn new_backend_from_config(config: &crate::config::Config) -> Result<Box<dyn Backend + Send + Sync>, anyhow::Error> {
    Ok(match config.backend {
        crate::config::BackendKind::Remote => Box::new(remote::Backend::new(crate::config::env_then(config.downstream.clone()), config.timeout())),
        crate::config::BackendKind::Local => {
            if config.downstream.endpoint_url.is_some() || config.downstream.key.is_some() {
                log::warn!("[downstream] settings are ignored by the local backend");
            }
            Box::new(local::Backend::new(std::sync::Arc::new(crate::model::DummyTopicClassifier::default())))
        }
    })
}
