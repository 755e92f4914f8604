use axum::response::IntoResponse;

type SharedService = std::sync::Arc<crate::service::ClassificationService>;

impl IntoResponse for crate::service::ServiceOutcome {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status_code).unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = if self.is_success() { "application/json" } else { "text/plain; charset=utf-8" };
        (status, [(axum::http::header::CONTENT_TYPE, content_type)], self.body).into_response()
    }
}

async fn classify_post(
    axum::extract::State(service): axum::extract::State<SharedService>,
    body: Result<axum::body::Bytes, axum::extract::rejection::BytesRejection>,
) -> crate::service::ServiceOutcome {
    match body {
        Ok(body) => service.handle(&body).await,
        Err(e) => {
            log::warn!("request body rejected ({}): {}", e.status(), e.body_text());
            crate::service::ServiceOutcome {
                body: if e.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
                    "Request body too large".to_string()
                } else {
                    "Failed to read request body".to_string()
                },
                status_code: e.status().as_u16(),
            }
        }
    }
}

async fn health(axum::extract::State(service): axum::extract::State<SharedService>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": service.backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub fn router(service: SharedService, max_body_bytes: usize) -> axum::Router {
    axum::Router::new()
        .route("/api/classify_post", axum::routing::post(classify_post))
        .route("/health", axum::routing::get(health))
        .layer(axum::extract::DefaultBodyLimit::max(max_body_bytes))
        .with_state(service)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("error waiting for ctrl-c: {:?}", e);
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}

pub async fn serve(listen: std::net::SocketAddr, max_body_bytes: usize, service: SharedService) -> Result<(), anyhow::Error> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("listening on {} ({} backend, bodies up to {} bytes)", listener.local_addr()?, service.backend_name(), max_body_bytes);

    axum::serve(listener, router(service, max_body_bytes)).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
