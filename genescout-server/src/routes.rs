//! HTTP routes exposing a [`GeneFinder`].
//!
//! * `GET /health` - 200 while the process is up
//! * `GET /genes/find/{gene}`
//!   * 200 - found sequence
//!   * 404 - sequence wasn't found
//!   * 400 - input validation errors, body is the validation message
//!   * 500 - internal server error

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use genescout::GeneFinder;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Shared state handed to every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Finder over the DNA file, opened once at startup
    finder: Arc<GeneFinder>,
}

impl AppState {
    pub fn new(finder: Arc<GeneFinder>) -> Self {
        Self { finder }
    }

    pub fn finder(&self) -> &Arc<GeneFinder> {
        &self.finder
    }
}

/// Create the router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/genes/find/{gene}", get(find_gene))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle GET /health
pub async fn health() -> Response {
    status(StatusCode::OK)
}

/// Handle GET /genes/find/{gene}
///
/// The search blocks on file reads, so it runs on the blocking pool rather
/// than on the async workers.
pub async fn find_gene(
    Path(gene): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    debug!("Handling find request for {} byte gene", gene.len());

    let finder = Arc::clone(state.finder());

    match tokio::task::spawn_blocking(move || finder.find(&gene)).await {
        Ok(Ok(true)) => status(StatusCode::OK),
        Ok(Ok(false)) => status(StatusCode::NOT_FOUND),
        Ok(Err(e)) if e.is_validation() => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        Ok(Err(e)) => {
            error!("Gene search failed: {}", e);
            status(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(e) => {
            error!("Gene search task failed: {}", e);
            status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// A response whose body is the canonical reason phrase of `code`
fn status(code: StatusCode) -> Response {
    (code, code.canonical_reason().unwrap_or_default()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use genescout::FinderOptions;
    use std::io::Write;
    use std::num::NonZeroUsize;
    use tempfile::NamedTempFile;

    const GENE: &str = "AAAAAAAAAAAGCT";

    fn options() -> FinderOptions {
        FinderOptions {
            buffer_size: 32,
            max_idle_buffers: 2,
            thread_count: NonZeroUsize::new(2).unwrap(),
        }
    }

    fn test_state() -> (NamedTempFile, Arc<AppState>) {
        let mut contents = b"CGTTGCATCG".repeat(5);
        contents[20..34].copy_from_slice(GENE.as_bytes());

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&contents).unwrap();
        file.flush().unwrap();

        let finder = GeneFinder::open_with_options(file.path(), options()).unwrap();
        (file, Arc::new(AppState::new(Arc::new(finder))))
    }

    async fn request(state: &Arc<AppState>, gene: &str) -> (StatusCode, String) {
        let response = find_gene(Path(gene.to_string()), State(state.clone())).await;
        let code = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (code, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = health().await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_found() {
        let (_file, state) = test_state();
        assert_eq!(request(&state, GENE).await, (StatusCode::OK, "OK".to_string()));
    }

    #[tokio::test]
    async fn test_not_found() {
        let (_file, state) = test_state();
        let (code, body) = request(&state, "AAAAAAAAAAATTTT").await;
        assert_eq!(code, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not Found");
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let (_file, state) = test_state();

        let (code, body) = request(&state, "GCTAAAAAAAAAAA").await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body, "missing gene prefix: AAAAAAAAAAA");

        let (code, body) = request(&state, "AAAAAAAAAAAXYZ").await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body, "invalid gene template");

        let long = format!("AAAAAAAAAAA{}", "G".repeat(40));
        let (code, body) = request(&state, &long).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body, "gene sequence larger than file");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_failure_is_internal_error() {
        // A directory opens fine and has a length, but every read fails
        let dir = tempfile::tempdir().unwrap();
        for i in 0..4 {
            std::fs::write(dir.path().join(format!("chromosome_{:02}.dna", i)), b"ACGT").unwrap();
        }
        let finder =
            GeneFinder::with_options(std::fs::File::open(dir.path()).unwrap(), options()).unwrap();
        let state = Arc::new(AppState::new(Arc::new(finder)));

        let (code, body) = request(&state, "AAAAAAAAAAA").await;
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal Server Error");
    }

    #[tokio::test]
    async fn test_router_serves_requests() {
        let (_file, state) = test_state();
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let status_line = |path: &str| {
            let path = path.to_string();
            async move {
                use tokio::io::{AsyncReadExt, AsyncWriteExt};
                let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
                let request = format!(
                    "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
                    path
                );
                stream.write_all(request.as_bytes()).await.unwrap();
                let mut response = String::new();
                stream.read_to_string(&mut response).await.unwrap();
                response.lines().next().unwrap_or_default().to_string()
            }
        };

        assert_eq!(status_line("/health").await, "HTTP/1.1 200 OK");
        assert_eq!(
            status_line(&format!("/genes/find/{}", GENE)).await,
            "HTTP/1.1 200 OK"
        );
        assert_eq!(
            status_line("/genes/find/AAAAAAAAAAATTTT").await,
            "HTTP/1.1 404 Not Found"
        );
        assert_eq!(
            status_line("/genes/find/AAAAAAAAAAAXYZ").await,
            "HTTP/1.1 400 Bad Request"
        );
    }
}
