use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::{self, TextCollection};
use crate::summarizer::Summarizer;

pub struct AppState {
    pub db_path: PathBuf,
    pub summarizer: Arc<dyn Summarizer>,
}

#[derive(Serialize)]
pub struct RawResponse {
    headings: Vec<String>,
    paragraphs: Vec<String>,
}

#[derive(Serialize)]
pub struct HeadingsResponse {
    headings: Vec<String>,
}

#[derive(Serialize)]
pub struct ParagraphsResponse {
    paragraphs: Vec<String>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    summary: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn service_unavailable(e: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Open a fresh read handle, query one collection and drop the handle.
/// Each request gets its own connection; there is no shared state to lock.
fn read_texts(state: &AppState, collection: TextCollection) -> Result<Vec<String>, ApiError> {
    let conn = db::connect(&state.db_path).map_err(service_unavailable)?;
    db::fetch_texts(&conn, collection).map_err(service_unavailable)
}

async fn get_raw(State(state): State<Arc<AppState>>) -> Result<Json<RawResponse>, ApiError> {
    Ok(Json(RawResponse {
        headings: read_texts(&state, TextCollection::Headings)?,
        paragraphs: read_texts(&state, TextCollection::Paragraphs)?,
    }))
}

async fn get_headings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HeadingsResponse>, ApiError> {
    Ok(Json(HeadingsResponse {
        headings: read_texts(&state, TextCollection::Headings)?,
    }))
}

async fn get_paragraphs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ParagraphsResponse>, ApiError> {
    Ok(Json(ParagraphsResponse {
        paragraphs: read_texts(&state, TextCollection::Paragraphs)?,
    }))
}

async fn get_summarized(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let paragraphs = read_texts(&state, TextCollection::Paragraphs)?;
    Ok(Json(SummaryResponse {
        summary: state.summarizer.summarize(&paragraphs),
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/data/raw", get(get_raw))
        .route("/data/summarized", get(get_summarized))
        .route("/data/paragraphs", get(get_paragraphs))
        .route("/data/headings", get(get_headings))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(port: u16, state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(Arc::new(state));

    tracing::info!("Query API listening on {}", addr);
    println!("Query API running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{Link, PageContent};
    use crate::summarizer::TruncatingSummarizer;

    fn seeded_state() -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("t.sqlite");
        let conn = db::connect(&db_path).unwrap();
        db::append(
            &conn,
            &PageContent {
                title: "t".to_string(),
                headings: vec!["H1".to_string(), "H2".to_string()],
                paragraphs: vec!["P1".to_string(), "P2".to_string()],
                images: vec![],
                links: vec![Link {
                    text: "L".to_string(),
                    href: "http://x".to_string(),
                }],
            },
        )
        .unwrap();

        let state = Arc::new(AppState {
            db_path,
            summarizer: Arc::new(TruncatingSummarizer),
        });
        (dir, state)
    }

    #[tokio::test]
    async fn raw_returns_both_collections() {
        let (_dir, state) = seeded_state();
        let Json(body) = get_raw(State(state)).await.unwrap();
        assert_eq!(body.headings, vec!["H1", "H2"]);
        assert_eq!(body.paragraphs, vec!["P1", "P2"]);
    }

    #[tokio::test]
    async fn headings_endpoint_is_idempotent() {
        let (_dir, state) = seeded_state();
        let Json(first) = get_headings(State(state.clone())).await.unwrap();
        let Json(second) = get_headings(State(state)).await.unwrap();
        assert_eq!(first.headings, second.headings);
    }

    #[tokio::test]
    async fn summarized_delegates_to_summarizer() {
        let (_dir, state) = seeded_state();
        let Json(body) = get_summarized(State(state)).await.unwrap();
        assert_eq!(body.summary, "P1 P2");
    }

    #[tokio::test]
    async fn response_bodies_serialize_to_contract_shapes() {
        let (_dir, state) = seeded_state();

        let Json(raw) = get_raw(State(state.clone())).await.unwrap();
        assert_eq!(
            serde_json::to_value(&raw).unwrap(),
            serde_json::json!({"headings": ["H1", "H2"], "paragraphs": ["P1", "P2"]})
        );

        let Json(headings) = get_headings(State(state.clone())).await.unwrap();
        assert_eq!(
            serde_json::to_value(&headings).unwrap(),
            serde_json::json!({"headings": ["H1", "H2"]})
        );

        let Json(paragraphs) = get_paragraphs(State(state.clone())).await.unwrap();
        assert_eq!(
            serde_json::to_value(&paragraphs).unwrap(),
            serde_json::json!({"paragraphs": ["P1", "P2"]})
        );

        let Json(summary) = get_summarized(State(state)).await.unwrap();
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            serde_json::json!({"summary": "P1 P2"})
        );
    }

    #[tokio::test]
    async fn empty_store_yields_empty_arrays_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState {
            db_path: dir.path().join("empty.sqlite"),
            summarizer: Arc::new(TruncatingSummarizer),
        });

        let Json(body) = get_paragraphs(State(state.clone())).await.unwrap();
        assert!(body.paragraphs.is_empty());
        let Json(body) = get_summarized(State(state)).await.unwrap();
        assert_eq!(body.summary, "");
    }
}
