use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use trustdocs_rag::{
    AnswerReport, CompletionProvider, DocumentPipeline, DocumentStatus, EmbeddingProvider,
    FlagDescription, Language, RiskMetadata, SummaryReply,
    ollama::OllamaProvider,
    openai::OpenAIProvider,
};
use uuid::Uuid;

use crate::{
    config::{ProviderKind, ServerConfig},
    error::ApiError,
};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DocumentPipeline>,
    /// Request body cap applied by the router.
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: DocumentPipeline, max_body_bytes: usize) -> Self {
        Self { pipeline: Arc::new(pipeline), max_body_bytes }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub text: String,
    pub language: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub document_id: Uuid,
    pub filename: Option<String>,
    pub text_length: usize,
    pub chunks: usize,
    pub language: Language,
    pub summary: SummaryReply,
    pub metadata: RiskMetadata,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: SummaryReply,
    pub metadata: RiskMetadata,
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub metadata: RiskMetadata,
    pub flags: Vec<FlagDescription>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub document_loaded: bool,
    #[serde(flatten)]
    pub document: Option<DocumentStatus>,
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route("/api/upload", post(upload))
        .route("/api/ask", post(ask))
        .route("/api/summary", get(summary))
        .route("/api/metadata", get(metadata))
        .route("/api/health", get(health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Build the pipeline with the configured provider.
pub fn build_pipeline(config: &ServerConfig) -> anyhow::Result<DocumentPipeline> {
    let rag_config = config.rag_config().context("invalid pipeline configuration")?;

    let (embedder, completer): (Arc<dyn EmbeddingProvider>, Arc<dyn CompletionProvider>) =
        match config.provider {
            ProviderKind::Ollama => {
                let provider = Arc::new(OllamaProvider::new(config.ollama_config())?);
                (
                    provider.clone() as Arc<dyn EmbeddingProvider>,
                    provider as Arc<dyn CompletionProvider>,
                )
            }
            ProviderKind::Openai => {
                let openai_config = config
                    .openai_config()
                    .context("OPENAI_API_KEY is required for the openai provider")?;
                let provider = Arc::new(OpenAIProvider::new(openai_config)?);
                (
                    provider.clone() as Arc<dyn EmbeddingProvider>,
                    provider as Arc<dyn CompletionProvider>,
                )
            }
        };

    info!(
        provider = ?config.provider,
        embedding_model = %config.embedding_model,
        completion_model = %config.completion_model,
        "providers configured"
    );

    Ok(DocumentPipeline::builder()
        .config(rag_config)
        .embedding_provider(embedder)
        .completion_provider(completer)
        .build()?)
}

pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let pipeline = build_pipeline(&config)?;
    let app = app_router(AppState::new(pipeline, config.max_upload_bytes));
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for trustdocs server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("trustdocs listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn language_or_default(code: Option<&str>) -> Language {
    code.map(Language::from_code).unwrap_or_default()
}

async fn upload(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let Json(request) = payload?;
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("No document text provided".to_string()));
    }

    let language = language_or_default(request.language.as_deref());
    let report = state.pipeline.build_index(&request.text, language).await?;
    info!(
        document.id = %report.document_id,
        filename = request.filename.as_deref().unwrap_or("-"),
        "document uploaded"
    );

    Ok(Json(UploadResponse {
        success: true,
        message: "Document uploaded and indexed successfully".to_string(),
        document_id: report.document_id,
        filename: request.filename,
        text_length: report.text_length,
        chunks: report.chunks,
        language: report.language,
        summary: report.summary,
        metadata: report.metadata,
    }))
}

async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AnswerReport>, ApiError> {
    let Json(request) = payload?;
    if request.question.trim().is_empty() {
        return Err(ApiError::BadRequest("Question is required".to_string()));
    }

    let language = language_or_default(request.language.as_deref());
    let report = state.pipeline.ask_question(&request.question, language).await?;
    Ok(Json(report))
}

async fn summary(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let language = language_or_default(query.language.as_deref());
    let report = state.pipeline.get_summary(language).await?;
    Ok(Json(SummaryResponse {
        summary: report.summary,
        metadata: report.metadata,
        language: report.language,
    }))
}

async fn metadata(State(state): State<AppState>) -> Result<Json<MetadataResponse>, ApiError> {
    let metadata = state.pipeline.get_metadata().await?;
    Ok(Json(MetadataResponse { metadata, flags: metadata.flags() }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let document = state.pipeline.status().await;
    Json(HealthResponse { status: "ok", document_loaded: document.is_some(), document })
}
