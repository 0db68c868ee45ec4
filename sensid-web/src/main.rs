//! Servidor web Axum com WebSocket para o reconhecimento de identificadores sensíveis

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use sensid_core::{corpus::demo_texts, Annotation, EntityType, RecognitionEvent, Registry, RegistryConfig};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Estado compartilhado da aplicação
struct AppState {
    registry: Registry,
}

#[derive(Deserialize)]
struct RecognizeRequest {
    text: String,
    #[serde(default)]
    entity_types: Option<Vec<EntityType>>,
}

#[derive(Serialize)]
struct RecognizeResponse {
    annotations: Vec<Annotation>,
    processing_ms: u64,
    total: usize,
}

#[derive(Serialize)]
struct EntityTypeInfo {
    name: &'static str,
    color: &'static str,
    icon: &'static str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let registry = match std::env::var("SENSID_CONFIG") {
        Ok(path) => {
            info!("Carregando configuração de {path}");
            let config = RegistryConfig::load(&path).with_context(|| format!("lendo {path}"))?;
            Registry::from_config(&config)?
        }
        Err(_) => Registry::builtin()?,
    };
    let state = Arc::new(AppState { registry });

    let addr = std::env::var("SENSID_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind em {addr}"))?;
    info!("🚀 Servidor sensid iniciado em http://{addr}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/recognize", post(recognize_handler))
        .route("/entity-types", get(entity_types_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Reconhecimento via HTTP POST (sem streaming)
async fn recognize_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecognizeRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    let start = Instant::now();
    let annotations = state
        .registry
        .recognize(&req.text, req.entity_types.as_deref());
    let total = annotations.len();

    Json(RecognizeResponse {
        annotations,
        processing_ms: start.elapsed().as_millis() as u64,
        total,
    })
    .into_response()
}

/// Tipos registrados com cor e ícone para a UI
async fn entity_types_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let types: Vec<EntityTypeInfo> = state
        .registry
        .entity_types()
        .map(|e| EntityTypeInfo {
            name: e.name(),
            color: e.color(),
            icon: e.icon(),
        })
        .collect();
    Json(types)
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe texto, executa o reconhecimento e envia os eventos
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let Some(events) = recognition_events(Arc::clone(&state), &text).await else {
                    continue;
                };
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

/// Executa o reconhecimento de uma mensagem do WebSocket e coleta os eventos.
///
/// Aceita JSON `{text, entity_types}` ou texto puro; mensagem vazia devolve `None`.
async fn recognition_events(state: Arc<AppState>, message: &str) -> Option<Vec<RecognitionEvent>> {
    let (text, entity_types) = match serde_json::from_str::<RecognizeRequest>(message) {
        Ok(req) => (req.text.trim().to_string(), req.entity_types),
        Err(_) => (message.trim().to_string(), None),
    };
    if text.is_empty() {
        return None;
    }

    info!("Reconhecendo via WebSocket: {} chars", text.len());

    let (tx, rx) = std::sync::mpsc::channel::<RecognitionEvent>();

    // O reconhecimento é síncrono e usa Rayon: fora do runtime async
    let handle = tokio::task::spawn_blocking(move || {
        let today = chrono::Local::now().date_naive();
        state
            .registry
            .recognize_streaming(&text, entity_types.as_deref(), today, tx);
    });
    handle.await.ok();

    Some(rx.try_iter().collect())
}
