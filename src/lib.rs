//! Documentation of the AFROLUMI workbook backend.
//!
//! AFROLUMI is a guided self-reflection workbook: a participant fills out a
//! life timeline, an identity map and a gratitude letter, and can send the
//! finished document to her mentor.
//!
//!
//!
//! # General Infrastructure
//! - Participant edits live in an in-memory [`session::FormSession`]
//! - Every edit is mirrored to a file-backed [`draft::DraftStore`], so a
//!   reload resumes the draft; local persistence never touches the network
//! - An explicit send action goes through the [`gateway::SubmissionGateway`],
//!   exposed over HTTP as `POST /eixo1`
//! - The gateway reconciles the document into the remote record store
//!   (hosted Postgres behind its REST interface): look up the participant by
//!   name, create her if absent, then upsert the axis response
//!
//!
//!
//! # Notes
//!
//! ## Why upsert instead of append
//! The deployed app inserted a fresh response row on every send, so a
//! participant who clicked twice left duplicate rows for the mentor to sort
//! out. Responses are now keyed by (participant, axis): one row per
//! participant per axis, last send wins.
//!
//! ## Required configuration
//! `SUPABASE_URL` and `SUPABASE_KEY` must be present at startup; the process
//! refuses to serve without them. Port, draft directory/key and the submit
//! timeout have defaults, see [`config::Config`].
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::post,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod model;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;

use routes::eixo1_handler;
use state::State;

pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/eixo1", post(eixo1_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new();

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let router = app(state);

    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
