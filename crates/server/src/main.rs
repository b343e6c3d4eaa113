//! Niyati server entry point.
//!
//! Wires the configured backends into the orchestrator, registers the
//! Telegram webhook, and serves HTTP + WebSocket until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use niyati_agent::Orchestrator;
use niyati_config::{load_settings, Settings};
use niyati_core::{ChatModel, MemoryStore, SpeechSynthesizer};
use niyati_llm::{GeminiChat, GeminiConfig};
use niyati_memory::{InMemoryStore, SupabaseStore};
use niyati_server::{create_router, AppState, SessionManager, TelegramGateway};
use niyati_tts::{ElevenLabsBackend, ElevenLabsConfig, TtsBackend, VoiceSynth};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing is not up yet; config failures go to stderr.
    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&settings);
    tracing::info!("Starting Niyati v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&settings);
    let chat = build_chat(&settings);
    let speech = build_speech(&settings);

    let orchestrator = Arc::new(
        Orchestrator::new(chat, speech.clone(), store.clone())
            .with_llm_timeout(Duration::from_secs(settings.gemini.timeout_seconds))
            .with_tts_timeout(Duration::from_secs(settings.elevenlabs.timeout_seconds)),
    );

    let sessions = Arc::new(
        SessionManager::new(
            store.clone(),
            Duration::from_secs(settings.session.timeout_seconds),
            Duration::from_secs(settings.session.cleanup_interval_seconds),
        )
        .with_speech(speech.clone()),
    );
    let cleanup_shutdown = sessions.start_cleanup_task();

    let gateway = match TelegramGateway::new(settings.telegram.bot_token.clone()) {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize Telegram gateway");
            std::process::exit(1);
        }
    };

    if settings.telegram.webhook_url.is_empty() {
        tracing::info!("WEBHOOK_URL not set, skipping webhook registration");
    } else {
        match gateway.set_webhook(&settings.telegram.webhook_url).await {
            Ok(()) => tracing::info!(
                url = %settings.telegram.webhook_url,
                "Telegram webhook registered"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                "webhook registration failed, updates may not arrive"
            ),
        }
    }

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = AppState::new(Arc::new(settings), store, orchestrator, sessions, gateway);
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = cleanup_shutdown.send(true);
    tracing::info!("Server shutdown complete");
    Ok(())
}

fn build_store(settings: &Settings) -> Arc<dyn MemoryStore> {
    if settings.supabase.is_configured() {
        match SupabaseStore::new(&settings.supabase.url, &settings.supabase.key) {
            Ok(store) => {
                tracing::info!(url = %settings.supabase.url, "using Supabase memory store");
                return Arc::new(store);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize Supabase store");
                std::process::exit(1);
            }
        }
    }

    tracing::warn!("SUPABASE_URL/SUPABASE_KEY not set, memories will not survive a restart");
    Arc::new(InMemoryStore::new())
}

fn build_chat(settings: &Settings) -> Arc<dyn ChatModel> {
    let config = GeminiConfig {
        api_key: settings.gemini.api_key.clone(),
        model: settings.gemini.model.clone(),
        timeout: Duration::from_secs(settings.gemini.timeout_seconds),
        ..GeminiConfig::default()
    };

    match GeminiChat::new(config) {
        Ok(chat) => {
            tracing::info!(model = %settings.gemini.model, "chat backend ready");
            Arc::new(chat)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize chat backend");
            std::process::exit(1);
        }
    }
}

fn build_speech(settings: &Settings) -> Arc<dyn SpeechSynthesizer> {
    let config = ElevenLabsConfig {
        api_key: settings.elevenlabs.api_key.clone(),
        voice_id: settings.elevenlabs.voice_id.clone(),
        model_id: settings.elevenlabs.model_id.clone(),
        timeout: Duration::from_secs(settings.elevenlabs.timeout_seconds),
        ..ElevenLabsConfig::default()
    };

    let backend: Arc<dyn TtsBackend> = match ElevenLabsBackend::new(config) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize speech backend");
            std::process::exit(1);
        }
    };

    match VoiceSynth::new(backend, &settings.storage.audio_dir) {
        Ok(synth) => {
            tracing::info!(dir = %settings.storage.audio_dir, "voice synthesis ready");
            Arc::new(synth)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to prepare audio cache directory");
            std::process::exit(1);
        }
    }
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("niyati={},tower_http=info", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
