//! clinic-assist server binary.
//!
//! Loads configuration, wires the model provider and clinic collaborators
//! into the assistant and prompt flows, and serves the HTTP surface until
//! Ctrl+C or SIGTERM.

use std::sync::Arc;

use axum::Router;
use http::HeaderValue;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use clinic_assist::adapters::ai::{AnthropicConfig, AnthropicProvider, OpenAIConfig, OpenAIProvider};
use clinic_assist::adapters::clinic_api::{ClinicApiClient, ClinicApiClientConfig};
use clinic_assist::adapters::clock::SystemClock;
use clinic_assist::adapters::http::{app_router, AssistantAppState, FlowsAppState};
use clinic_assist::adapters::memory::InMemoryClinic;
use clinic_assist::application::{
    AskAdministratorHandler, AskPatientHandler, AssistantOrchestrator, Collaborators,
    PersonalizeReminderHandler, SuggestResponsesHandler, SummarizeAppointmentHandler,
    ToolDispatcher, TurnLimits,
};
use clinic_assist::config::{AiProvider, AppConfig, ConfigError, ValidationError};
use clinic_assist::domain::assistant::tools::{clinic_registry, RegistryError};
use clinic_assist::domain::assistant::{Persona, PersonaError};
use clinic_assist::ports::{AIProvider, Clock, CollaboratorError};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("tool registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("persona: {0}")]
    Persona(#[from] PersonaError),

    #[error("clinic backend: {0}")]
    Clinic(#[from] CollaboratorError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(error = %err, "clinic-assist failed to start");
        eprintln!("clinic-assist: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        provider = ?config.ai.primary_provider,
        in_memory_clinic = config.clinic_api.use_in_memory,
        "Starting clinic-assist"
    );

    let registry = Arc::new(clinic_registry()?);
    let administrator = Arc::new(Persona::administrator());
    let patient = Arc::new(Persona::patient());
    administrator.validate(&registry)?;
    patient.validate(&registry)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let provider = build_provider(&config);
    let collaborators = build_collaborators(&config, clock.clone())?;

    let dispatcher = Arc::new(ToolDispatcher::new(registry.clone(), collaborators));
    let orchestrator = Arc::new(
        AssistantOrchestrator::new(
            provider.clone(),
            dispatcher,
            clock,
            config.assistant.clinic_name.clone(),
        )
        .with_limits(TurnLimits::from(&config.assistant)),
    );

    let assistant = AssistantAppState {
        administrator: Arc::new(AskAdministratorHandler::new(
            orchestrator.clone(),
            administrator.clone(),
        )),
        patient: Arc::new(AskPatientHandler::new(orchestrator, patient.clone())),
        registry,
        administrator_persona: administrator,
        patient_persona: patient,
    };
    let flows = FlowsAppState {
        summarize: Arc::new(SummarizeAppointmentHandler::new(provider.clone())),
        reminder: Arc::new(PersonalizeReminderHandler::new(provider.clone())),
        suggestions: Arc::new(SuggestResponsesHandler::new(provider)),
    };

    let app = with_middleware(app_router(assistant, flows), &config);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", config.server.log_level)));

    let fmt_layer = if config.is_production() {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn build_provider(config: &AppConfig) -> Arc<dyn AIProvider> {
    let ai = &config.ai;
    let key = ai.primary_key().unwrap_or_default();
    match ai.primary_provider {
        AiProvider::OpenAI => {
            let mut settings = OpenAIConfig::new(key)
                .with_model(ai.primary_model())
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            if let Some(url) = &ai.base_url {
                settings = settings.with_base_url(url.as_str());
            }
            Arc::new(OpenAIProvider::new(settings))
        }
        AiProvider::Anthropic => {
            let mut settings = AnthropicConfig::new(key)
                .with_model(ai.primary_model())
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            if let Some(url) = &ai.base_url {
                settings = settings.with_base_url(url.as_str());
            }
            Arc::new(AnthropicProvider::new(settings))
        }
    }
}

fn build_collaborators(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<Collaborators, StartupError> {
    if config.clinic_api.use_in_memory {
        tracing::warn!("Using the seeded in-memory clinic; changes are lost on restart");
        return Ok(Collaborators::single(Arc::new(InMemoryClinic::seeded(clock))));
    }

    let base_url = config
        .clinic_api
        .normalized_base_url()
        .ok_or(ValidationError::MissingRequired("CLINIC_API__BASE_URL"))?;
    let client = ClinicApiClient::new(
        ClinicApiClientConfig::new(base_url).with_timeout(config.clinic_api.timeout()),
    )?;
    Ok(Collaborators::single(Arc::new(client)))
}

fn with_middleware(router: Router, config: &AppConfig) -> Router {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(cors)
            .layer(TimeoutLayer::new(config.server.request_timeout())),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
