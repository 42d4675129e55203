use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, StoreBackend};
use crate::database::{Document, DocumentStore, MemoryDocumentStore, PgDocumentStore, Repository, StoreError};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::models::{Contact, Holiday};

/// Per-process dependencies handed to every request. The store handle is
/// shared; repositories are built from it on demand.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Open the backend selected by `database.backend`
    pub async fn connect(config: AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn DocumentStore> = match config.database.backend {
            StoreBackend::Postgres => Arc::new(
                PgDocumentStore::connect(&config.database, &[Contact::COLLECTION, Holiday::COLLECTION]).await?,
            ),
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory document store; data is lost on restart");
                Arc::new(MemoryDocumentStore::new())
            }
        };
        Ok(Self::new(config, store))
    }

    pub fn contacts(&self) -> Repository<Contact> {
        Repository::new(Arc::clone(&self.store))
    }

    pub fn holidays(&self) -> Repository<Holiday> {
        Repository::new(Arc::clone(&self.store))
    }
}

pub fn app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected
        .merge(contact_routes(&state))
        .merge(holiday_routes(&state))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn contact_routes(state: &AppState) -> Router<AppState> {
    use protected::*;

    Router::new()
        .route(
            "/contact/:id",
            get(contact_get)
                .put(contact_put)
                .patch(contact_patch)
                .delete(contact_delete),
        )
        .route("/contact", any(contact_missing_id))
        .route("/contact/", any(contact_missing_id))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn holiday_routes(state: &AppState) -> Router<AppState> {
    use protected::*;

    Router::new()
        .route(
            "/holidays/:id",
            get(holiday_get)
                .put(holiday_put)
                .patch(holiday_patch)
                .delete(holiday_delete),
        )
        .route("/holidays", any(holiday_missing_id))
        .route("/holidays/", any(holiday_missing_id))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
