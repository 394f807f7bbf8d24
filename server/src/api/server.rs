//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use super::auth::{AuthManager, AuthState, require_auth};
use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{
    activities, auth, challenges, chat, groups, health, runs, shoes, uploads, users,
};
use crate::core::CoreApp;
use crate::core::constants::{AUTH_BODY_LIMIT, DEFAULT_BODY_LIMIT, UPLOAD_BODY_LIMIT};
use crate::core::storage::DataSubdir;

pub struct ApiServer {
    app: CoreApp,
    auth_manager: Arc<AuthManager>,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let auth_manager = app.auth.clone();
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);

        Self {
            app,
            auth_manager,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            auth_manager,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let auth_state = AuthState {
            auth_manager: auth_manager.clone(),
            allowed_origins: allowed_origins.clone(),
            database: app.database.clone(),
        };
        let authed = |router: Router<()>| {
            router.layer(axum::middleware::from_fn_with_state(
                auth_state.clone(),
                require_auth,
            ))
        };

        // Auth routes stay outside the session middleware
        let auth_routes = auth::routes(auth_manager.clone(), app.database.clone())
            .layer(DefaultBodyLimit::max(AUTH_BODY_LIMIT));

        let users_routes = authed(users::routes(app.database.clone()));
        let groups_routes = authed(groups::routes(app.database.clone()));
        let group_runs_routes = authed(runs::group_routes(app.database.clone()));
        let run_routes = authed(runs::run_routes(app.database.clone()));
        let activities_routes = authed(activities::routes(app.database.clone()));
        let shoes_routes = authed(shoes::routes(app.database.clone()));
        let challenges_routes = authed(challenges::routes(app.database.clone()));
        let group_chat_routes = authed(chat::group_routes(
            app.database.clone(),
            app.topics.clone(),
            shutdown.subscribe(),
        ));
        let message_routes = authed(chat::message_routes(
            app.database.clone(),
            app.topics.clone(),
            shutdown.subscribe(),
        ));
        let uploads_routes = authed(uploads::routes(
            Arc::new(app.storage.clone()),
            app.config.uploads.clone(),
        ))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

        // Stored uploads are served statically under /uploads
        let uploads_dir = app.storage.subdir(DataSubdir::Uploads);

        let router = Router::new()
            .route("/api/v1/health", get(health::health))
            .route("/api/openapi.json", get(openapi_json))
            .route("/api/docs", get(swagger_ui_html))
            .route("/api/docs/", get(swagger_ui_html))
            .nest("/api/v1/auth", auth_routes)
            .nest("/api/v1/users", users_routes)
            .nest("/api/v1/groups", groups_routes)
            .nest("/api/v1/groups/{group_id}/runs", group_runs_routes)
            .nest("/api/v1/groups/{group_id}/messages", group_chat_routes)
            .nest("/api/v1", run_routes)
            .nest("/api/v1/messages", message_routes)
            .nest("/api/v1/activities", activities_routes)
            .nest("/api/v1/shoes", shoes_routes)
            .nest("/api/v1/challenges", challenges_routes)
            .nest("/api/v1/uploads", uploads_routes)
            .nest_service("/uploads", ServeDir::new(uploads_dir))
            .fallback(middleware::handle_404)
            .layer(CompressionLayer::new())
            .layer(middleware::cors(&allowed_origins))
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT));

        tracing::info!(%addr, "API server listening");

        let listener = TcpListener::bind(addr).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}
