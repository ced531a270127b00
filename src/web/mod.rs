//! HTTP surface: the market-cap table, company profiles and the static
//! datatables page, rendered server-side with Tera.

pub mod error;
pub mod handlers;

use crate::config::DashboardConfig;
use crate::provider::MarketDataSource;
use crate::storage::Repository;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tera::{Context, Tera};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

pub use self::error::AppError;

/// Page templates, compiled into the binary.
const TEMPLATES: [(&str, &str); 5] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("marketcap.html", include_str!("../../templates/marketcap.html")),
    ("profile.html", include_str!("../../templates/profile.html")),
    ("datatables.html", include_str!("../../templates/datatables.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.to_vec())?;
    Ok(tera)
}

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn MarketDataSource>,
    pub repo: Arc<Repository>,
    pub templates: Arc<Tera>,
    pub dashboard: Arc<DashboardConfig>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        repo: Arc<Repository>,
        dashboard: DashboardConfig,
    ) -> Result<Self, tera::Error> {
        Ok(Self {
            source,
            repo,
            templates: Arc::new(load_templates()?),
            dashboard: Arc::new(dashboard),
        })
    }

    pub fn render(&self, template: &str, ctx: &Context) -> Result<Html<String>, AppError> {
        Ok(Html(self.templates.render(template, ctx)?))
    }

    /// Error view with the status that matches `err`.
    pub fn error_page(&self, err: AppError) -> Response {
        let status = err.status();
        if status.is_server_error() {
            error!("{}", err);
        } else {
            warn!("{}", err);
        }

        let mut ctx = Context::new();
        ctx.insert("status", &status.as_u16());
        ctx.insert("message", &err.to_string());
        match self.templates.render("error.html", &ctx) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                error!("Error page failed to render: {}", e);
                (status, err.to_string()).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::marketcap))
        .route("/marketcap/", get(handlers::marketcap))
        .route("/profile/:symbol", get(handlers::profile))
        .route("/profile/:symbol/", get(handlers::profile))
        .route("/datatables/", get(handlers::datatables))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
