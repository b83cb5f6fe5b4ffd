use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::middleware::from_fn_with_state;
use axum::response::Html;
use axum::routing::get;
use axum::{Extension, Json, Router};
use multilingual::{
    locale_redirect, localized_router, set_locale, CurrentLocale, HttpRequest, LocaleConfig,
    LocaleManager, MemoryCache, MetricsReport, RouteLocale, SwitcherEntry,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("multilingual=info".parse()?),
        )
        .init();

    let config = LocaleConfig::from_env()?;
    let cache = MemoryCache::with_capacity(config.cache.capacity);
    let manager = LocaleManager::new(config)
        .context("Invalid locale configuration")?
        .with_cache(Arc::new(cache));
    let manager = Arc::new(manager);

    info!(
        "Serving locales {:?} (default '{}', hidden {:?})",
        manager.supported_locales(),
        manager.default_locale(),
        manager.hidden_locales()
    );

    let app = app(manager);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn app(manager: Arc<LocaleManager>) -> Router {
    let pages = localized_router::<Arc<LocaleManager>, _>(&manager, None, |group| {
        Router::new()
            .route(&group.route_path("/"), get(page))
            .route(&group.route_path("/about"), get(page))
    });

    Router::new()
        .merge(pages)
        .route("/api/locales", get(locales))
        .route("/api/metrics", get(metrics))
        .layer(from_fn_with_state(manager.clone(), set_locale))
        .layer(from_fn_with_state(manager.clone(), locale_redirect))
        .layer(TraceLayer::new_for_http())
        .with_state(manager)
}

async fn page(
    State(manager): State<Arc<LocaleManager>>,
    Extension(current): Extension<CurrentLocale>,
    Extension(RouteLocale(route_locale)): Extension<RouteLocale>,
    uri: Uri,
    headers: HeaderMap,
) -> Html<String> {
    let request = HttpRequest::new(&uri, &headers);
    let links: String = manager
        .switcher(&route_locale, &request)
        .iter()
        .map(|entry| {
            format!(
                "<li><a href=\"{}\"{}>{} {}</a></li>",
                entry.url,
                if entry.is_current { " aria-current=\"page\"" } else { "" },
                entry.flag.as_deref().unwrap_or(""),
                entry.native_name
            )
        })
        .collect();

    Html(format!(
        "<!doctype html><html lang=\"{}\" dir=\"{}\"><body><h1>{}</h1><p>Detected: {}</p><ul>{}</ul></body></html>",
        route_locale,
        manager.direction(&route_locale),
        uri.path(),
        current.native_name,
        links
    ))
}

async fn locales(
    State(manager): State<Arc<LocaleManager>>,
    Extension(current): Extension<CurrentLocale>,
    uri: Uri,
    headers: HeaderMap,
) -> Json<Vec<SwitcherEntry>> {
    let request = HttpRequest::new(&uri, &headers);
    Json(manager.switcher(&current.code, &request))
}

async fn metrics(State(manager): State<Arc<LocaleManager>>) -> Json<MetricsReport> {
    Json(manager.metrics())
}
