//! Translate Pipeline Web - interactive front-end for manual translations.

mod helpers;
mod routes;
mod session;
mod state;
mod submit;
mod templates;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use translate_pipeline_core::{
    create_translator, AppConfig, FsObjectStore, MemoryObjectStore, ObjectStore, TranslatorConfig,
};

use state::{AppState, SESSION_MAX_AGE};
use submit::Submitter;

/// Upload ceiling for the input form.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Resolve the static files directory.
///
/// Priority:
/// 1. Explicit path if provided
/// 2. ./static if it exists
/// 3. Crate's built-in static directory
fn resolve_static_dir(explicit_path: Option<&str>) -> PathBuf {
    if let Some(path) = explicit_path {
        return PathBuf::from(path);
    }

    let local_static = PathBuf::from("static");
    if local_static.is_dir() {
        return local_static;
    }

    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

#[derive(Parser, Debug)]
#[command(name = "translate-pipeline-web")]
#[command(author, version, about = "Translate Pipeline Web Front-End", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage root directory (overrides config)
    #[arg(long, env = "STORAGE_ROOT")]
    storage_root: Option<PathBuf>,

    /// Keep stored objects in memory instead of on disk
    #[arg(long)]
    memory_store: bool,

    /// OpenAI API base URL (overrides config)
    #[arg(long, env = "OPENAI_API_BASE")]
    api_base: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model name for OpenAI-compatible API (overrides config)
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// Region identifier of the deployment, shown in logs
    #[arg(long, env = "TRANSLATE_REGION", default_value = "local")]
    region: String,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Static files directory (defaults to ./static or crate's static dir)
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<String>,
}

impl Args {
    /// Load config file (or defaults) and apply command-line overrides.
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = if let Some(path) = &self.config {
            AppConfig::from_file(path).context("Failed to load config file")?
        } else {
            AppConfig::load()
        };

        if let Some(root) = &self.storage_root {
            config.storage.root.clone_from(root);
        }

        let translator = &config.translator;
        config.translator = TranslatorConfig {
            api_base: self.api_base.clone().unwrap_or_else(|| translator.api_base.clone()),
            api_key: self.api_key.clone().or_else(|| translator.api_key.clone()),
            model: self.model.clone().unwrap_or_else(|| translator.model.clone()),
            ..translator.clone()
        };

        Ok(config)
    }
}

/// Assemble the router around shared state.
fn build_router(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    Router::new()
        // Pages
        .route("/", get(routes::index))
        .route("/session/{session_id}", get(routes::session_page))
        // Form submissions (POST-Redirect-GET)
        .route("/api/translate/{session_id}", post(routes::translate))
        .route("/api/reset/{session_id}", post(routes::reset_session))
        // Static files with Cache-Control: no-cache (cache but always revalidate via ETag)
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-cache"),
                ))
                .service(ServeDir::new(static_dir)),
        )
        // Session pages change on every submit; never serve them from cache
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        ))
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let config = args.load_config()?;

    let store: Arc<dyn ObjectStore> = if args.memory_store {
        Arc::new(MemoryObjectStore::new())
    } else {
        Arc::new(FsObjectStore::new(config.storage.root.clone()))
    };
    let translator =
        create_translator(&config.translator).context("Failed to initialize translator")?;

    info!(
        "Region {}, storage {} ({} -> {}), translator {} ({})",
        args.region,
        store.scheme(),
        config.storage.input_location,
        config.storage.output_location,
        translator.name(),
        config.translator.model
    );

    let submitter = Submitter::new(store, translator, &config.storage);
    let state = Arc::new(AppState::new(submitter, config));

    // Spawn background task for session cleanup (runs every 5 minutes)
    let cleanup_state = Arc::clone(&state);
    tokio::spawn(async move {
        let cleanup_interval = Duration::from_secs(5 * 60);
        loop {
            tokio::time::sleep(cleanup_interval).await;
            let removed = cleanup_state.cleanup_old_sessions(SESSION_MAX_AGE).await;
            debug!(
                "Session cleanup removed {}, {} active",
                removed,
                cleanup_state.session_count().await
            );
        }
    });

    let app = build_router(state, resolve_static_dir(args.static_dir.as_deref()));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use clap::CommandFactory;
    use tower::ServiceExt;
    use translate_pipeline_core::{
        Lang, Result as CoreResult, StorageConfig, Translation, Translator, TranslatorInfo,
    };

    const BOUNDARY: &str = "XBOUNDARYX";

    struct UpperTranslator;

    #[async_trait]
    impl Translator for UpperTranslator {
        fn info(&self) -> TranslatorInfo {
            TranslatorInfo {
                name: "upper",
            }
        }

        async fn translate(
            &self,
            text: &str,
            _source: &Lang,
            _target: &Lang,
        ) -> CoreResult<Translation> {
            Ok(Translation {
                text: text.to_uppercase(),
                source_lang: Lang::new("en"),
            })
        }
    }

    fn test_app() -> (Arc<AppState>, Arc<MemoryObjectStore>, Router) {
        let store = Arc::new(MemoryObjectStore::new());
        let config = AppConfig::default();
        let submitter = Submitter::new(store.clone(), Arc::new(UpperTranslator), &StorageConfig::default());
        let state = Arc::new(AppState::new(submitter, config));
        let router = build_router(Arc::clone(&state), resolve_static_dir(None));
        (state, store, router)
    }

    fn multipart_body(text: &str, target: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\n{text}\r\n\
             --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"target_lang\"\r\n\r\n{target}\r\n\
             --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\r\n\
             --{BOUNDARY}--\r\n"
        )
    }

    fn post_form(uri: &str, body: String, htmx: bool) -> Request<Body> {
        let mut builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if htmx {
            builder = builder.header("HX-Request", "true");
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn page(router: &Router, uri: &str) -> String {
        let response = router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn new_session(router: &Router) -> String {
        let response = router
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[tokio::test]
    async fn test_index_creates_session() {
        let (state, _store, router) = test_app();
        let url = new_session(&router).await;
        assert!(url.starts_with("/session/"));
        assert_eq!(state.session_count().await, 1);

        let html = page(&router, &url).await;
        assert!(html.contains("Translate"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (_state, _store, router) = test_app();
        let response = router
            .oneshot(Request::get("/session/not-a-uuid").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_submit_warns_without_writes() {
        let (_state, store, router) = test_app();
        let url = new_session(&router).await;
        let id = url.trim_start_matches("/session/");

        let response = router
            .clone()
            .oneshot(post_form(&format!("/api/translate/{id}"), multipart_body("", "es"), false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(store.put_count(), 0);

        let html = page(&router, &url).await;
        assert!(html.contains("Please enter text or upload a file!"));
        // Shown once
        let html = page(&router, &url).await;
        assert!(!html.contains("Please enter text or upload a file!"));
    }

    #[tokio::test]
    async fn test_submit_then_reset() {
        let (_state, store, router) = test_app();
        let url = new_session(&router).await;
        let id = url.trim_start_matches("/session/");

        let response = router
            .clone()
            .oneshot(post_form(&format!("/api/translate/{id}"), multipart_body("hello there", "fr"), true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Redirect"], url.as_str());
        // Archived input plus persisted result
        assert_eq!(store.put_count(), 2);

        let html = page(&router, &url).await;
        assert!(html.contains("HELLO THERE"));
        assert!(html.contains("New Translation"));

        // A second submit while the result is shown changes nothing
        router
            .clone()
            .oneshot(post_form(&format!("/api/translate/{id}"), multipart_body("again", "fr"), false))
            .await
            .unwrap();
        assert_eq!(store.put_count(), 2);

        let response = router
            .clone()
            .oneshot(
                Request::post(format!("/api/reset/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let html = page(&router, &url).await;
        assert!(html.contains(&format!("/api/translate/{id}")));
        // History survives the reset
        assert!(html.contains("HELLO THERE"));
    }

    #[tokio::test]
    async fn test_unsupported_target_is_rejected() {
        let (_state, store, router) = test_app();
        let url = new_session(&router).await;
        let id = url.trim_start_matches("/session/");

        let response = router
            .oneshot(post_form(&format!("/api/translate/{id}"), multipart_body("hi", "xx"), false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.put_count(), 0);
    }
}
