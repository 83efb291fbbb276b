use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use volunteer_hub::auth::AuthConfig;
use volunteer_hub::config::{LoggingSettings, Settings, StoreBackend};
use volunteer_hub::core::Matcher;
use volunteer_hub::error::{handle_json_payload_error, handle_query_payload_error};
use volunteer_hub::routes::{self, AppState};
use volunteer_hub::services::{AuthGateway, CacheManager, DataStore, MemoryStore, SupabaseClient};

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // VOLHUB_CONFIG points at an explicit config file instead of config/
    let loaded = match std::env::var("VOLHUB_CONFIG") {
        Ok(path) => Settings::load_from(path),
        Err(_) => Settings::load(),
    };

    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging);
    info!("Starting volunteer hub service...");

    let (store, auth): (Arc<dyn DataStore>, Arc<dyn AuthGateway>) = match settings.store.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            let memory = Arc::new(MemoryStore::new());
            let store: Arc<dyn DataStore> = memory.clone();
            let auth: Arc<dyn AuthGateway> = memory;
            (store, auth)
        }
        StoreBackend::Supabase => {
            let supabase = &settings.supabase;
            if supabase.url.is_empty() || supabase.anon_key.is_empty() {
                error!("Supabase URL and anon key are required for the supabase store");
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "missing Supabase configuration",
                ));
            }

            let timeout = supabase.timeout_secs.unwrap_or(10);

            // Data access may use the service-role key; auth calls always use the anon key
            let data = SupabaseClient::new(
                supabase.url.clone(),
                supabase.data_key().to_string(),
                settings.tables.clone().into(),
                timeout,
            )
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            let gateway = SupabaseClient::new(
                supabase.url.clone(),
                supabase.anon_key.clone(),
                settings.tables.clone().into(),
                timeout,
            )
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

            info!("Supabase client initialized for {}", supabase.url);
            let store: Arc<dyn DataStore> = Arc::new(data);
            let auth: Arc<dyn AuthGateway> = Arc::new(gateway);
            (store, auth)
        }
    };

    // Redis is optional; fall back to the in-process cache
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match settings.cache.redis_url.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => match CacheManager::new(url, l1_cache_size, cache_ttl).await {
            Ok(cache) => {
                info!("Cache manager initialized with Redis (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                cache
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running with L1 cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("Cache manager initialized (L1 only: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            CacheManager::in_memory(l1_cache_size, cache_ttl)
        }
    };

    let matcher = Matcher::new(
        settings.matching.weights(),
        settings.matching.min_score,
        settings.matching.max_results,
    );

    info!(
        "Matcher initialized with weights: {:?}, min score: {}, max results: {}",
        matcher.weights(),
        settings.matching.min_score,
        settings.matching.max_results
    );

    let auth_config = AuthConfig {
        jwt_secret: settings.auth.jwt_secret.clone().filter(|s| !s.is_empty()),
        audience: settings.auth.audience.clone(),
    };
    if auth_config.jwt_secret.is_none() {
        warn!("No JWT secret configured; write endpoints accept anonymous requests");
    }

    let app_state = AppState {
        store,
        auth,
        cache: Arc::new(cache),
        matcher,
        auth_config,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
