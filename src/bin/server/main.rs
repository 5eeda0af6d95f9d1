use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use env_logger::Env;
use insta_toggles::api_key::ApiKeyGate;
use insta_toggles::app_config::AppConfig;
use std::time::Duration;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();

    let config = AppConfig::load().context("Failed to load configuration")?;
    log::info!(
        "Starting with {:?} store, API key enforcement {}",
        config.database.backend,
        if config.api_key.enforcement_enabled {
            "enabled"
        } else {
            "DISABLED"
        }
    );

    let store = insta_toggles::db::open_store(&config.database)
        .await
        .context("Failed to open toggle store")?;
    let store = Data::from(store);

    let gate = Data::new(ApiKeyGate::from_config(&config.api_key));
    let auth = Data::new(config.auth.clone());

    // Re-read API key settings so the kill-switch can be flipped without a deploy.
    if config.api_key.reload_interval_seconds > 0 {
        let gate = gate.clone();
        let period = Duration::from_secs(config.api_key.reload_interval_seconds);
        actix_web::rt::spawn(async move {
            let mut interval = actix_web::rt::time::interval(period);
            loop {
                interval.tick().await;
                reload_api_keys(&gate);
            }
        });
    }

    let mut server = HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(store.clone())
            .app_data(gate.clone())
            .app_data(auth.clone())
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add((header::CACHE_CONTROL, "no-store")),
            )
            .wrap(Logger::new("%a %r %s %Dms"))
            .configure(insta_toggles::web::configure)
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&config.server.bind_address)
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?
        .run()
        .await?;

    Ok(())
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    // A missing .env file is fine; the environment may already be set.
    if let Err(err) = dotenv::dotenv() {
        eprintln!("No .env loaded: {}", err);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

fn reload_api_keys(gate: &ApiKeyGate) {
    match AppConfig::load() {
        Ok(config) => {
            gate.reload(&config.api_key);
        }
        Err(err) => log::warn!("Keeping current API key settings, reload failed: {}", err),
    }
}
