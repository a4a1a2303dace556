use std::process::exit;
use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{error, info};
use stock_chart::{ChartRenderer, ImageStore};
use yahoo_api::api::YahooAPI;

mod config;
mod error;
mod handlers;
mod utils;

use config::Config;
use handlers::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Could not create config: {}", e);
            exit(1);
        }
    };

    let store = match ImageStore::new(&config.image_dir, config.image_ttl) {
        Ok(store) => store,
        Err(e) => {
            error!(
                "Could not create image dir {}: {}",
                config.image_dir.display(),
                e
            );
            exit(1);
        }
    };
    info!(
        "Charts stored in {} | retention: {:?}",
        store.dir().display(),
        store.retention()
    );

    let yahoo_api = match &config.yahoo_url {
        Some(url) => YahooAPI::with_base_url(url),
        None => YahooAPI::new(),
    };

    let state = web::Data::new(AppState {
        client: Arc::new(yahoo_api),
        renderer: ChartRenderer::new(config.currency.clone()),
        store,
    });

    info!("Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure)
            .default_service(web::to(handlers::not_found))
            .wrap(Logger::default())
    })
    .bind((config.host.as_str(), config.port))?
    .workers(config.workers)
    .run()
    .await
}
