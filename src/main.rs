mod config;
mod model;
mod relay;
mod web;

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;
use log::info;
use reqwest::Client;

use config::Config;
use model::CozeClient;
use relay::JuheClient;
use web::routes;

// App state structure, read-only once the server starts
pub struct AppState {
    config: Config,
    coze: CozeClient,
    relay: JuheClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let client = Client::new();
        Self {
            coze: CozeClient::new(client.clone(), &config),
            relay: JuheClient::new(client, &config),
            config,
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting WeChat-Coze relay bot v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    config.log_summary();

    let bind = (config.host.clone(), config.port);
    let app_state = Data::new(AppState::new(config));

    info!("Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind(bind)?
    .run()
    .await
}
