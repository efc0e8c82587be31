//! Entrypoint for the diff-only service

use actix_web::{middleware, App, HttpServer};
use maskserve::config::Settings;
use maskserve::server;
use maskserve::util::init_tracing;

use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = Settings::load()?;
    let limit = settings.server.max_body_bytes;

    info!("diff service listening on {}", settings.bind_addr());

    HttpServer::new(move || {
        App::new()
            .app_data(server::json_config(limit))
            .wrap(middleware::Logger::default())
            .configure(server::diff_service)
    })
    .bind(settings.bind_addr())?
    .run()
    .await?;

    Ok(())
}
