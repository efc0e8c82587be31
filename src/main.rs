use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use maskserve::config::Settings;
use maskserve::server::{self, AppState};
use maskserve::util::init_tracing;

use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = Settings::load()?;
    let state = AppState::from_settings(&settings)
        .with_context(|| format!("cannot open {}", settings.server.static_dir.display()))?;
    let limit = settings.server.max_body_bytes;

    info!(
        "mask service listening on {}, artifacts in {}",
        settings.bind_addr(),
        state.artifacts.dir().display()
    );

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(server::json_config(limit))
            .wrap(middleware::Logger::default())
            .configure(server::mask_service(&state))
    })
    .bind(settings.bind_addr())?
    .run()
    .await?;

    Ok(())
}
