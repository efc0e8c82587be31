//! The JSON web front end: the image diff route, the polygon mask route, and
//! static serving of the generated artifacts.

use crate::artifacts::ArtifactStore;
use crate::config::Settings;
use crate::error::ServiceError;
use crate::raster::Canvas;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use protocol::ErrorResponse;

pub mod protocol;
pub mod routes;

/// State shared by the mask routes
#[derive(Debug, Clone)]
pub struct AppState {
    pub artifacts: ArtifactStore,
    pub canvas: Canvas,
    pub max_canvas_pixels: u64,
}

impl AppState {
    pub fn new(artifacts: ArtifactStore, canvas: Canvas) -> Self {
        AppState {
            artifacts,
            canvas,
            max_canvas_pixels: crate::config::MAX_CANVAS_PIXELS,
        }
    }

    pub fn with_max_canvas_pixels(mut self, max_pixels: u64) -> Self {
        self.max_canvas_pixels = max_pixels;
        self
    }

    /// Build the state from settings, creating the artifact directory
    pub fn from_settings(settings: &Settings) -> crate::Result<Self> {
        let artifacts = ArtifactStore::new(
            settings.server.static_dir.clone(),
            settings.server.static_route.clone(),
        )?;
        Ok(AppState::new(artifacts, settings.canvas.into())
            .with_max_canvas_pixels(settings.canvas.max_pixels))
    }
}

#[derive(Debug)]
pub struct WebError {
    err: ServiceError,
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.err)
    }
}

impl ResponseError for WebError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(ErrorResponse {
                error: self.to_string(),
            })
    }

    fn status_code(&self) -> StatusCode {
        if self.err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<ServiceError> for WebError {
    fn from(err: ServiceError) -> WebError {
        WebError { err }
    }
}

impl From<actix_web::error::BlockingError> for WebError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        WebError {
            err: ServiceError::Internal(anyhow::anyhow!(err.to_string())),
        }
    }
}

/// JSON extractor settings: a body limit large enough for base64 images,
/// and malformed bodies reported in the same `{"error": ...}` shape as
/// every other failure
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            let response = HttpResponse::build(err.status_code()).json(ErrorResponse {
                error: err.to_string(),
            });
            InternalError::from_response(err, response).into()
        })
}

/// Routes of the diff-only service
pub fn diff_service(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::image_diff);
}

/// Routes of the mask service: the diff route, the polygon route, and the
/// artifact directory. `state` must already be registered as app data.
pub fn mask_service(state: &AppState) -> impl FnOnce(&mut web::ServiceConfig) + '_ {
    move |cfg| {
        cfg.service(routes::image_diff)
            .service(routes::polygons)
            .service(actix_files::Files::new(
                state.artifacts.route(),
                state.artifacts.dir(),
            ));
    }
}
