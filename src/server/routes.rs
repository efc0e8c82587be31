//! Request handlers. Both routes are strictly linear: decode, compute,
//! encode or write, respond. The pixel work runs on actix's blocking pool.

use super::protocol::{DiffRequest, DiffResponse, PolygonsRequest, PolygonsResponse};
use super::{AppState, WebError};
use crate::codec;
use crate::diff::{self, Threshold};
use crate::error::ServiceError;
use crate::raster;
use actix_web::{post, web, Responder};
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, WebError>;

/// Treat absent and empty strings alike
fn required(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}

#[post("/image_diff")]
pub async fn image_diff(req: web::Json<DiffRequest>) -> Result<impl Responder> {
    let req = req.into_inner();
    debug!("got diff request {req:?}");

    let (Some(image1), Some(image2)) = (required(req.image1), required(req.image2)) else {
        warn!("rejecting diff request: missing image data");
        return Err(ServiceError::MissingImage.into());
    };
    let threshold = Threshold::try_from(req.threshold)?;

    let diff_image = web::block(move || -> crate::Result<String> {
        let a = codec::decode_data_uri(&image1)?;
        let b = codec::decode_data_uri(&image2)?;
        let diff = diff::image_diff(&a, &b, threshold)?;
        codec::encode_data_uri(&diff)
    })
    .await?
    .map_err(|err| {
        warn!("diff request failed: {err}");
        err
    })?;

    info!("finished serving diff request");

    Ok(web::Json(DiffResponse { diff_image }))
}

#[post("/polygons")]
pub async fn polygons(
    req: web::Json<PolygonsRequest>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let (polygons, canvas) = req.into_inner().into_parts();
    let canvas = canvas.unwrap_or(state.canvas);
    debug!(
        "received {} polygons for a {}x{} canvas",
        polygons.len(),
        canvas.width,
        canvas.height
    );

    if let Err(err) = canvas.validate(state.max_canvas_pixels) {
        warn!("rejecting polygon request: {err}");
        return Err(err.into());
    }

    let artifacts = state.artifacts.clone();
    let max_pixels = state.max_canvas_pixels;
    let links = web::block(move || -> crate::Result<[String; 2]> {
        let mask = raster::rasterize(canvas, max_pixels, &polygons)?;
        let annotations = raster::annotation_lines(&polygons);
        artifacts.save_mask(&annotations, &mask)
    })
    .await??;

    info!("saved polygon artifacts {links:?}");

    Ok(web::Json(PolygonsResponse::success(links.to_vec())))
}
