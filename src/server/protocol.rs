use crate::raster::{Canvas, Polygon};
use serde::{Deserialize, Serialize};

/// Body of `POST /image_diff`
#[derive(Deserialize)]
pub struct DiffRequest {
    pub image1: Option<String>,
    pub image2: Option<String>,
    pub threshold: Option<i64>,
}

impl std::fmt::Debug for DiffRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = |s: &Option<String>| s.as_ref().map(String::len);
        write!(
            f,
            "DiffRequest {{ image1: <{:?} bytes>, image2: <{:?} bytes>, threshold: {:?} }}",
            len(&self.image1),
            len(&self.image2),
            self.threshold
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiffResponse {
    pub diff_image: String,
}

/// Body of `POST /polygons`. Either the bare polygon list, which is drawn on
/// the configured canvas, or an object that also names the canvas size the
/// client drew on.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PolygonsRequest {
    List(Vec<Polygon>),
    Sized {
        polygons: Vec<Polygon>,
        canvas: Option<Canvas>,
    },
}

impl PolygonsRequest {
    pub fn into_parts(self) -> (Vec<Polygon>, Option<Canvas>) {
        match self {
            PolygonsRequest::List(polygons) => (polygons, None),
            PolygonsRequest::Sized { polygons, canvas } => (polygons, canvas),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PolygonsResponse {
    pub status: String,
    pub message: String,
    pub download_links: Vec<String>,
}

impl PolygonsResponse {
    pub fn success(download_links: Vec<String>) -> Self {
        PolygonsResponse {
            status: "success".into(),
            message: "Polygons saved successfully".into(),
            download_links,
        }
    }
}

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
