//! Generated mask artifacts on disk.
//!
//! Every polygon request produces an annotation text file and a PNG mask in
//! one flat output directory. Names carry a second-resolution timestamp for
//! humans plus a random UUID so concurrent requests never share a file.

use crate::codec;
use crate::error::Result;
use chrono::Local;
use image::GrayImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Unique stem shared by the files of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactId {
    timestamp: String,
    nonce: Uuid,
}

impl ArtifactId {
    pub fn new() -> Self {
        ArtifactId {
            timestamp: Local::now().format("%Y%m%d%H%M%S").to_string(),
            nonce: Uuid::new_v4(),
        }
    }

    pub fn annotation_file(&self) -> String {
        format!("polygons_{}_{}.txt", self.timestamp, self.nonce.simple())
    }

    pub fn mask_file(&self) -> String {
        format!("binary_image_{}_{}.png", self.timestamp, self.nonce.simple())
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

/// The output directory and the URL prefix it is served under
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    route: String,
}

impl ArtifactStore {
    /// Open the store, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>, route: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let route = route.into().trim_end_matches('/').to_string();
        Ok(ArtifactStore { dir, route })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    fn link(&self, file: &str) -> String {
        format!("{}/{}", self.route, file)
    }

    /// Write the annotation text, then the mask. Returns the download links
    /// in the same order. A failed mask write leaves the text file behind.
    pub fn save_mask(&self, annotations: &str, mask: &GrayImage) -> Result<[String; 2]> {
        let id = ArtifactId::new();
        let (txt, png) = (id.annotation_file(), id.mask_file());

        fs::write(self.dir.join(&txt), annotations)?;
        debug!("wrote annotations to {}", self.dir.join(&txt).display());

        fs::write(self.dir.join(&png), codec::encode_png(mask)?)?;
        debug!("wrote mask to {}", self.dir.join(&png).display());

        Ok([self.link(&txt), self.link(&png)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_within_a_second() {
        let a = ArtifactId::new();
        let b = ArtifactId::new();
        assert_ne!(a.annotation_file(), b.annotation_file());
        assert_ne!(a.mask_file(), b.mask_file());
    }

    #[test]
    fn file_names_follow_the_layout() {
        let id = ArtifactId::new();
        let txt = id.annotation_file();
        let png = id.mask_file();
        assert!(txt.starts_with("polygons_") && txt.ends_with(".txt"));
        assert!(png.starts_with("binary_image_") && png.ends_with(".png"));

        let stamp = &txt["polygons_".len().."polygons_".len() + 14];
        assert!(stamp.chars().all(|c| c.is_ascii_digit()), "{stamp}");
        assert_eq!(txt["polygons_".len()..txt.len() - 4], png["binary_image_".len()..png.len() - 4]);
    }

    #[test]
    fn save_mask_writes_both_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().join("static"), "/static/").unwrap();
        let mask = GrayImage::from_pixel(4, 3, image::Luma([255]));

        let [txt, png] = store.save_mask("0 0.5 0.5\n", &mask).unwrap();
        assert!(txt.starts_with("/static/polygons_"));
        assert!(png.starts_with("/static/binary_image_"));

        let txt_path = store.dir().join(txt.trim_start_matches("/static/"));
        assert_eq!(fs::read_to_string(txt_path).unwrap(), "0 0.5 0.5\n");

        let png_path = store.dir().join(png.trim_start_matches("/static/"));
        let written = image::open(png_path).unwrap().to_luma8();
        assert_eq!(written, mask);
    }
}
