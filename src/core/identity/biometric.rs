// src/core/identity/biometric.rs
use image::{imageops::FilterType, DynamicImage};
use ring::digest::{digest, SHA256};
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::Template;
use crate::utils::{
    config::{EncoderConfig, MatchingConfig, MatchingMode},
    error::{NodeError, Result},
};

/// Face feature extraction backend.
///
/// Implementations return one encoding per detected face, primary face first.
/// An empty result means no face was found.
pub trait FaceExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn encodings(&self, image: &DynamicImage) -> Vec<Vec<f64>>;
}

/// Turns raw biometric payloads into comparable templates.
///
/// In [`MatchingMode::Hash`] facial templates are a SHA-256 digest of a
/// mean-thresholded grayscale raster. Identical images always collide, but a
/// single flipped bit produces an unrelated digest, so the hash path is far
/// less tolerant than the vector path and is matched by equality only.
pub struct BiometricEncoder {
    mode: MatchingMode,
    raster_size: u32,
    max_payload_bytes: usize,
    extractor: Option<Arc<dyn FaceExtractor>>,
}

impl BiometricEncoder {
    pub fn new(
        matching: &MatchingConfig,
        encoder: &EncoderConfig,
        extractor: Option<Arc<dyn FaceExtractor>>,
    ) -> Result<Self> {
        let extractor = match (matching.mode, extractor) {
            (MatchingMode::Vector, None) => {
                return Err(NodeError::Config(
                    "vector matching mode requires a face extractor".into(),
                ));
            }
            (MatchingMode::Hash, Some(extractor)) => {
                warn!(
                    extractor = extractor.name(),
                    "Face extractor supplied in hash mode, it will not be used"
                );
                None
            }
            (_, extractor) => extractor,
        };

        Ok(Self {
            mode: matching.mode,
            raster_size: encoder.raster_size,
            max_payload_bytes: encoder.max_payload_bytes,
            extractor,
        })
    }

    pub fn mode(&self) -> MatchingMode {
        self.mode
    }

    /// Encodes a facial image. Returns `None` when the payload is oversized,
    /// undecodable, or contains no face.
    pub fn encode_facial(&self, data: &[u8]) -> Option<Template> {
        if data.is_empty() {
            return None;
        }
        if data.len() > self.max_payload_bytes {
            warn!(
                size = data.len(),
                limit = self.max_payload_bytes,
                "Facial payload exceeds size limit"
            );
            return None;
        }

        let image = match image::load_from_memory(data) {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "Failed to decode facial image");
                return None;
            }
        };

        match &self.extractor {
            Some(extractor) => {
                let encodings = extractor.encodings(&image);
                debug!(
                    extractor = extractor.name(),
                    faces = encodings.len(),
                    "Extracted face encodings"
                );
                match encodings.into_iter().next() {
                    Some(encoding) if !encoding.is_empty() => Some(Template::Vector(encoding)),
                    _ => {
                        warn!("No face detected in image");
                        None
                    }
                }
            }
            None => Some(self.raster_digest(&image)),
        }
    }

    /// Fingerprint payloads are hashed as-is and only ever match exactly.
    pub fn encode_fingerprint(&self, payload: &str) -> Template {
        Template::Hash(sha256_hex(payload.as_bytes()))
    }

    fn raster_digest(&self, image: &DynamicImage) -> Template {
        let raster = image
            .resize_exact(self.raster_size, self.raster_size, FilterType::CatmullRom)
            .to_luma8();

        let pixels = raster.as_raw();
        let mean = pixels.iter().map(|&p| p as f64).sum::<f64>() / pixels.len() as f64;
        let bits: String = pixels
            .iter()
            .map(|&p| if p as f64 > mean { '1' } else { '0' })
            .collect();

        Template::Hash(sha256_hex(bits.as_bytes()))
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(digest(&SHA256, data))
}
