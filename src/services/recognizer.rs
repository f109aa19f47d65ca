use anyhow::Result;
use async_trait::async_trait;
use image::DynamicImage;

use crate::models::Recognition;

/// Turns a decoded image into labelled objects.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, image: &DynamicImage) -> Result<Recognition>;
}

/// Fixed result used until a real model is wired in. Ignores the image.
pub struct StubRecognizer;

pub const STUB_OBJECTS: [&str; 3] = ["猫", "沙发", "电视"];
pub const STUB_CONFIDENCE: [f32; 3] = [0.95, 0.87, 0.76];

#[async_trait]
impl Recognizer for StubRecognizer {
    async fn recognize(&self, _image: &DynamicImage) -> Result<Recognition> {
        Ok(Recognition {
            objects: STUB_OBJECTS.iter().map(|s| s.to_string()).collect(),
            confidence: STUB_CONFIDENCE.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_is_parallel() {
        let img = DynamicImage::new_rgb8(2, 2);
        let result = StubRecognizer.recognize(&img).await.unwrap();
        assert_eq!(result.objects, vec!["猫", "沙发", "电视"]);
        assert_eq!(result.objects.len(), result.confidence.len());
    }
}
