//! In-process image classification via ONNX Runtime.
//!
//! Expects an ImageNet-style classifier: one NCHW `f32` input and one
//! `[1, num_classes]` output.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::imageops::FilterType;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use tracing::{debug, info};

use super::traits::ImageClassifier;
use crate::error::{BreedscopeError, Result};
use crate::model::{Device, ModelSource};
use crate::types::{ClassificationResult, Prediction};

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Settings for [`OnnxImageClassifier`].
#[derive(Debug, Clone)]
pub struct LocalClassifierConfig {
    pub model: ModelSource,
    /// Newline-separated class names, in output index order.
    pub labels: ModelSource,
    pub device: Device,
    pub input_width: u32,
    pub input_height: u32,
    /// How many predictions to return.
    pub top_k: usize,
    /// Apply softmax to the raw output. Disable for models that already
    /// end in a softmax layer.
    pub softmax: bool,
}

impl LocalClassifierConfig {
    pub fn new(model: ModelSource, labels: ModelSource) -> Self {
        Self {
            model,
            labels,
            device: Device::default(),
            input_width: 224,
            input_height: 224,
            top_k: 5,
            softmax: true,
        }
    }
}

/// Image classifier running a pretrained network in this process.
///
/// The session is loaded once and never replaced; the mutex only
/// serialises `Session::run`, which needs `&mut`.
pub struct OnnxImageClassifier {
    session: Arc<Mutex<Session>>,
    labels: Arc<Vec<String>>,
    name: String,
    config: LocalClassifierConfig,
}

impl OnnxImageClassifier {
    /// Load the model and labels, downloading them if needed.
    pub fn new(config: LocalClassifierConfig) -> Result<Self> {
        if config.top_k == 0 {
            return Err(BreedscopeError::Configuration(
                "top_k must be at least 1".to_string(),
            ));
        }

        let model_path = config.model.resolve()?;
        let labels_path = config.labels.resolve()?;

        let session = build_session(&model_path, &config.device)?;
        let labels = load_labels(&labels_path)?;

        info!(
            model = %model_path.display(),
            labels = labels.len(),
            device = config.device.name(),
            "loaded local classifier"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            labels: Arc::new(labels),
            name: format!("onnx:{}", config.model.name()),
            config,
        })
    }

    /// Class names in output index order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Decode, preprocess and run one image.
    fn infer(
        session: &Mutex<Session>,
        labels: &[String],
        config: &LocalClassifierConfig,
        image: &[u8],
    ) -> Result<ClassificationResult> {
        use ort::value::TensorRef;

        let (width, height) = (config.input_width, config.input_height);
        let input = preprocess(image, width, height)?;
        let shape = [1_usize, 3, height as usize, width as usize];

        let tensor = TensorRef::from_array_view((shape, input.as_slice())).map_err(|e| {
            BreedscopeError::DataError(format!("Failed to create input tensor: {e}"))
        })?;

        let mut session = session
            .lock()
            .map_err(|_| BreedscopeError::DataError("classifier session poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| BreedscopeError::DataError(format!("ONNX inference failed: {e}")))?;

        if outputs.len() == 0 {
            return Err(BreedscopeError::EmptyResponse);
        }

        // try_extract_tensor returns (&Shape, &[T])
        let (_, scores) = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
            BreedscopeError::DataError(format!("Failed to extract scores: {e}"))
        })?;

        let probabilities = if config.softmax {
            softmax(scores)
        } else {
            scores.to_vec()
        };

        debug!(classes = probabilities.len(), "local inference finished");
        Ok(top_k(&probabilities, labels, config.top_k))
    }
}

#[async_trait]
impl ImageClassifier for OnnxImageClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, image: &[u8]) -> Result<ClassificationResult> {
        let session = Arc::clone(&self.session);
        let labels = Arc::clone(&self.labels);
        let config = self.config.clone();
        let image = image.to_vec();

        tokio::task::spawn_blocking(move || Self::infer(&session, &labels, &config, &image))
            .await
            .map_err(|e| BreedscopeError::DataError(format!("inference task failed: {e}")))?
    }
}

/// Decode an image and lay it out as normalised NCHW `f32`.
pub fn preprocess(image: &[u8], width: u32, height: u32) -> Result<Vec<f32>> {
    let decoded = image::load_from_memory(image)
        .map_err(|e| BreedscopeError::UnsupportedImage(format!("cannot decode image: {e}")))?;
    let rgb = image::imageops::resize(&decoded.to_rgb8(), width, height, FilterType::CatmullRom);

    let plane = (width * height) as usize;
    let mut input = vec![0.0f32; 3 * plane];
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let offset = (y * width + x) as usize;
        for c in 0..3 {
            let value = f32::from(pixel[c]) / 255.0;
            input[c * plane + offset] = (value - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        }
    }
    Ok(input)
}

/// Highest `k` scores, paired with their labels.
///
/// Classes past the end of the label file are named `class_<index>`.
pub fn top_k(probabilities: &[f32], labels: &[String], k: usize) -> ClassificationResult {
    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|(_, a), (_, b)| b.total_cmp(a));

    indexed
        .into_iter()
        .take(k)
        .map(|(idx, probability)| {
            let label = labels
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("class_{idx}"));
            Prediction::new(label, probability)
        })
        .collect()
}

/// Softmax function.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|x| x / sum).collect()
}

fn load_labels(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        BreedscopeError::Configuration(format!("Failed to read labels {}: {e}", path.display()))
    })?;
    let labels: Vec<String> = content
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    if labels.is_empty() {
        return Err(BreedscopeError::Configuration(format!(
            "Label file {} is empty",
            path.display()
        )));
    }
    Ok(labels)
}

/// Build an ONNX session with the appropriate execution provider.
fn build_session(model_path: &Path, device: &Device) -> Result<Session> {
    let builder = Session::builder()
        .map_err(|e| BreedscopeError::Configuration(format!("Failed to create session builder: {e}")))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| BreedscopeError::Configuration(format!("Failed to set optimization level: {e}")))?;

    let builder = match device {
        Device::Cpu => builder,
        #[cfg(feature = "cuda")]
        Device::Cuda { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            builder
                .with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(*device_id as i32)
                    .build()])
                .map_err(|e| {
                    BreedscopeError::Configuration(format!("Failed to configure CUDA: {e}"))
                })?
        }
    };

    builder
        .commit_from_file(model_path)
        .map_err(|e| BreedscopeError::Configuration(format!("Failed to load ONNX model: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_softmax() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1]);
        assert!(probs[1] > probs[0]);
    }

    #[test]
    fn top_k_picks_highest_scores() {
        let result = top_k(&[0.1, 0.6, 0.3], &labels(&["pug", "beagle", "husky"]), 2);
        let names: Vec<&str> = result.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(names, vec!["beagle", "husky"]);
    }

    #[test]
    fn top_k_names_unlabelled_classes() {
        let result = top_k(&[0.2, 0.8], &labels(&["pug"]), 5);
        assert_eq!(result.len(), 2);
        assert_eq!(result.top_class(), Some("class_1"));
    }

    #[test]
    fn preprocess_produces_nchw_normalised_input() {
        let input = preprocess(&png(8, 4, [255, 0, 0]), 2, 2).unwrap();
        assert_eq!(input.len(), 3 * 2 * 2);

        let red = (1.0 - IMAGENET_MEAN[0]) / IMAGENET_STD[0];
        let green = (0.0 - IMAGENET_MEAN[1]) / IMAGENET_STD[1];
        assert!((input[0] - red).abs() < 1e-4);
        assert!((input[4] - green).abs() < 1e-4);
    }

    #[test]
    fn preprocess_rejects_non_images() {
        let err = preprocess(b"definitely not a jpeg", 224, 224).unwrap_err();
        assert!(matches!(err, BreedscopeError::UnsupportedImage(_)));
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let mut config = LocalClassifierConfig::new(
            ModelSource::local("model.onnx"),
            ModelSource::local("labels.txt"),
        );
        config.top_k = 0;
        assert!(OnnxImageClassifier::new(config).is_err());
    }
}
