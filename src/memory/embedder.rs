use super::MemoryError;

/// Standard embedding dimension for all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// Embedding model abstraction.
///
/// Implementations must be deterministic: identical input text yields an
/// identical vector, and empty or blank input is an error rather than a
/// silently returned zero vector (which would corrupt the index).
pub trait TextEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError>;
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, MemoryError>;
    fn dimension(&self) -> usize;
}

/// Allow `Box<dyn TextEmbedder>` to be used as `&impl TextEmbedder`.
impl TextEmbedder for Box<dyn TextEmbedder> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, MemoryError> {
        (**self).embed_batch(texts)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

/// Dependency-free embedder producing deterministic L2-normalized vectors
/// from input bytes.
///
/// Not a semantic model: identical texts land on identical vectors and
/// nothing more. The default for tests and for running without model files;
/// real deployments enable `onnx-embeddings`.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: EMBEDDING_DIM,
        }
    }

    /// Smaller dimensions keep index tests cheap.
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEmbedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        if text.trim().is_empty() {
            return Err(MemoryError::Embedding(
                "cannot embed empty text".to_string(),
            ));
        }
        Ok(hashed_unit_vector(text, self.dimension))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, MemoryError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Scatter an FNV-1a byte stream over `dim` slots, then L2-normalize.
fn hashed_unit_vector(text: &str, dim: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dim];
    let mut state: u64 = 0xcbf2_9ce4_8422_2325;

    for byte in text.bytes() {
        state ^= u64::from(byte);
        state = state.wrapping_mul(0x0000_0100_0000_01b3);
        let slot = (state >> 16) as usize % dim;
        let sign = if state & 1 == 0 { 1.0 } else { -1.0 };
        vector[slot] += sign;
    }

    l2_normalize(&mut vector);
    vector
}

pub(crate) fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

// ═══════════════════════════════════════════════════════════
// ONNX Embedder, behind the `onnx-embeddings` feature
// ═══════════════════════════════════════════════════════════

#[cfg(feature = "onnx-embeddings")]
mod onnx {
    use std::path::Path;
    use std::sync::Mutex;

    use ort::session::Session;

    use super::{l2_normalize, MemoryError, TextEmbedder, EMBEDDING_DIM};

    /// Real embedding model running all-MiniLM-L6-v2 through ONNX Runtime.
    ///
    /// Needs `model.onnx` and `tokenizer.json` in the model directory.
    /// The session sits behind a Mutex because `ort::Session::run` takes
    /// `&mut self` while `TextEmbedder` exposes `&self`.
    pub struct OnnxEmbedder {
        session: Mutex<Session>,
        tokenizer: tokenizers::Tokenizer,
    }

    impl OnnxEmbedder {
        /// Load the embedding model from a directory.
        pub fn load(model_dir: &Path) -> Result<Self, MemoryError> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            if !model_path.exists() {
                return Err(MemoryError::ModelNotFound(model_path));
            }
            if !tokenizer_path.exists() {
                return Err(MemoryError::ModelNotFound(tokenizer_path));
            }

            let session = Session::builder()
                .map_err(|e: ort::Error| MemoryError::ModelInit(e.to_string()))?
                .with_intra_threads(2)
                .map_err(|e: ort::Error| MemoryError::ModelInit(e.to_string()))?
                .commit_from_file(&model_path)
                .map_err(|e: ort::Error| {
                    MemoryError::ModelInit(format!("ONNX load failed: {e}"))
                })?;

            let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| MemoryError::ModelInit(format!("tokenizer load failed: {e}")))?;

            tracing::info!("ONNX embedder loaded from {}", model_dir.display());

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
            })
        }

        fn infer(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
            use ort::value::TensorRef;

            if text.trim().is_empty() {
                return Err(MemoryError::Embedding(
                    "cannot embed empty text".to_string(),
                ));
            }

            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| MemoryError::Tokenization(e.to_string()))?;

            let seq_len = encoding.get_ids().len();
            let to_i64 = |xs: &[u32]| xs.iter().map(|&x| i64::from(x)).collect::<Vec<i64>>();
            let input_ids = to_i64(encoding.get_ids());
            let attention_mask = to_i64(encoding.get_attention_mask());
            let token_type_ids = to_i64(encoding.get_type_ids());

            let as_array = |data: Vec<i64>| {
                ndarray::Array2::from_shape_vec((1, seq_len), data)
                    .map_err(|e| MemoryError::Embedding(e.to_string()))
            };
            let ids_array = as_array(input_ids)?;
            let mask_array = as_array(attention_mask.clone())?;
            let type_array = as_array(token_type_ids)?;

            let ids_tensor = TensorRef::from_array_view(&ids_array)
                .map_err(|e| MemoryError::Embedding(e.to_string()))?;
            let mask_tensor = TensorRef::from_array_view(&mask_array)
                .map_err(|e| MemoryError::Embedding(e.to_string()))?;
            let type_tensor = TensorRef::from_array_view(&type_array)
                .map_err(|e| MemoryError::Embedding(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| MemoryError::Embedding("session lock poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![ids_tensor, mask_tensor, type_tensor])
                .map_err(|e| MemoryError::Embedding(format!("ONNX inference failed: {e}")))?;

            let (shape, output_data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| MemoryError::Embedding(format!("output extraction: {e}")))?;

            if shape.len() != 3 || shape[2] as usize != EMBEDDING_DIM {
                return Err(MemoryError::Embedding(format!(
                    "unexpected output shape: {shape:?}, expected [1, {seq_len}, {EMBEDDING_DIM}]"
                )));
            }

            Ok(mean_pool(output_data, &attention_mask, seq_len))
        }
    }

    /// Attention-mask mean pooling over token embeddings, L2-normalized.
    fn mean_pool(output: &[f32], attention_mask: &[i64], seq_len: usize) -> Vec<f32> {
        let mut pooled = vec![0.0f32; EMBEDDING_DIM];
        let mut mask_sum = 0.0f32;

        for (token_idx, &mask_val) in attention_mask.iter().enumerate().take(seq_len) {
            let mask = mask_val as f32;
            mask_sum += mask;
            let offset = token_idx * EMBEDDING_DIM;
            for (dim_idx, slot) in pooled.iter_mut().enumerate() {
                *slot += output[offset + dim_idx] * mask;
            }
        }

        if mask_sum > 0.0 {
            for value in &mut pooled {
                *value /= mask_sum;
            }
        }

        l2_normalize(&mut pooled);
        pooled
    }

    impl TextEmbedder for OnnxEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
            self.infer(text)
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, MemoryError> {
            texts.iter().map(|t| self.infer(t)).collect()
        }

        fn dimension(&self) -> usize {
            EMBEDDING_DIM
        }
    }
}

#[cfg(feature = "onnx-embeddings")]
pub use onnx::OnnxEmbedder;
