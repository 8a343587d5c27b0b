use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Anamnesis";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How many similar cases the engine retrieves for diagnosis context.
pub const DEFAULT_TOP_K: usize = 3;

/// Default timeout for a single reasoner inference call.
pub const DEFAULT_REASONER_TIMEOUT_SECS: u64 = 120;

/// Get the application data directory
/// ~/Anamnesis/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Anamnesis")
}

/// Get the models directory (for ONNX embeddings, etc.)
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Get the embedding model directory (all-MiniLM-L6-v2)
pub fn embedding_model_dir() -> PathBuf {
    models_dir().join("all-MiniLM-L6-v2")
}

/// Operator-supplied symptom knowledge table, overriding the bundled one.
pub fn knowledge_file() -> PathBuf {
    app_data_dir().join("symptom_categories.json")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}
