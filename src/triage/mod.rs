pub mod context;
pub mod knowledge;
pub mod orchestrator;
pub mod parser;
pub mod reasoner;

use thiserror::Error;

pub use knowledge::{SymptomCategory, SymptomKnowledge};
pub use orchestrator::TriagePipeline;
pub use reasoner::{OllamaReasoner, Reasoner};

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("reasoner connection failed: {0}")]
    Connection(String),

    #[error("reasoner request timed out after {0}s")]
    Timeout(u64),

    #[error("http client error: {0}")]
    Client(String),

    #[error("reasoner returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("response parsing error: {0}")]
    ResponseParsing(String),

    #[error("knowledge table load failed for {0}: {1}")]
    KnowledgeLoad(String, String),

    #[error("knowledge table parse failed: {0}")]
    KnowledgeParse(String),
}
