//! Services module - contains the diagram generation pipeline and its collaborators.

pub mod ai_service;
pub mod diagram_generator;
pub mod jwt_service;
pub mod prompt_catalog;
pub mod prompt_compiler;
pub mod quota_service;
pub mod sanitizer;

// Re-export for convenience
pub use ai_service::{
    ChatMessage, ChatRole, CompletionClient, CompletionError, GatewayCompletionClient,
};
pub use diagram_generator::{
    DiagramGenerator, GeneratedDiagram, GenerationError, GenerationRequest,
};
pub use jwt_service::{Claims, JwtService, SharedJwtService};
pub use prompt_catalog::{IconEntry, PromptCatalog, TemplateRule};
pub use prompt_compiler::{CompiledPrompt, PromptCompiler};
pub use quota_service::{
    InMemoryQuotaGate, PostgresQuotaGate, QuotaError, QuotaGate, QuotaPolicy,
};
pub use sanitizer::{SanitizedDiagram, sanitize_diagram};
