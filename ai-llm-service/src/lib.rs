//! Shared LLM service: Ollama/OpenAI providers, unified errors, health checks,
//! and fast/embedding profiles.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::generate_options::GenerateOptions;
pub use error_handler::AiLlmError;
pub use service_profiles::LlmServiceProfiles;
