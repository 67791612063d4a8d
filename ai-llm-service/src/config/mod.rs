pub mod default_config;
pub mod generate_options;
pub mod llm_model_config;
pub mod llm_provider;
