// src/config/mod.rs
// All values load from the environment (plus .env), with defaults that match
// the hosted model's documented generation parameters.

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct PulseConfig {
    // ── Hosted Model Configuration
    pub watsonx_url: String,
    pub watsonx_api_key: String,
    pub watsonx_project_id: String,
    pub watsonx_version: String,
    pub model_id: String,

    // ── Generation Parameters
    pub decoding_method: String,
    pub temperature: f32,
    pub min_new_tokens: u32,
    pub max_new_tokens: u32,
    pub llm_timeout: u64,

    // ── Database Configuration
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Session Configuration
    pub session_ttl_seconds: u64,
    pub session_sweep_interval: u64,

    // ── Onboarding
    pub onboarding_message: String,

    // ── Server Configuration
    pub host: String,
    pub port: u16,
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl PulseConfig {
    pub fn from_env() -> Self {
        // Load from .env file first if it exists
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        Self {
            watsonx_url: env_var_or(
                "WATSONX_URL",
                "https://us-south.ml.cloud.ibm.com".to_string(),
            ),
            watsonx_api_key: env_var_or("WATSONX_API_KEY", String::new()),
            watsonx_project_id: env_var_or("WATSONX_PROJECT_ID", String::new()),
            watsonx_version: env_var_or("WATSONX_VERSION", "2023-05-29".to_string()),
            model_id: env_var_or("PULSE_MODEL_ID", "ibm/granite-13b-chat-v2".to_string()),
            decoding_method: env_var_or("PULSE_DECODING_METHOD", "greedy".to_string()),
            temperature: env_var_or("PULSE_TEMPERATURE", 0.0),
            min_new_tokens: env_var_or("PULSE_MIN_NEW_TOKENS", 5),
            max_new_tokens: env_var_or("PULSE_MAX_NEW_TOKENS", 70),
            llm_timeout: env_var_or("PULSE_LLM_TIMEOUT", 60),
            database_url: env_var_or("DATABASE_URL", "sqlite:./pulsecheck.db".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 5),
            session_ttl_seconds: env_var_or("PULSE_SESSION_TTL", 1800),
            session_sweep_interval: env_var_or("PULSE_SESSION_SWEEP_INTERVAL", 300),
            onboarding_message: env_var_or(
                "PULSE_ONBOARDING_MESSAGE",
                "Could you tell us your feelings about XYZ Corp work environment?".to_string(),
            ),
            host: env_var_or("PULSE_HOST", "0.0.0.0".to_string()),
            port: env_var_or("PULSE_PORT", 8080),
        }
    }
}

pub static CONFIG: Lazy<PulseConfig> = Lazy::new(PulseConfig::from_env);
