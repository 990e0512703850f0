// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use knowgraph_extract::providers::{
    DEFAULT_ANTHROPIC_MODEL, DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_MODEL,
};
use knowgraph_extract::DEFAULT_MAX_ATTEMPTS;

/// Knowgraph Server Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub llm: LLMConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP API listen address (e.g., "127.0.0.1:8000")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Deadline for a whole /update_graph request, retries included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Allowed CORS origins (empty = allow all)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => DEFAULT_OPENAI_MODEL,
            ProviderKind::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            ProviderKind::Ollama => DEFAULT_OLLAMA_MODEL,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LLMConfig {
    /// Which provider answers extraction calls
    #[serde(default)]
    pub provider: ProviderKind,

    /// Model name (provider default when unset)
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-call HTTP timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Base URL for OpenAI-compatible endpoints (e.g., "https://api.deepseek.com/v1")
    pub openai_base_url: Option<String>,

    /// Anthropic API key
    pub anthropic_api_key: Option<String>,

    /// Ollama base URL (e.g., "http://localhost:11434")
    pub ollama_base_url: Option<String>,
}

impl LLMConfig {
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
            openai_api_key: None,
            openai_base_url: None,
            anthropic_api_key: None,
            ollama_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Provider calls per request, first try included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            request_timeout_secs: default_request_timeout(),
            enable_cors: default_enable_cors(),
            cors_origins: vec![],
            log_format: LogFormat::default(),
        }
    }
}

// Default values
fn default_http_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

fn default_enable_cors() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.5
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override fields from environment variables
    ///
    /// Supported variables:
    /// - KNOWGRAPH_HTTP_ADDR: HTTP listen address
    /// - KNOWGRAPH_REQUEST_TIMEOUT: Request deadline in seconds
    /// - KNOWGRAPH_ENABLE_CORS: Enable CORS (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`)
    /// - KNOWGRAPH_LOG_FORMAT: `text` or `json`
    /// - KNOWGRAPH_LLM_PROVIDER: `openai`, `anthropic` or `ollama`
    /// - KNOWGRAPH_LLM_MODEL: Model name
    /// - KNOWGRAPH_LLM_TEMPERATURE: Sampling temperature
    /// - KNOWGRAPH_MAX_ATTEMPTS: Extraction attempts per request
    /// - OPENAI_API_KEY, OPENAI_BASE_URL, ANTHROPIC_API_KEY, OLLAMA_BASE_URL
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server configuration
        if let Some(addr) = lookup("KNOWGRAPH_HTTP_ADDR") {
            self.server.listen_addr = addr;
        }
        if let Some(val) = lookup("KNOWGRAPH_REQUEST_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.server.request_timeout_secs = val;
        }
        if let Some(cors) = lookup("KNOWGRAPH_ENABLE_CORS") {
            match parse_flag(&cors) {
                Some(enabled) => self.server.enable_cors = enabled,
                None => tracing::warn!(
                    "Invalid KNOWGRAPH_ENABLE_CORS value {:?}, keeping {}",
                    cors,
                    self.server.enable_cors
                ),
            }
        }
        if let Some(format) = lookup("KNOWGRAPH_LOG_FORMAT") {
            self.server.log_format = if format.eq_ignore_ascii_case("json") {
                LogFormat::Json
            } else {
                LogFormat::Text
            };
        }

        // LLM configuration
        if let Some(provider) = lookup("KNOWGRAPH_LLM_PROVIDER") {
            match <ProviderKind as ValueEnum>::from_str(&provider, true) {
                Ok(kind) => self.llm.provider = kind,
                Err(_) => tracing::warn!(
                    "Unknown LLM provider {:?}, keeping {}",
                    provider,
                    self.llm.provider.as_str()
                ),
            }
        }
        if let Some(model) = lookup("KNOWGRAPH_LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(val) = lookup("KNOWGRAPH_LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.llm.temperature = val;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.openai_api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.llm.openai_base_url = Some(url);
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.llm.anthropic_api_key = Some(key);
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            self.llm.ollama_base_url = Some(url);
        }

        // Extraction configuration
        if let Some(val) = lookup("KNOWGRAPH_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.extraction.max_attempts = val;
        }
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if self.extraction.max_attempts == 0 {
            anyhow::bail!("extraction.max_attempts must be at least 1");
        }

        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be at least 1");
        }

        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be at least 1");
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            );
        }

        match self.llm.provider {
            ProviderKind::OpenAI if self.llm.openai_api_key.is_none() => {
                anyhow::bail!("LLM provider 'openai' selected but OPENAI_API_KEY is not set")
            }
            ProviderKind::Anthropic if self.llm.anthropic_api_key.is_none() => {
                anyhow::bail!("LLM provider 'anthropic' selected but ANTHROPIC_API_KEY is not set")
            }
            _ => {}
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
