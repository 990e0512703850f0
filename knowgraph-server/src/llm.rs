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

use anyhow::Context;
use knowgraph_extract::{
    AnthropicClient, ExtractionClient, OllamaClient, OpenAIClient, ProviderSettings,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{LLMConfig, ProviderKind};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Build the extraction client selected by `config.provider`.
pub fn build_client(config: &LLMConfig) -> anyhow::Result<Arc<dyn ExtractionClient>> {
    let settings = ProviderSettings::new(config.model_name())
        .with_temperature(config.temperature)
        .with_timeout(Duration::from_secs(config.timeout_secs));

    let client: Arc<dyn ExtractionClient> = match config.provider {
        ProviderKind::OpenAI => {
            let key = config
                .openai_api_key
                .clone()
                .context("OPENAI_API_KEY not set, OpenAI provider unavailable")?;
            let mut client = OpenAIClient::new(key, settings)?;
            if let Some(base_url) = &config.openai_base_url {
                info!("Using OpenAI-compatible endpoint at {}", base_url);
                client = client.with_base_url(base_url.as_str());
            }
            Arc::new(client)
        }
        ProviderKind::Anthropic => {
            let key = config
                .anthropic_api_key
                .clone()
                .context("ANTHROPIC_API_KEY not set, Anthropic provider unavailable")?;
            Arc::new(AnthropicClient::new(key, settings)?)
        }
        ProviderKind::Ollama => {
            let base_url = config
                .ollama_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            Arc::new(OllamaClient::new(base_url, settings)?)
        }
    };

    info!(
        provider = client.provider(),
        model = client.model_name(),
        "Initialized LLM provider"
    );
    Ok(client)
}
