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
use clap::Parser;
use knowgraph_server::{
    config::{ProviderKind, ServerConfig},
    run_server,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn free text into a knowledge graph", long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, env = "KNOWGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP listen address (overrides config file)
    #[arg(long, env = "KNOWGRAPH_HTTP_ADDR")]
    http_addr: Option<String>,

    /// LLM provider (overrides config file)
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Model name (overrides config file)
    #[arg(long)]
    model: Option<String>,

    /// Extraction attempts per request, first try included
    #[arg(long)]
    max_attempts: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = ServerConfig::load(args.config)?;

    // Apply CLI overrides
    if let Some(addr) = args.http_addr {
        config.server.listen_addr = addr;
    }
    if let Some(provider) = args.provider {
        config.llm.provider = provider;
    }
    if let Some(model) = args.model {
        config.llm.model = Some(model);
    }
    if let Some(max_attempts) = args.max_attempts {
        config.extraction.max_attempts = max_attempts;
    }

    // Run server
    run_server(config).await
}
