// Dweve MLS - MATLAB Code Intelligence
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! MATLAB language server binary.
//!
//! # Usage
//!
//! ```bash
//! # Run the language server (stdio transport)
//! mls-lsp
//!
//! # With debug logging
//! RUST_LOG=debug mls-lsp
//! ```
//!
//! Configuration comes from `.mlsrc.json` in the working directory and the
//! `MLS_ANALYZER_PATH` environment variable; see [`mls_lsp::ServerConfig`].

use mls_lsp::MatlabLanguageServer;
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logging goes to stderr; stdout is the protocol channel.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("mls_lsp=info".parse().expect("valid log directive"))
                .add_directive("mls_mlint=info".parse().expect("valid log directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting MATLAB language server v{}", mls_lsp::VERSION);

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(MatlabLanguageServer::new);

    Server::new(stdin, stdout, socket).serve(service).await;
}
