// Copyright 2024 Vault Bridge Developers.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bridge Relayer Binary.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;
use tokio::signal::unix;

use bridge_relayer::service::{self, LoggingSubmitter};
use bridge_relayer_config::cli::{create_store, load_config, setup_logger, Opts};
use vault_event_watcher::RelayDispatcher;

/// The main entry point for the relayer.
///
/// # Arguments
///
/// * `args` - The command line arguments.
#[paw::main]
#[tokio::main]
async fn main(args: Opts) -> anyhow::Result<()> {
    setup_logger(args.verbose, "bridge_relayer")?;
    match dotenv::dotenv() {
        Ok(_) => {
            tracing::trace!("Loaded .env file");
        }
        Err(e) => {
            tracing::warn!("Failed to load .env file: {}", e);
        }
    }

    // The configuration is validated and configured from the given directory
    let config = load_config(args.config_dir.clone())?;

    // persistent storage for the dedup guarantee across restarts
    let store = create_store(&args).await?;

    let dispatcher = RelayDispatcher::new(
        config.vault.clone(),
        Arc::new(store),
        LoggingSubmitter,
    );

    // the log subscription arrives as JSON lines on stdin; the upstream
    // RPC bridge owns the actual websocket connection.
    let mut relay_handle = tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        service::relay_json_lines(&dispatcher, stdin).await
    });
    tracing::event!(
        target: bridge_relayer_utils::probe::TARGET,
        tracing::Level::DEBUG,
        kind = %bridge_relayer_utils::probe::Kind::Lifecycle,
        started = true
    );
    // watch for signals
    let mut ctrlc_signal = unix::signal(unix::SignalKind::interrupt())?;
    let mut termination_signal = unix::signal(unix::SignalKind::terminate())?;
    let mut quit_signal = unix::signal(unix::SignalKind::quit())?;
    tokio::select! {
        res = &mut relay_handle => {
            match res {
                Ok(Ok(())) => tracing::info!("Log stream ended ..."),
                Ok(Err(e)) => tracing::error!("Relay loop failed: {}", e),
                Err(e) => tracing::error!("Relay task stopped abnormally: {}", e),
            }
        },
        _ = ctrlc_signal.recv() => {
            tracing::warn!("Interrupted (Ctrl+C) ...");
        },
        _ = termination_signal.recv() => {
            tracing::warn!("Got Terminate signal ...");
        },
        _ = quit_signal.recv() => {
            tracing::warn!("Quitting ...");
        },
    }
    tracing::event!(
        target: bridge_relayer_utils::probe::TARGET,
        tracing::Level::DEBUG,
        kind = %bridge_relayer_utils::probe::Kind::Lifecycle,
        shutdown = true
    );
    tracing::warn!("Shutting down...");
    relay_handle.abort();
    tracing::info!("Clean Exit ..");
    Ok(())
}
