use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use balance_registry_sync::chain::BalanceFetcher;
use balance_registry_sync::config::Config;
use balance_registry_sync::presenter;
use balance_registry_sync::registry::{RegistryClient, RegistrySyncer};
use balance_registry_sync::tracker::{LoggingHandler, TrackerSession};

#[tokio::main(flavor = "current_thread")]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env()
				.add_directive("balance_registry_sync=debug".parse().unwrap())
				.add_directive(tracing::Level::INFO.into()),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	let config = Config::parse();
	info!("Starting balance tracker against {}", config.rpc_url);

	let fetcher = match BalanceFetcher::from_config(&config.chain_config()) {
		Ok(fetcher) => fetcher,
		Err(e) => {
			error!("Failed to create balance fetcher: {}", e);
			return;
		}
	};

	let mut registry = match RegistryClient::new(config.registry_url.clone()) {
		Ok(client) => client,
		Err(e) => {
			error!("Failed to create registry client: {}", e);
			return;
		}
	};
	registry.set_token(config.registry_token.clone());
	let syncer = Arc::new(RegistrySyncer::new(Arc::new(registry)));

	let mut session = TrackerSession::new(fetcher, syncer, config.session_config());
	session.register_handler(Box::new(LoggingHandler));

	if let Some(wallet) = config.wallet() {
		match session.login(&config.auth()).await {
			Ok(()) => match session.connect_wallet(&wallet).await {
				Ok(outcomes) => {
					for outcome in outcomes.into_iter().filter_map(Result::err) {
						warn!("Wallet account skipped: {}", outcome);
					}
				}
				Err(e) => error!("Failed to connect wallet: {}", e),
			},
			Err(e) => error!(
				"Cannot connect wallet without a session ({}); set --registry-token or REGISTRY_TOKEN",
				e
			),
		}
	}

	for raw in &config.addresses {
		if let Err(e) = session.add_manual(raw).await {
			warn!("Skipping {}: {}", raw, e);
		}
	}

	info!("Waiting for {} balance queries", session.pending_fetches());
	session.settle().await;

	let rows = presenter::rows(session.snapshot(), &config.view_state());
	if rows.is_empty() {
		info!("No addresses to show");
		return;
	}

	println!("{:<14} {:>24}  {}", "ACCOUNT", "BALANCE", "ADDRESS");
	for row in rows {
		println!(
			"{:<14} {:>24}  {}",
			row.short_address, row.balance, row.address
		);
	}
}
