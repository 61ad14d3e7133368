use clap::Parser;
use fg_scorecard::App;
use fg_scorecard::args::{Cli, load_config};
use fg_scorecard::repl::run_repl;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!(
        local_store = ?config.local_store,
        firebase = config.firebase.is_some(),
        "loaded config"
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut app = App::from_config(&config)?;
    run_repl(&mut app, &rt)
}
