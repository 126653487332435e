use std::time::Duration;

use clap::Parser;
use peerhub_configuration::Info;
use peerhub_lib::app;

#[derive(Parser, Debug)]
#[command(author, version, about = "A BitTorrent tracker with HTTP and UDP front-ends.")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "PEERHUB_CONFIG_TOML_PATH")]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let (_app_container, mut jobs) = app::run(&Info::new(args.config)).await;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("peerhub tracker shutting down ...");

            jobs.cancel();

            jobs.wait_for_all(Duration::from_secs(10)).await;

            tracing::info!("peerhub tracker successfully shutdown.");
        }
    }
}
