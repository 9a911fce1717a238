//! etcd-key-manager CLI
//!
//! `etcdapply` reconciles a single key in an etcd v2 store against the
//! desired state given on the command line.

mod cli;
mod error;
mod report;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use error::Result;

fn main() {
    match run() {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    // Validate the desired state before touching the network.
    let desired = cli.desired_state()?;
    let policy = cli.policy();

    let store = etcd_transport::EtcdClient::connect(&cli.client_config())?;
    let result = etcd_engine::apply(&store, &desired, &policy)?;

    if cli.json {
        println!("{}", report::render_json(&result)?);
    } else {
        println!("{}", report::render_human(&result, policy.dry_run));
    }

    // A policy refusal is a deterministic failure: report it through the
    // exit status even though the transport worked.
    Ok(if result.error.is_some() { 1 } else { 0 })
}
