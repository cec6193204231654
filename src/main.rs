//! uiflow - UI test suites over WebDriver
//!
//! Runs YAML-described login and form scenarios against a browser page or a
//! mobile app through a remote-control endpoint (chromedriver, Appium).

use clap::Parser;
use commands::Commands;
use uiflow::common::logging;
use uiflow::{cli, commands, server};

#[derive(Parser)]
#[command(name = "uiflow", about = "UI test runner over WebDriver")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { root, port } => {
            // Guard must live until the server exits
            let (_log_path, _guard) = logging::init_server();
            server::serve(&root, port).await.map(|_| true)
        }
        command => {
            logging::init_cli();
            cli::dispatch(command).await
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
