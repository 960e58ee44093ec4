//! Statescope CLI - Check state diagrams and print their state hierarchy

mod cli;
mod tree;

use clap::Parser;

fn main() {
    // Logging is initialized by the app once CLI flags are known
    let cli_args = cli::Cli::parse();
    let app = cli::StatescopeApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
