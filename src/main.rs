use clap::Parser;
use kantui::cli::commands::Cli;
use kantui::cli::handlers;

fn main() {
    let cli = Cli::parse();
    match handlers::launch(cli) {
        Ok(None) => {}
        Ok(Some(failure)) => {
            eprintln!("{}: {}", failure.summary, failure.detail);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
