//! Entry point: dispatches the `train` and `infer` subcommands.
//!
//! ```bash
//! cargo run --release -- train
//! cargo run --release -- infer
//! ```

use clap::Parser;
use wave_pinn::cli::{Cli, Commands};
use wave_pinn::{inference, training};

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Train(args) => training::run(args),
        Commands::Infer(args) => inference::run(args),
    };
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
