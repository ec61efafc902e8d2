use clap::{Args, Parser, Subcommand};

use crate::pinn::LossWeights;

/// Command-line surface of the wave-equation solver.
#[derive(Parser, Debug)]
#[command(author, version, about = "A physics-informed neural network for the 1D wave equation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the field network and save it together with a loss plot
    Train(TrainArgs),
    /// Load a trained network and render the predicted field
    Infer(InferArgs),
}

/// Hyperparameters of one training run. The defaults reproduce the reference
/// setup: unit space-time domain, 100x150 collocation grid, unit wave speed.
#[derive(Args, Clone, Debug)]
pub struct TrainArgs {
    /// Lower spatial bound x0.
    #[arg(long, default_value_t = 0.0)]
    pub x_min: f64,
    /// Upper spatial bound x1.
    #[arg(long, default_value_t = 1.0)]
    pub x_max: f64,
    /// Lower temporal bound t0 (the initial slice sits here).
    #[arg(long, default_value_t = 0.0)]
    pub t_min: f64,
    /// Upper temporal bound t1.
    #[arg(long, default_value_t = 1.0)]
    pub t_max: f64,
    /// Spatial sample count.
    #[arg(long, default_value_t = 100)]
    pub n_x: usize,
    /// Temporal sample count.
    #[arg(long, default_value_t = 150)]
    pub n_t: usize,
    /// Wave speed C in f_xx = (1/C^2) * f_tt.
    #[arg(long, default_value_t = 1.0)]
    pub wave_speed: f64,
    /// Adam step size.
    #[arg(long, default_value_t = 1e-2)]
    pub learning_rate: f64,
    /// Total training iterations.
    #[arg(long, default_value_t = 3000)]
    pub epochs: usize,
    /// Epochs between progress lines.
    #[arg(long, default_value_t = 300)]
    pub report_every: usize,
    /// Seed for parameter initialization.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Weight of the PDE residual term.
    #[arg(long, default_value_t = 1.0)]
    pub pde_weight: f64,
    /// Weight shared by both boundary terms.
    #[arg(long, default_value_t = 1.0)]
    pub boundary_weight: f64,
    /// Weight of the initial-value term.
    #[arg(long, default_value_t = 1.0)]
    pub initial_value_weight: f64,
    /// Weight of the initial-derivative term.
    #[arg(long, default_value_t = 1.0)]
    pub initial_rate_weight: f64,
}

impl TrainArgs {
    pub fn weights(&self) -> LossWeights {
        LossWeights {
            pde: self.pde_weight,
            boundary: self.boundary_weight,
            initial_value: self.initial_value_weight,
            initial_rate: self.initial_rate_weight,
        }
    }
}

/// Query grid for the rendered field. The defaults mirror the training
/// defaults; pass the same bounds used for training when they differ.
#[derive(Args, Clone, Debug)]
pub struct InferArgs {
    /// Lower spatial bound x0.
    #[arg(long, default_value_t = 0.0)]
    pub x_min: f64,
    /// Upper spatial bound x1.
    #[arg(long, default_value_t = 1.0)]
    pub x_max: f64,
    /// Lower temporal bound t0.
    #[arg(long, default_value_t = 0.0)]
    pub t_min: f64,
    /// Upper temporal bound t1.
    #[arg(long, default_value_t = 1.0)]
    pub t_max: f64,
    /// Spatial sample count.
    #[arg(long, default_value_t = 100)]
    pub n_x: usize,
    /// Temporal sample count.
    #[arg(long, default_value_t = 150)]
    pub n_t: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_grid_options_parse_with_defaults() {
        let cli = Cli::parse_from(["wave-pinn", "infer", "--x-max", "2.0", "--n-x", "40"]);
        match cli.command {
            Commands::Infer(args) => {
                assert_eq!(args.x_max, 2.0);
                assert_eq!(args.n_x, 40);
                assert_eq!(args.x_min, 0.0);
                assert_eq!(args.t_max, 1.0);
                assert_eq!(args.n_t, 150);
            }
            Commands::Train(_) => panic!("expected the infer subcommand"),
        }
    }

    #[test]
    fn train_weights_map_onto_the_loss_terms() {
        let cli = Cli::parse_from(["wave-pinn", "train", "--pde-weight", "0.25"]);
        match cli.command {
            Commands::Train(args) => {
                let weights = args.weights();
                assert_eq!(weights.pde, 0.25);
                assert_eq!(weights.boundary, 1.0);
            }
            Commands::Infer(_) => panic!("expected the train subcommand"),
        }
    }
}
