//! # Physics-informed solver for the one-dimensional wave equation
//!
//! A small feed-forward network is trained so that its analytic derivatives
//! satisfy the wave equation `f_xx = (1/C^2) * f_tt` together with Dirichlet
//! boundaries and the initial value/velocity conditions, instead of fitting
//! precomputed solution data. Input derivatives are propagated forward
//! through the network as exact jets built from ordinary tensor operations,
//! so they stay differentiable with respect to the parameters; they are
//! never approximated by finite differences.

pub mod cli;
pub mod diff;
pub mod grid;
pub mod inference;
pub mod model;
pub mod pinn;
pub mod training;

/// File the trained model is saved to after training.
pub const MODEL_FILENAME: &str = "wave_pinn_model.mpk";
