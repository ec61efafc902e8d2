//! Composite physics-informed loss for the wave equation.
//!
//! Each physical requirement becomes its own mean-squared penalty: the PDE
//! residual at the interior points, the field value along both spatial
//! boundaries, and the value and first time derivative along the initial
//! slice. The terms are summed with configurable weights that default to
//! one; no adaptive balancing is attempted, so a term with a much larger
//! residual magnitude can dominate training.

use std::f64::consts::PI;

use burn::nn::loss::{MseLoss, Reduction};
use burn::prelude::Backend;
use burn::tensor::Tensor;

use crate::diff::{self, Axis, Field};
use crate::grid::CollocationGrid;

/// Prescribed initial profile `g(x) = 0.5 * sin(2*pi*x)`.
pub fn initial_profile<B: Backend>(x: Tensor<B, 2>) -> Tensor<B, 2> {
    x.mul_scalar(2.0 * PI).sin().mul_scalar(0.5)
}

/// Per-term weights applied when the terms are summed. Both boundary sides
/// share one weight.
#[derive(Clone, Copy, Debug)]
pub struct LossWeights {
    pub pde: f64,
    pub boundary: f64,
    pub initial_value: f64,
    pub initial_rate: f64,
}

impl Default for LossWeights {
    fn default() -> Self {
        Self {
            pde: 1.0,
            boundary: 1.0,
            initial_value: 1.0,
            initial_rate: 1.0,
        }
    }
}

/// Mean-squared residuals of every physical requirement, kept separate so
/// the two boundary sides can be inspected on their own.
#[derive(Debug)]
pub struct LossTerms<B: Backend> {
    pub pde: Tensor<B, 1>,
    pub boundary_x0: Tensor<B, 1>,
    pub boundary_x1: Tensor<B, 1>,
    pub initial_value: Tensor<B, 1>,
    pub initial_rate: Tensor<B, 1>,
}

impl<B: Backend> LossTerms<B> {
    /// Weighted sum of all terms as a single differentiable scalar.
    pub fn total(&self, weights: &LossWeights) -> Tensor<B, 1> {
        self.pde.clone().mul_scalar(weights.pde)
            + (self.boundary_x0.clone() + self.boundary_x1.clone()).mul_scalar(weights.boundary)
            + self.initial_value.clone().mul_scalar(weights.initial_value)
            + self.initial_rate.clone().mul_scalar(weights.initial_rate)
    }
}

/// Evaluates the field and its derivatives at the collocation points and
/// folds each residual into a mean-squared term.
///
/// The PDE residual is `f_xx - (1/C^2) * f_tt` at the interior grid; the
/// boundary terms pin `f` to zero along both spatial edges for every sampled
/// time; the initial terms pin the value to `g(x)` and the first time
/// derivative to zero along the `t = t0` slice.
pub fn residual_losses<B: Backend, F: Field<B>>(
    field: &F,
    grid: &CollocationGrid<B>,
    wave_speed: f64,
) -> LossTerms<B> {
    let f_xx = diff::second_partial(field, grid.x_grid.clone(), grid.t_grid.clone(), Axis::Space);
    let f_tt = diff::second_partial(field, grid.x_grid.clone(), grid.t_grid.clone(), Axis::Time);
    let residual = f_xx - f_tt.mul_scalar(1.0 / (wave_speed * wave_speed));
    let pde = MseLoss::new().forward(residual.clone(), residual.zeros_like(), Reduction::Mean);

    let x0 = grid.t_edge.ones_like().mul_scalar(grid.x_domain[0]);
    let x1 = grid.t_edge.ones_like().mul_scalar(grid.x_domain[1]);
    let f_x0 = diff::evaluate(field, x0, grid.t_edge.clone());
    let f_x1 = diff::evaluate(field, x1, grid.t_edge.clone());
    let boundary_x0 = MseLoss::new().forward(f_x0.clone(), f_x0.zeros_like(), Reduction::Mean);
    let boundary_x1 = MseLoss::new().forward(f_x1.clone(), f_x1.zeros_like(), Reduction::Mean);

    let t0 = grid.x_edge.ones_like().mul_scalar(grid.t_domain[0]);
    let f_t0 = diff::evaluate(field, grid.x_edge.clone(), t0.clone());
    let initial_value = MseLoss::new().forward(
        f_t0,
        initial_profile(grid.x_edge.clone()),
        Reduction::Mean,
    );
    let f_t = diff::first_partial(field, grid.x_edge.clone(), t0, Axis::Time);
    let initial_rate = MseLoss::new().forward(f_t.clone(), f_t.zeros_like(), Reduction::Mean);

    LossTerms {
        pde,
        boundary_x0,
        boundary_x1,
        initial_value,
        initial_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Jet;
    use crate::grid;
    use burn::backend::NdArray;

    type B = NdArray<f64>;

    fn scalar(t: &Tensor<B, 1>) -> f64 {
        t.clone().into_scalar()
    }

    /// Exact standing-wave solution `0.5 * sin(2*pi*x) * cos(2*pi*C*t)` of
    /// the wave equation on the unit domain.
    struct StandingWave {
        c: f64,
    }

    impl<Ba: Backend> Field<Ba> for StandingWave {
        fn eval_jet(&self, x: Jet<Ba>, t: Jet<Ba>) -> Jet<Ba> {
            let space = x.mul_scalar(2.0 * PI).sin().mul_scalar(0.5);
            let time = t.mul_scalar(2.0 * PI * self.c).cos();
            space * time
        }
    }

    /// Identically zero in value and in every derivative.
    struct MutedField;

    impl<Ba: Backend> Field<Ba> for MutedField {
        fn eval_jet(&self, x: Jet<Ba>, t: Jet<Ba>) -> Jet<Ba> {
            (x * t).mul_scalar(0.0)
        }
    }

    /// `f(x, t) = x^2`: zero at the left boundary, nonzero at the right one,
    /// with a constant spatial curvature of 2.
    struct SpaceRamp;

    impl<Ba: Backend> Field<Ba> for SpaceRamp {
        fn eval_jet(&self, x: Jet<Ba>, _t: Jet<Ba>) -> Jet<Ba> {
            x.clone() * x
        }
    }

    fn unit_grid() -> grid::CollocationGrid<B> {
        grid::build::<B>([0.0, 1.0], 9, [0.0, 1.0], 7, &Default::default())
    }

    #[test]
    fn zero_field_leaves_only_the_initial_value_term() {
        let terms = residual_losses(&MutedField, &unit_grid(), 1.0);
        assert!(scalar(&terms.pde) < 1e-12);
        assert!(scalar(&terms.boundary_x0) < 1e-12);
        assert!(scalar(&terms.boundary_x1) < 1e-12);
        assert!(scalar(&terms.initial_rate) < 1e-12);
        // Mean of g(x)^2 over the initial slice.
        assert!(scalar(&terms.initial_value) > 0.05);
    }

    #[test]
    fn exact_solution_has_vanishing_total_loss() {
        for c in [1.0, 2.0] {
            let terms = residual_losses(&StandingWave { c }, &unit_grid(), c);
            let total = scalar(&terms.total(&LossWeights::default()));
            assert!(total < 1e-9, "C={c}: total loss {total} not ~0");
        }
    }

    #[test]
    fn mismatched_wave_speed_leaves_a_pde_residual() {
        let terms = residual_losses(&StandingWave { c: 1.0 }, &unit_grid(), 2.0);
        assert!(scalar(&terms.pde) > 1e-2);
    }

    #[test]
    fn boundary_terms_are_computed_independently() {
        let terms = residual_losses(&SpaceRamp, &unit_grid(), 1.0);
        assert!(scalar(&terms.boundary_x0) < 1e-12);
        assert!((scalar(&terms.boundary_x1) - 1.0).abs() < 1e-9);
        // f_xx = 2 and f_tt = 0, so the PDE term is exactly 2^2.
        assert!((scalar(&terms.pde) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn weights_scale_their_terms_in_the_total() {
        let terms = residual_losses(&SpaceRamp, &unit_grid(), 1.0);
        let base = scalar(&terms.total(&LossWeights::default()));
        let halved = scalar(&terms.total(&LossWeights {
            pde: 0.5,
            ..Default::default()
        }));
        assert!((base - halved - 2.0).abs() < 1e-9);
    }
}
