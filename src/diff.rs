//! Derivative extraction by forward-mode propagation.
//!
//! Second derivatives of the field with respect to its inputs are carried
//! through the computation as second-order jets: every intermediate value
//! travels together with its first and second derivative along one seeded
//! input direction, advanced by the chain and product rules. All three
//! components are ordinary tensor operations, so on a tracking backend the
//! derivatives stay on the computational graph and remain differentiable
//! with respect to the network parameters. Reverse passes are never nested;
//! the training loss built from these derivatives needs a single `backward`.

use std::ops::{Add, Mul, Sub};

use burn::prelude::Backend;
use burn::tensor::Tensor;

/// Input axis a partial derivative is taken with respect to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Space,
    Time,
}

/// A batch of values with their first and second derivatives along one
/// input direction.
///
/// Construction goes through [`Jet::variable`] (the seeded direction) and
/// [`Jet::constant`]; every input enters the computation through one of the
/// two, so a derivative can never be requested against an untracked tensor.
#[derive(Clone, Debug)]
pub struct Jet<B: Backend> {
    pub value: Tensor<B, 2>,
    pub first: Tensor<B, 2>,
    pub second: Tensor<B, 2>,
}

impl<B: Backend> Jet<B> {
    /// The input being differentiated along: unit first derivative per row.
    pub fn variable(value: Tensor<B, 2>) -> Self {
        let first = value.ones_like();
        let second = value.zeros_like();
        Self {
            value,
            first,
            second,
        }
    }

    /// An input held fixed along the seeded direction.
    pub fn constant(value: Tensor<B, 2>) -> Self {
        let first = value.zeros_like();
        let second = value.zeros_like();
        Self {
            value,
            first,
            second,
        }
    }

    /// Concatenates componentwise, like `Tensor::cat`.
    pub fn cat(jets: Vec<Jet<B>>, dim: usize) -> Self {
        Self {
            value: Tensor::cat(jets.iter().map(|jet| jet.value.clone()).collect(), dim),
            first: Tensor::cat(jets.iter().map(|jet| jet.first.clone()).collect(), dim),
            second: Tensor::cat(jets.into_iter().map(|jet| jet.second).collect(), dim),
        }
    }

    pub fn mul_scalar(self, scalar: f64) -> Self {
        Self {
            value: self.value.mul_scalar(scalar),
            first: self.first.mul_scalar(scalar),
            second: self.second.mul_scalar(scalar),
        }
    }

    /// Chain rule for an elementwise function with derivatives `d1`, `d2`
    /// evaluated at `self.value`.
    fn unary(self, value: Tensor<B, 2>, d1: Tensor<B, 2>, d2: Tensor<B, 2>) -> Self {
        let first_sq = self.first.clone() * self.first.clone();
        Self {
            value,
            first: self.first * d1.clone(),
            second: self.second * d1 + first_sq * d2,
        }
    }

    pub fn sin(self) -> Self {
        let value = self.value.clone().sin();
        let d1 = self.value.clone().cos();
        let d2 = value.clone().neg();
        self.unary(value, d1, d2)
    }

    pub fn cos(self) -> Self {
        let value = self.value.clone().cos();
        let d1 = self.value.clone().sin().neg();
        let d2 = value.clone().neg();
        self.unary(value, d1, d2)
    }

    pub fn tanh(self) -> Self {
        let value = self.value.clone().tanh();
        let d1 = (value.clone() * value.clone()).neg().add_scalar(1.0);
        let d2 = value.clone().mul_scalar(-2.0) * d1.clone();
        self.unary(value, d1, d2)
    }
}

impl<B: Backend> Add for Jet<B> {
    type Output = Jet<B>;

    fn add(self, rhs: Jet<B>) -> Jet<B> {
        Jet {
            value: self.value + rhs.value,
            first: self.first + rhs.first,
            second: self.second + rhs.second,
        }
    }
}

impl<B: Backend> Sub for Jet<B> {
    type Output = Jet<B>;

    fn sub(self, rhs: Jet<B>) -> Jet<B> {
        Jet {
            value: self.value - rhs.value,
            first: self.first - rhs.first,
            second: self.second - rhs.second,
        }
    }
}

impl<B: Backend> Mul for Jet<B> {
    type Output = Jet<B>;

    /// Product rule: `(uv)'' = u''v + 2u'v' + uv''`.
    fn mul(self, rhs: Jet<B>) -> Jet<B> {
        let value = self.value.clone() * rhs.value.clone();
        let first = self.first.clone() * rhs.value.clone() + rhs.first.clone() * self.value.clone();
        let cross = (self.first * rhs.first).mul_scalar(2.0);
        let second = self.second * rhs.value + cross + rhs.second * self.value;
        Jet {
            value,
            first,
            second,
        }
    }
}

/// Scalar field of two inputs, evaluated on `[N, 1]` batch columns.
///
/// The derivative helpers require rows to be independent: seeding every row
/// of one input with a unit direction isolates per-row derivatives only when
/// `eval_jet` never couples different batch indices.
pub trait Field<B: Backend> {
    fn eval_jet(&self, x: Jet<B>, t: Jet<B>) -> Jet<B>;

    /// Plain forward evaluation. Overridden where a cheaper value-only path
    /// exists.
    fn eval(&self, x: Tensor<B, 2>, t: Tensor<B, 2>) -> Tensor<B, 2> {
        self.eval_jet(Jet::constant(x), Jet::constant(t)).value
    }
}

/// Forward evaluation helper, symmetric with the partial extractors below.
pub fn evaluate<B: Backend, F: Field<B>>(
    field: &F,
    x: Tensor<B, 2>,
    t: Tensor<B, 2>,
) -> Tensor<B, 2> {
    field.eval(x, t)
}

fn jet_along<B: Backend, F: Field<B>>(
    field: &F,
    x: Tensor<B, 2>,
    t: Tensor<B, 2>,
    axis: Axis,
) -> Jet<B> {
    let (x, t) = match axis {
        Axis::Space => (Jet::variable(x), Jet::constant(t)),
        Axis::Time => (Jet::constant(x), Jet::variable(t)),
    };
    field.eval_jet(x, t)
}

/// First partial derivative of the field with respect to one input axis,
/// per row.
pub fn first_partial<B: Backend, F: Field<B>>(
    field: &F,
    x: Tensor<B, 2>,
    t: Tensor<B, 2>,
    axis: Axis,
) -> Tensor<B, 2> {
    jet_along(field, x, t, axis).first
}

/// Second partial derivative with respect to the same input axis, twice.
pub fn second_partial<B: Backend, F: Field<B>>(
    field: &F,
    x: Tensor<B, 2>,
    t: Tensor<B, 2>,
    axis: Axis,
) -> Tensor<B, 2> {
    jet_along(field, x, t, axis).second
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;

    type B = NdArray<f64>;

    /// f(x, t) = x^2 * t^3, with closed-form partials at every order.
    struct CubicSurface;

    impl<Ba: Backend> Field<Ba> for CubicSurface {
        fn eval_jet(&self, x: Jet<Ba>, t: Jet<Ba>) -> Jet<Ba> {
            let x2 = x.clone() * x;
            let t3 = t.clone() * t.clone() * t;
            x2 * t3
        }
    }

    /// f(x, t) = sin(x) * cos(t), exercising the trigonometric jet rules.
    struct Ripple;

    impl<Ba: Backend> Field<Ba> for Ripple {
        fn eval_jet(&self, x: Jet<Ba>, t: Jet<Ba>) -> Jet<Ba> {
            x.sin() * t.cos()
        }
    }

    /// Ignores the spatial input entirely.
    struct TimeOnly;

    impl<Ba: Backend> Field<Ba> for TimeOnly {
        fn eval_jet(&self, _x: Jet<Ba>, t: Jet<Ba>) -> Jet<Ba> {
            t.clone() * t.clone() * t
        }
    }

    const XS: [f64; 4] = [0.25, 0.5, 1.0, 2.0];
    const TS: [f64; 4] = [1.0, 0.5, 2.0, 3.0];

    fn columns(device: &NdArrayDevice) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let x = Tensor::<B, 1>::from_floats(XS.as_slice(), device).reshape([4, 1]);
        let t = Tensor::<B, 1>::from_floats(TS.as_slice(), device).reshape([4, 1]);
        (x, t)
    }

    fn assert_close(actual: Tensor<B, 2>, expected: impl Fn(f64, f64) -> f64) {
        let values = actual.into_data().to_vec::<f64>().unwrap();
        for (i, &value) in values.iter().enumerate() {
            let want = expected(XS[i], TS[i]);
            assert!(
                (value - want).abs() < 1e-9,
                "row {i}: got {value}, want {want}"
            );
        }
    }

    #[test]
    fn evaluate_returns_the_field_value() {
        let device = Default::default();
        let (x, t) = columns(&device);
        let f = evaluate(&CubicSurface, x, t);
        assert_close(f, |x, t| x * x * t * t * t);
    }

    #[test]
    fn first_time_partial_matches_analytic_value() {
        let device = Default::default();
        let (x, t) = columns(&device);
        let d = first_partial(&CubicSurface, x, t, Axis::Time);
        assert_close(d, |x, t| 3.0 * x * x * t * t);
    }

    #[test]
    fn first_space_partial_matches_analytic_value() {
        let device = Default::default();
        let (x, t) = columns(&device);
        let d = first_partial(&CubicSurface, x, t, Axis::Space);
        assert_close(d, |x, t| 2.0 * x * t * t * t);
    }

    #[test]
    fn second_space_partial_matches_analytic_value() {
        let device = Default::default();
        let (x, t) = columns(&device);
        let d = second_partial(&CubicSurface, x, t, Axis::Space);
        assert_close(d, |_, t| 2.0 * t * t * t);
    }

    #[test]
    fn second_time_partial_matches_analytic_value() {
        let device = Default::default();
        let (x, t) = columns(&device);
        let d = second_partial(&CubicSurface, x, t, Axis::Time);
        assert_close(d, |x, t| 6.0 * x * x * t);
    }

    #[test]
    fn trigonometric_partials_match_analytic_values() {
        let device = Default::default();
        let (x, t) = columns(&device);
        let d_t = first_partial(&Ripple, x.clone(), t.clone(), Axis::Time);
        assert_close(d_t, |x, t| -x.sin() * t.sin());
        let d_xx = second_partial(&Ripple, x.clone(), t.clone(), Axis::Space);
        assert_close(d_xx, |x, t| -x.sin() * t.cos());
        let d_tt = second_partial(&Ripple, x, t, Axis::Time);
        assert_close(d_tt, |x, t| -x.sin() * t.cos());
    }

    #[test]
    fn ignored_input_has_exactly_zero_partials() {
        let device = Default::default();
        let (x, t) = columns(&device);
        let d1 = first_partial(&TimeOnly, x.clone(), t.clone(), Axis::Space);
        let d2 = second_partial(&TimeOnly, x, t, Axis::Space);
        for d in [d1, d2] {
            let values = d.into_data().to_vec::<f64>().unwrap();
            assert!(values.iter().all(|&v| v == 0.0), "got {values:?}");
        }
    }
}
