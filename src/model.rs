use burn::module::Module;
use burn::nn::{Linear, LinearConfig, Tanh};
use burn::prelude::Backend;
use burn::tensor::Tensor;

use crate::diff::{Field, Jet};

/// Layer widths of the field network, from the `(x, t)` pair to the scalar
/// field value.
const LAYER_WIDTHS: [usize; 5] = [2, 16, 32, 16, 1];

/// Scalar field approximator `f(x, t)`.
///
/// A multilayer perceptron with tanh between the affine layers. The
/// activation must be smooth: the wave-equation residual takes second
/// derivatives of the output with respect to the inputs, and those vanish
/// identically for piecewise-linear activations.
#[derive(Module, Debug)]
pub struct FieldModel<B: Backend> {
    linears: Vec<Linear<B>>,
    activation: Tanh,
}

impl<B: Backend> FieldModel<B> {
    pub fn new(device: &B::Device) -> Self {
        let linears = LAYER_WIDTHS
            .windows(2)
            .map(|pair| LinearConfig::new(pair[0], pair[1]).init(device))
            .collect();
        Self {
            linears,
            activation: Tanh::new(),
        }
    }

    /// Evaluates the field at a batch of points given as `[N, 1]` space and
    /// time columns.
    pub fn forward(&self, x: Tensor<B, 2>, t: Tensor<B, 2>) -> Tensor<B, 2> {
        assert_eq!(x.dims()[0], t.dims()[0], "x and t batches must match");
        let mut features = Tensor::cat(vec![x, t], 1);
        for i in 0..(self.linears.len() - 1) {
            features = self.linears[i].forward(features);
            features = self.activation.forward(features);
        }
        self.linears.last().unwrap().forward(features)
    }

    /// Forward pass carrying input derivatives alongside the values.
    ///
    /// An affine layer maps the derivative components through its weight
    /// matrix alone (the bias is constant along any input direction); tanh
    /// advances them by the chain rule.
    pub fn forward_jet(&self, x: Jet<B>, t: Jet<B>) -> Jet<B> {
        assert_eq!(
            x.value.dims()[0],
            t.value.dims()[0],
            "x and t batches must match"
        );
        let mut features = Jet::cat(vec![x, t], 1);
        for i in 0..(self.linears.len() - 1) {
            features = affine(&self.linears[i], features).tanh();
        }
        affine(self.linears.last().unwrap(), features)
    }
}

fn affine<B: Backend>(layer: &Linear<B>, jet: Jet<B>) -> Jet<B> {
    Jet {
        value: layer.forward(jet.value),
        first: jet.first.matmul(layer.weight.val()),
        second: jet.second.matmul(layer.weight.val()),
    }
}

impl<B: Backend> Field<B> for FieldModel<B> {
    fn eval_jet(&self, x: Jet<B>, t: Jet<B>) -> Jet<B> {
        self.forward_jet(x, t)
    }

    fn eval(&self, x: Tensor<B, 2>, t: Tensor<B, 2>) -> Tensor<B, 2> {
        self.forward(x, t)
    }
}
