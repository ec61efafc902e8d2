//! Deterministic collocation grid over the space-time domain.

use burn::prelude::Backend;
use burn::tensor::Tensor;

/// Collocation points shared by every loss term.
///
/// `x_grid`/`t_grid` hold the flattened outer product of the two edge
/// sequences and are the interior points the PDE residual is evaluated at.
/// `x_edge`/`t_edge` are the one-dimensional slices reused for the initial
/// and boundary terms. The domain bounds are carried along so the loss
/// assembler pins the boundary and initial slices to the exact same extent
/// the grid was sampled from.
#[derive(Clone, Debug)]
pub struct CollocationGrid<B: Backend> {
    pub x_domain: [f64; 2],
    pub t_domain: [f64; 2],
    pub x_grid: Tensor<B, 2>,
    pub t_grid: Tensor<B, 2>,
    pub x_edge: Tensor<B, 2>,
    pub t_edge: Tensor<B, 2>,
}

/// Builds the grid: `nx` evenly spaced spatial samples, `nt` temporal ones,
/// and their row-major outer product flattened to `[nx * nt, 1]` columns.
/// Deterministic; the same arguments always produce bit-identical tensors.
pub fn build<B: Backend>(
    x_domain: [f64; 2],
    nx: usize,
    t_domain: [f64; 2],
    nt: usize,
    device: &B::Device,
) -> CollocationGrid<B> {
    assert!(nx >= 2 && nt >= 2, "need at least two samples per axis");
    let xs = linspace(x_domain[0], x_domain[1], nx);
    let ts = linspace(t_domain[0], t_domain[1], nt);

    let mut x_flat = Vec::with_capacity(nx * nt);
    let mut t_flat = Vec::with_capacity(nx * nt);
    for &x in &xs {
        for &t in &ts {
            x_flat.push(x);
            t_flat.push(t);
        }
    }

    CollocationGrid {
        x_domain,
        t_domain,
        x_grid: column(x_flat, device),
        t_grid: column(t_flat, device),
        x_edge: column(xs, device),
        t_edge: column(ts, device),
    }
}

fn column<B: Backend>(values: Vec<f64>, device: &B::Device) -> Tensor<B, 2> {
    let n = values.len();
    Tensor::<B, 1>::from_floats(values.as_slice(), device).reshape([n, 1])
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}
