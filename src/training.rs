//! Training loop: gradient descent on the composite physics loss.

use burn::backend::{Autodiff, NdArray};
use burn::module::Module;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::Backend;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use plotters::prelude::*;
use std::time::Instant;

use crate::MODEL_FILENAME;
use crate::cli::TrainArgs;
use crate::grid;
use crate::model::FieldModel;
use crate::pinn;

/// Backend the model is trained on. The derivative components of the loss
/// are built from ordinary tensor operations on this backend, so one
/// backward pass per epoch reaches the parameters through them.
pub type TrainingBackend = Autodiff<NdArray<f64>>;

/// Runs the full gradient-descent loop and returns the trained model along
/// with the total loss recorded at every epoch.
///
/// The grid is sampled once and reused; each epoch assembles the loss, runs
/// one backward pass over the parameters and applies one Adam update. A
/// non-finite loss is not detected or recovered, it simply shows up in the
/// reported values.
pub fn fit(args: &TrainArgs) -> (FieldModel<TrainingBackend>, Vec<f64>) {
    let device = Default::default();
    TrainingBackend::seed(args.seed);

    let grid = grid::build::<TrainingBackend>(
        [args.x_min, args.x_max],
        args.n_x,
        [args.t_min, args.t_max],
        args.n_t,
        &device,
    );
    let weights = args.weights();
    let mut model = FieldModel::<TrainingBackend>::new(&device);
    let mut optim = AdamConfig::new().init();

    let mut history = Vec::with_capacity(args.epochs);
    for epoch in 0..args.epochs {
        let terms = pinn::residual_losses(&model, &grid, args.wave_speed);
        let total = terms.total(&weights);
        let total_value = total.clone().into_scalar();
        history.push(total_value);
        if epoch % args.report_every == 0 {
            println!("epoch={}, loss={:.6}", epoch, total_value);
        }

        let grads = total.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(args.learning_rate, model, grads);
    }
    (model, history)
}

/// `train` subcommand: fit the model, plot the loss history, save the model.
pub fn run(args: &TrainArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "training on a {}x{} collocation grid, C={}, backend: NdArray (CPU)",
        args.n_x, args.n_t, args.wave_speed
    );
    let training_start = Instant::now();
    let (model, history) = fit(args);
    println!("training finished in {:.2?}", training_start.elapsed());

    plot_loss_history(&history)?;
    println!("=> loss plot written to 'loss_graph.png'");

    model.save_file(
        MODEL_FILENAME,
        &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
    )?;
    println!("=> model saved to '{}'", MODEL_FILENAME);
    Ok(())
}

/// Writes the per-epoch loss as a log-scale line plot. A zero-epoch run has
/// nothing to plot and writes no file.
fn plot_loss_history(history: &[f64]) -> Result<(), Box<dyn std::error::Error>> {
    if history.is_empty() {
        return Ok(());
    }
    let root = BitMapBackend::new("loss_graph.png", (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let max_log = history.first().copied().unwrap_or(1.0).log10() + 0.5;
    let min_log = history
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min)
        .max(1e-12)
        .log10()
        - 0.5;
    let mut chart = ChartBuilder::on(&root)
        .caption("Loss History", ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0..history.len(), min_log..max_log)?;
    chart
        .configure_mesh()
        .y_desc("Loss (log10 scale)")
        .x_desc("Epoch")
        .draw()?;
    chart
        .draw_series(LineSeries::new(
            history
                .iter()
                .enumerate()
                .map(|(i, &value)| (i, value.max(1e-12).log10())),
            &RED,
        ))?
        .label("Total Loss")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}
