//! Queries a trained model over a regular grid and renders the field.

use burn::backend::NdArray;
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use plotters::prelude::*;
use std::path::Path;
use std::time::Instant;

use crate::MODEL_FILENAME;
use crate::cli::InferArgs;
use crate::grid;
use crate::model::FieldModel;

type InferenceBackend = NdArray<f64>;

const FIELD_IMAGE: &str = "wave_field.png";

/// `infer` subcommand: load the saved model, evaluate it over the configured
/// space-time domain and write a heatmap of `f(x, t)`.
pub fn run(args: &InferArgs) -> Result<(), Box<dyn std::error::Error>> {
    let device = Default::default();

    if !Path::new(MODEL_FILENAME).exists() {
        return Err(format!(
            "model file '{}' not found; run the 'train' command first",
            MODEL_FILENAME
        )
        .into());
    }

    println!("loading model from '{}'", MODEL_FILENAME);
    let model = FieldModel::<InferenceBackend>::new(&device).load_file(
        MODEL_FILENAME,
        &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
        &device,
    )?;

    let inference_start = Instant::now();
    let grid = grid::build::<InferenceBackend>(
        [args.x_min, args.x_max],
        args.n_x,
        [args.t_min, args.t_max],
        args.n_t,
        &device,
    );
    let field = model.forward(grid.x_grid.clone(), grid.t_grid.clone());
    let values: Vec<f64> = field
        .into_data()
        .to_vec()
        .map_err(|e| format!("tensor data conversion failed: {e:?}"))?;
    println!(
        "evaluated {}x{}={} grid points in {:.2?}",
        args.n_x,
        args.n_t,
        args.n_x * args.n_t,
        inference_start.elapsed()
    );

    render_field(&values, args)?;
    println!("=> field rendered to '{}'", FIELD_IMAGE);
    Ok(())
}

/// Draws the field values as colored cells over the (t, x) plane.
fn render_field(values: &[f64], args: &InferArgs) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(FIELD_IMAGE, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = (hi - lo).max(1e-12);
    let mut chart = ChartBuilder::on(&root)
        .caption("f(x, t)", ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(args.t_min..args.t_max, args.x_min..args.x_max)?;
    chart.configure_mesh().x_desc("t").y_desc("x").draw()?;

    let dx = (args.x_max - args.x_min) / args.n_x as f64;
    let dt = (args.t_max - args.t_min) / args.n_t as f64;
    chart.draw_series(
        (0..args.n_x)
            .flat_map(|i| (0..args.n_t).map(move |j| (i, j)))
            .map(|(i, j)| {
                let shade = ((values[i * args.n_t + j] - lo) / span * 255.0) as u8;
                let color = RGBColor(shade, 64, 255 - shade);
                let x = args.x_min + i as f64 * dx;
                let t = args.t_min + j as f64 * dt;
                Rectangle::new([(t, x), (t + dt, x + dx)], color.filled())
            }),
    )?;
    root.present()?;
    Ok(())
}
