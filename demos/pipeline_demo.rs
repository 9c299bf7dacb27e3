//! Runs the whole pipeline on one mesh and logs every scene.
//!
//! Run with: cargo run --example `pipeline_demo` -- [mesh.obj|mesh.ply] [config.json]
//!
//! Without arguments the demo looks for `finn.obj` in the working directory
//! and falls back to a unit box when it is missing. Set `RUST_LOG=info` to
//! see the stage reports.

use meshpipe::{present, LogSink, NativeEngine, Pipeline, PipelineConfig};

fn main() -> meshpipe::Result<()> {
    meshpipe::init();

    let mut args = std::env::args().skip(1);
    let mesh_path = args.next().unwrap_or_else(|| "finn.obj".to_string());
    let config = match args.next() {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let pipeline = Pipeline::new(NativeEngine::new(), config)?;
    let output = pipeline.run(&mesh_path)?;

    let mut sink = LogSink::new();
    present(&output, &mut sink);

    let report = output.reconstruction.report;
    println!(
        "{}: {} samples, {} reconstructed triangles, {} voxels (size {:.3}), {} points kept by the clip",
        if output.source.fallback_used {
            "fallback box"
        } else {
            mesh_path.as_str()
        },
        output.sampled.len(),
        output.reconstruction.mesh.num_triangles(),
        output.voxelization.grid.len(),
        output.voxelization.voxel_size,
        output.clipped.len(),
    );
    println!(
        "cleanup removed {} low-density vertices, {} degenerate and {} duplicated triangles",
        report.low_density_vertices, report.degenerate_triangles, report.duplicated_triangles,
    );
    println!(
        "extremes: min #{} {}, max #{} {}",
        output.extrema.min_index,
        output.extrema.min_point,
        output.extrema.max_index,
        output.extrema.max_point,
    );
    Ok(())
}
