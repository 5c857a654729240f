//! optica CLI - render demo scenes and inspect ray trajectories.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use optica_math::{Point3, Vec3};
use optica_raytrace::{Colour, Ray, TraceSettings, Tracer};

mod camera;
mod config;
mod render;
mod scenes;

use camera::PinholeCamera;
use config::RenderConfig;

const DEFAULT_LOGGING_LEVEL: &str = "info";

/// Worker stack size; deep traces recurse once per trace level.
const WORKER_STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "optica")]
#[command(about = "Recursive ray tracer for meta-optical scenes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a demo scene to a PNG file
    Render {
        /// TOML render configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Demo scene name (see `optica scenes`)
        #[arg(short, long)]
        scene: Option<String>,
        /// Image width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Image height in pixels
        #[arg(long)]
        height: Option<u32>,
        /// Number of surface interactions per primary ray
        #[arg(long)]
        max_trace_level: Option<u32>,
        /// Output PNG file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Trace a single ray and print its trajectory as JSON
    Trajectory {
        /// Demo scene name
        #[arg(short, long, default_value = "mirrors")]
        scene: String,
        /// Ray origin as x,y,z
        #[arg(long, value_parser = parse_triple, allow_hyphen_values = true)]
        origin: [f64; 3],
        /// Ray direction as x,y,z
        #[arg(long, value_parser = parse_triple, allow_hyphen_values = true)]
        direction: [f64; 3],
        /// Number of surface interactions
        #[arg(long)]
        max_trace_level: Option<u32>,
    },
    /// List the demo scenes
    Scenes,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOGGING_LEVEL)).init();
    let cli = Cli::parse();

    let pool = rayon::ThreadPoolBuilder::new()
        .stack_size(WORKER_STACK_SIZE)
        .build()
        .context("starting worker threads")?;

    pool.install(|| match cli.command {
        Commands::Render {
            config,
            scene,
            width,
            height,
            max_trace_level,
            output,
        } => {
            let mut config = match config {
                Some(path) => RenderConfig::load(&path)?,
                None => RenderConfig::default(),
            };
            if let Some(scene) = scene {
                config.scene = scene;
            }
            if let Some(width) = width {
                config.width = width;
            }
            if let Some(height) = height {
                config.height = height;
            }
            if let Some(level) = max_trace_level {
                config.trace.max_trace_level = level;
            }
            if output.is_some() {
                config.output = output;
            }
            render_to_file(&config)
        }
        Commands::Trajectory {
            scene,
            origin,
            direction,
            max_trace_level,
        } => {
            let mut settings = TraceSettings::default();
            if let Some(level) = max_trace_level {
                settings.max_trace_level = level;
            }
            print_trajectory(&scene, origin, direction, settings)
        }
        Commands::Scenes => {
            for (name, description) in scenes::SCENES {
                println!("{name:<10} {description}");
            }
            Ok(())
        }
    })
}

fn render_to_file(config: &RenderConfig) -> Result<()> {
    let output = config
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.png", config.scene)));
    let background = config.background.map(|[r, g, b]| Colour::new(r, g, b));
    let demo = scenes::build(&config.scene, background)
        .with_context(|| format!("building scene '{}'", config.scene))?;
    let camera_config = config.camera.as_ref().unwrap_or(&demo.camera);
    let camera = PinholeCamera::new(camera_config, config.width, config.height)?;
    let tracer = Tracer::new(&demo.scene, config.trace.clone());

    log::info!(
        "rendering '{}' at {}x{}, max trace level {}",
        config.scene,
        config.width,
        config.height,
        tracer.settings().max_trace_level
    );
    let start = Instant::now();
    let image = render::render_image(&tracer, &camera, config.width, config.height);
    log::info!("traced {} rays in {:.2?}", config.width * config.height, start.elapsed());

    image
        .save(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn print_trajectory(scene: &str, origin: [f64; 3], direction: [f64; 3], settings: TraceSettings) -> Result<()> {
    let demo = scenes::build(scene, None).with_context(|| format!("building scene '{scene}'"))?;
    let ray = Ray::try_new(Point3::from(origin), Vec3::from(direction))
        .context("ray direction must be non-zero and finite")?;
    let tracer = Tracer::new(&demo.scene, settings);
    let trajectory = tracer.trace_trajectory(&ray);
    log::info!("{} bounces, exhausted: {}", trajectory.bounces(), trajectory.exhausted());
    println!("{}", serde_json::to_string_pretty(&trajectory)?);
    Ok(())
}

fn parse_triple(s: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let &[x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{s}'"));
    };
    let parse = |v: &str| v.parse::<f64>().map_err(|e| format!("'{v}': {e}"));
    Ok([parse(x)?, parse(y)?, parse(z)?])
}
