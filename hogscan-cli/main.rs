use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use hogscan_cli::{
    draw_corners, draw_detection, load_config, load_gray, save_map, to_rgb, HogScan, HogScanResult,
};
use hogscan_core::init_thread_pool;
use hogscan_detect::{DetectorConfig, WindowSize};
use hogscan_filters::{corner_peaks, EdgeDetector, HarrisDetector};
use log::{error, info, LevelFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Edge maps, Harris corners and multi-scale HOG template search", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Gaussian smoothing, gradient and non-maximum suppression
    Edges {
        input: PathBuf,
        /// Where to write the thinned edge map
        output: PathBuf,

        #[arg(long, default_value_t = 5)]
        kernel_size: usize,

        #[arg(long, default_value_t = 1.4)]
        sigma: f32,
    },

    /// Harris corner response and its peaks
    Harris {
        input: PathBuf,

        /// Image with the corners circled
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Raw response map
        #[arg(long)]
        response: Option<PathBuf>,

        #[arg(long, default_value_t = 3)]
        window_size: usize,

        #[arg(short, long, default_value_t = 0.04)]
        k: f32,

        /// Minimum distance between reported corners
        #[arg(long, default_value_t = 5)]
        min_distance: usize,

        /// Corners must exceed this fraction of the strongest response
        #[arg(long, default_value_t = 0.1)]
        threshold_rel: f32,
    },

    /// Find a template in a scene across a pyramid of scales
    Detect {
        scene: PathBuf,
        template: PathBuf,

        /// Scene with the best window outlined
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Response map of the winning level
        #[arg(long)]
        heatmap: Option<PathBuf>,

        /// JSON or TOML detector configuration; the template is resized to
        /// its window
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Preset::Default)]
        preset: Preset,

        /// Overrides the step of the preset or configuration
        #[arg(long)]
        step: Option<usize>,

        /// Overrides the pyramid scale of the preset or configuration
        #[arg(long)]
        scale: Option<f32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preset {
    Default,
    Coarse,
    Fine,
    Exhaustive,
}

impl Preset {
    fn config(self, window: WindowSize) -> DetectorConfig {
        match self {
            Preset::Default => DetectorConfig::new(window),
            Preset::Coarse => DetectorConfig::coarse_preset(window),
            Preset::Fine => DetectorConfig::fine_preset(window),
            Preset::Exhaustive => DetectorConfig::exhaustive_preset(window),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> HogScanResult<()> {
    if let Some(n) = cli.threads {
        init_thread_pool(n)?;
    }

    match cli.command {
        Commands::Edges {
            input,
            output,
            kernel_size,
            sigma,
        } => {
            let image = load_gray(&input)?;
            let detector = EdgeDetector::new(kernel_size, sigma)?;
            let t0 = Instant::now();
            let edges = detector.detect(&image)?;
            info!("edge map in {:.2?}", t0.elapsed());
            save_map(&edges, &output)?;
            println!("Saved edge map as {}", output.display());
        }

        Commands::Harris {
            input,
            output,
            response,
            window_size,
            k,
            min_distance,
            threshold_rel,
        } => {
            let image = load_gray(&input)?;
            let harris = HarrisDetector::new(window_size, k)?;

            let t0 = Instant::now();
            let response_map = harris.response(&image)?;
            let corners = corner_peaks(&response_map, min_distance, threshold_rel)?;
            info!("harris corners in {:.2?}", t0.elapsed());
            println!("Detected {} corners", corners.len());
            for corner in &corners {
                println!("{}\t{}\t{:.6}", corner.row, corner.col, corner.response);
            }

            if let Some(path) = response {
                save_map(&response_map, &path)?;
            }
            if let Some(path) = output {
                let mut canvas = to_rgb(&image);
                draw_corners(&mut canvas, &corners);
                canvas.save(&path)?;
                println!("Saved result image as {}", path.display());
            }
        }

        Commands::Detect {
            scene,
            template,
            output,
            heatmap,
            config,
            preset,
            step,
            scale,
        } => {
            let scene_image = load_gray(&scene)?;
            let template_image = load_gray(&template)?;

            let mut config = match config {
                Some(path) => load_config(path)?,
                None => preset.config(WindowSize::of(&template_image)),
            };
            if let Some(step) = step {
                config.step_size = step;
            }
            if let Some(scale) = scale {
                config.scale = scale;
            }
            if let Some(n) = cli.threads {
                config.n_threads = n;
            }
            info!("{}", config.summary());

            let window = config.window;
            let pipeline = HogScan::new(config)?;
            let t0 = Instant::now();
            let result = pipeline.detect(&scene_image, &template_image)?;
            let (row, col) = result.original_position();
            println!("Time taken: {:.2?}", t0.elapsed());
            println!(
                "Best score {:.4} at level scale {:.3}: row {}, col {} (input frame: row {:.1}, col {:.1})",
                result.score, result.scale, result.row, result.col, row, col
            );

            if let Some(path) = heatmap {
                save_map(&result.response_map, &path)?;
            }
            if let Some(path) = output {
                let mut canvas = to_rgb(&scene_image);
                draw_detection(&mut canvas, &result, window);
                canvas.save(&path)?;
                println!("Saved result image as {}", path.display());
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
