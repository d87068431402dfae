use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use band_terrain::borders::BorderSet;
use band_terrain::export::{blockage_ascii, render_map, save_gradient_strip, PngRenderer, StripOrientation};
use band_terrain::{BlendMode, ColorSource, DrawMode, MapConfig, MapError, MapGenerator};

#[derive(Parser, Debug)]
#[command(name = "band_terrain")]
#[command(about = "Generate banded noise terrain with passability walls")]
struct Args {
    /// JSON map configuration to start from
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Directory for the generated images
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Width of the map in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the map in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Random seed (uses random seed if neither this nor a config gives one)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Noise scale (larger = smoother features)
    #[arg(long)]
    scale: Option<f64>,

    /// Number of noise octaves
    #[arg(long)]
    octaves: Option<u32>,

    /// Amplitude decay per octave
    #[arg(long)]
    persistence: Option<f64>,

    /// Frequency multiplier per octave
    #[arg(long)]
    lacunarity: Option<f64>,

    /// Horizontal sampling offset
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<f64>,

    /// Vertical sampling offset
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<f64>,

    /// Comma separated border times, e.g. "0,0.35,0.6,1"
    #[arg(long, value_delimiter = ',')]
    borders: Option<Vec<f32>>,

    /// Gradient blend mode
    #[arg(long, value_enum)]
    blend: Option<BlendMode>,

    /// Layer written to display.png
    #[arg(long, value_enum)]
    draw_mode: Option<DrawMode>,

    /// Colour buffer source
    #[arg(long, value_enum)]
    color_source: Option<ColorSource>,

    /// Pull invalid noise parameters to the nearest valid value instead of failing
    #[arg(long)]
    clamp: bool,

    /// Print the blockage mask as text
    #[arg(long)]
    ascii: bool,

    /// Also write a vertical gradient preview strip
    #[arg(long)]
    gradient_strip: bool,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_config(args: &Args) -> Result<MapConfig, MapError> {
    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            MapConfig::load(path)?
        }
        None => MapConfig {
            noise: band_terrain::NoiseParams {
                seed: rand::random(),
                ..Default::default()
            },
            ..Default::default()
        },
    };

    let noise = &mut config.noise;
    if let Some(width) = args.width { noise.width = width; }
    if let Some(height) = args.height { noise.height = height; }
    if let Some(seed) = args.seed { noise.seed = seed; }
    if let Some(scale) = args.scale { noise.scale = scale; }
    if let Some(octaves) = args.octaves { noise.octaves = octaves; }
    if let Some(persistence) = args.persistence { noise.persistence = persistence; }
    if let Some(lacunarity) = args.lacunarity { noise.lacunarity = lacunarity; }
    if let Some(x) = args.offset_x { noise.offset.0 = x; }
    if let Some(y) = args.offset_y { noise.offset.1 = y; }

    if args.clamp {
        config.noise = config.noise.clamped();
    }
    if let Some(times) = &args.borders {
        config.borders = BorderSet::from_times(times)?;
    }
    if let Some(blend) = args.blend {
        config.gradient.set_blend_mode(blend);
    }
    if let Some(mode) = args.draw_mode {
        config.draw_mode = mode;
    }
    if let Some(source) = args.color_source {
        config.color_source = source;
    }
    Ok(config)
}

fn run(args: Args) -> Result<(), MapError> {
    let config = build_config(&args)?;
    info!("Generating map with seed: {}", config.noise.seed);
    info!("Map size: {}x{}", config.noise.width, config.noise.height);

    if let Some(path) = &args.save_config {
        config.save(path)?;
        info!(path = %path.display(), "saved configuration");
    }

    let generator = MapGenerator::new(config);
    let map = generator.generate()?;

    let classification = &map.classification;
    for band in 0..classification.band_count() {
        if let Some((lo, hi)) = classification.band_bounds(band) {
            info!("Band {}: {} ({:.3}) .. {} ({:.3})",
                band, classification.borders[band].name, lo, classification.borders[band + 1].name, hi);
        }
    }
    let total = map.width() * map.height();
    let blocked = classification.blocked_count();
    info!("Blocked cells: {} of {} ({:.1}%)", blocked, total, 100.0 * blocked as f64 / total as f64);

    let mut renderer = PngRenderer::new(&args.output)?;
    render_map(&map, &mut renderer)?;

    if args.gradient_strip {
        let path = args.output.join("gradient.png");
        save_gradient_strip(&generator.config().gradient, 256, StripOrientation::Vertical, &path)?;
        info!(path = %path.display(), "wrote gradient strip");
    }

    if args.ascii {
        print!("{}", blockage_ascii(map.blockage()));
    }

    if blocked == 0 && classification.band_count() > 1 {
        warn!("no band perimeter found; every cell is in the same band");
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
