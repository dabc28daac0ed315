//! Command-line front end: writes an icon and a banner next to each other.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use squircle_renderer::vector::rasterize_line;
use squircle_renderer::{
    Asset, FlowProfile, GenerationSettings, HexColor, LineSettings, RasterCompositor,
    VectorCompositor, VectorProfile, VectorSettings, generate_line_markup,
};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

const DEFAULT_BASE_FILENAME: &str = "my-image";
const DEFAULT_LINE_FILENAME: &str = "notion-line";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Icon and banner from a photo or artwork, over a muted backdrop.
    Image(RasterArgs),

    /// Icon and flat banner from a glyph image.
    IconSet(RasterArgs),

    /// Icon and banner from SVG markup, kept as SVG.
    Svg(VectorArgs),

    /// A thin rounded divider line as SVG.
    Line(LineArgs),

    /// Print the suggested background color for an image.
    Suggest {
        input: PathBuf,

        /// JSON flow profile overriding the built-in one.
        #[arg(long)]
        profile: Option<PathBuf>,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Directory the assets are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Base filename; defaults to the input's name.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args)]
struct RasterArgs {
    input: PathBuf,

    /// Background hex; defaults to a color suggested from the image.
    #[arg(long)]
    background: Option<String>,

    /// Corner radius in percent of the icon size.
    #[arg(long)]
    corner: Option<f64>,

    /// Inset of the artwork in pixels.
    #[arg(long)]
    padding: Option<f64>,

    /// JSON flow profile overriding the built-in one.
    #[arg(long)]
    profile: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct VectorArgs {
    input: PathBuf,

    #[arg(long)]
    background: Option<HexColor>,

    #[arg(long)]
    foreground: Option<HexColor>,

    /// Corner radius in document units.
    #[arg(long)]
    corner: Option<f64>,

    /// Padding around the view box in document units.
    #[arg(long)]
    padding: Option<f64>,

    /// JSON vector profile overriding the built-in one.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Also export PNG renditions.
    #[arg(long)]
    png: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct LineArgs {
    /// Length in pixels.
    #[arg(long, default_value_t = LineSettings::DEFAULT_WIDTH)]
    width: f64,

    /// Thickness in pixels.
    #[arg(long, default_value_t = LineSettings::DEFAULT_HEIGHT)]
    height: f64,

    #[arg(long, default_value_t = LineSettings::DEFAULT_RADIUS)]
    radius: f64,

    #[arg(long)]
    color: Option<HexColor>,

    /// Also export a PNG rendition.
    #[arg(long)]
    png: bool,

    /// Directory the line is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_LINE_FILENAME)]
    name: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("invalid profile {path}: {source}")]
    Profile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Render(#[from] squircle_renderer::Error),
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Image(args) => run_raster(args, FlowProfile::image_upload(), "background"),
        Command::IconSet(args) => run_raster(args, FlowProfile::icon_set(), "cover"),
        Command::Svg(args) => run_vector(args),
        Command::Line(args) => run_line(args),
        Command::Suggest { input, profile } => {
            let profile = match profile {
                Some(path) => load_profile(&path, FlowProfile::from_json)?,
                None => FlowProfile::image_upload(),
            };
            let image = decode(&input)?;
            println!("{}", RasterCompositor::new(profile).suggest_background(&image).to_hex());
            Ok(())
        }
    }
}

fn run_raster(
    args: RasterArgs,
    builtin: FlowProfile,
    banner_suffix: &str,
) -> Result<(), CliError> {
    let profile = match &args.profile {
        Some(path) => load_profile(path, FlowProfile::from_json)?,
        None => builtin,
    };
    let compositor = RasterCompositor::new(profile);
    let image = decode(&args.input)?;

    let defaults = compositor.profile().default_settings();
    let background = match args.background {
        Some(hex) => hex,
        None => compositor.suggest_background(&image).to_hex().to_string(),
    };
    let settings = GenerationSettings::new(
        background,
        args.corner.unwrap_or(defaults.corner_radius_percent),
        args.padding.unwrap_or(defaults.padding),
    );

    let assets = compositor.generate(&image, &settings)?;
    let base = base_name(&args.output, &args.input);
    write_asset(&args.output.out_dir, &base, "icon", &assets.icon)?;
    write_asset(&args.output.out_dir, &base, banner_suffix, &assets.banner)
}

fn run_vector(args: VectorArgs) -> Result<(), CliError> {
    let profile = match &args.profile {
        Some(path) => load_profile(path, VectorProfile::from_json)?,
        None => VectorProfile::default(),
    };
    let markup = fs::read_to_string(&args.input).map_err(|source| CliError::Read {
        path: args.input.clone(),
        source,
    })?;

    let defaults = VectorSettings::default();
    let settings = VectorSettings {
        background: args.background.unwrap_or(defaults.background),
        foreground: args.foreground.unwrap_or(defaults.foreground),
        corner_radius: args.corner.unwrap_or(defaults.corner_radius),
        padding: args.padding.unwrap_or(defaults.padding),
    };

    let compositor = VectorCompositor::new(profile);
    let assets = compositor.generate(&markup, &settings)?;

    let base = base_name(&args.output, &args.input);
    let out_dir = &args.output.out_dir;
    write_asset(out_dir, &base, "icon", &assets.icon())?;
    write_asset(out_dir, &base, "wallpaper", &assets.banner())?;

    if args.png {
        let raster = compositor.rasterize(&assets)?;
        write_asset(out_dir, &base, "icon", &raster.icon)?;
        write_asset(out_dir, &base, "wallpaper", &raster.banner)?;
    }
    Ok(())
}

fn run_line(args: LineArgs) -> Result<(), CliError> {
    let defaults = LineSettings::default();
    let settings = LineSettings {
        width: args.width,
        height: args.height,
        radius: args.radius,
        color: args.color.unwrap_or(defaults.color),
    };

    let base = sanitize_base_filename(&args.name, DEFAULT_LINE_FILENAME);
    write_file(
        &args.out_dir.join(format!("{base}.svg")),
        generate_line_markup(&settings).as_bytes(),
    )?;

    if args.png {
        let png = rasterize_line(&settings)?;
        write_file(&args.out_dir.join(format!("{base}.png")), png.as_bytes())?;
    }
    Ok(())
}

fn load_profile<T>(
    path: &Path,
    parse: fn(&str) -> Result<T, serde_json::Error>,
) -> Result<T, CliError> {
    let json = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&json).map_err(|source| CliError::Profile {
        path: path.to_path_buf(),
        source,
    })
}

fn decode(path: &Path) -> Result<image::RgbaImage, CliError> {
    let image = image::open(path).map_err(|source| CliError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

fn base_name(output: &OutputArgs, input: &Path) -> String {
    match &output.name {
        Some(name) => sanitize_base_filename(name, DEFAULT_BASE_FILENAME),
        None => {
            let file_name = input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            sanitize_base_filename(&file_name, DEFAULT_BASE_FILENAME)
        }
    }
}

fn write_asset(dir: &Path, base: &str, suffix: &str, asset: &Asset) -> Result<(), CliError> {
    let path = dir.join(format!("{base}-{suffix}.{}", asset.extension()));
    write_file(&path, asset.as_bytes())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    fs::write(path, bytes).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Combining diacritical marks left behind by compatibility decomposition.
fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Turns a file name into a safe, lowercase base for output files.
///
/// Accented letters keep their base letter (`Café` becomes `cafe`).
fn sanitize_base_filename(value: &str, fallback: &str) -> String {
    let stem = match value.rsplit_once('.') {
        Some((stem, extension)) if !extension.is_empty() && !extension.contains('/') => stem,
        _ => value,
    };

    let mut sanitized = String::with_capacity(stem.len());
    for c in stem.nfkd().filter(|c| !is_diacritic(*c)) {
        if c.is_ascii_alphanumeric() || c == '_' {
            sanitized.push(c.to_ascii_lowercase());
        } else if !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }

    let trimmed = sanitized.trim_matches('-');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_file_names() {
        let sanitize = |value| sanitize_base_filename(value, DEFAULT_BASE_FILENAME);
        assert_eq!(sanitize("My Photo (1).PNG"), "my-photo-1");
        assert_eq!(sanitize("archive.tar.gz"), "archive-tar");
        assert_eq!(sanitize("--logo__v2--.svg"), "logo__v2");
        assert_eq!(sanitize("사진.jpg"), DEFAULT_BASE_FILENAME);
        assert_eq!(sanitize(""), DEFAULT_BASE_FILENAME);
        assert_eq!(sanitize_base_filename("   ", DEFAULT_LINE_FILENAME), "notion-line");
    }

    #[test]
    fn accents_fold_to_base_letters() {
        let sanitize = |value| sanitize_base_filename(value, DEFAULT_BASE_FILENAME);
        assert_eq!(sanitize("Café.png"), "cafe");
        assert_eq!(sanitize("Crème Brûlée.jpg"), "creme-brulee");
        assert_eq!(sanitize("ﬁle①.svg"), "file1");
    }

    #[test]
    fn line_command_defaults() {
        let cli = Cli::try_parse_from(["squircle", "line", "--radius", "9"]).unwrap();
        let Command::Line(args) = cli.command else {
            panic!("expected line command");
        };
        assert_eq!(args.width, 1600.0);
        assert_eq!(args.height, 4.0);
        assert_eq!(args.radius, 9.0);
        assert_eq!(args.name, "notion-line");
        assert!(args.color.is_none());
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from([
            "squircle",
            "svg",
            "glyph.svg",
            "--background",
            "#abc",
            "--padding",
            "2",
            "--png",
        ])
        .unwrap();
        let Command::Svg(args) = cli.command else {
            panic!("expected svg command");
        };
        assert_eq!(args.background.unwrap().as_str(), "#aabbcc");
        assert_eq!(args.padding, Some(2.0));
        assert!(args.png);
    }
}
