use clap::{Parser, Subcommand};
use print_frame::config::{self, PrintConfig};
use print_frame::imaging::RustBackend;
use print_frame::metadata::MimeType;
use print_frame::session::Session;
use print_frame::store::AssetStore;
use print_frame::types::{Dimensions, SelectionMode, SelectionRect};
use print_frame::{naming, output};
use std::path::PathBuf;

/// Selection flags shared by `crop` and `export`.
#[derive(clap::Args, Clone)]
struct SelectionArgs {
    /// Interaction mode: crop the image, or place the image inside the frame
    #[arg(long, default_value = "crop")]
    mode: SelectionMode,

    /// Size the image is displayed at, e.g. 800x1000 (defaults to native size)
    #[arg(long, value_parser = parse_dimensions)]
    display: Option<Dimensions>,

    /// Left edge of the selection (percent, or display pixels with --pixels)
    #[arg(long, allow_hyphen_values = true)]
    x: Option<f64>,

    /// Top edge of the selection
    #[arg(long, allow_hyphen_values = true)]
    y: Option<f64>,

    /// Selection width
    #[arg(long)]
    width: Option<f64>,

    /// Selection height
    #[arg(long)]
    height: Option<f64>,

    /// Interpret --x/--y/--width/--height as display pixels instead of percent
    #[arg(long)]
    pixels: bool,
}

#[derive(Parser)]
#[command(name = "print-frame")]
#[command(about = "Crop photos to 8x10 and export print-resolution files")]
#[command(long_about = "\
Crop photos to 8x10 and export print-resolution files

Upload a photo once, then crop or place it and export a pixel-exact print
file. The crop always keeps the print ratio and is enlarged to the minimum
print size when it gets too small.

Typical session:

  print-frame upload dawn.jpg
  print-frame info
  print-frame crop --x 5 --y 5 --width 60
  print-frame export --x 5 --y 5 --width 60 --output prints
  print-frame export --mode placement --width 80 --format png

Selections are given in percent of the image (crop) or of the frame
(placement). Missing values keep the starting selection.

Run 'print-frame gen-config' to generate a documented print-frame.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding the current image
    #[arg(long, default_value = ".print-frame", global = true)]
    store: PathBuf,

    /// Directory containing print-frame.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store an image as the current image (PNG, JPG, or JPEG)
    Upload {
        file: PathBuf,
        /// Declared MIME type (defaults to the file extension)
        #[arg(long)]
        mime: Option<String>,
    },
    /// Show metadata of the current image
    Info,
    /// Show the corrected selection without exporting
    Crop(SelectionArgs),
    /// Render the selection and write the print file
    Export {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Output directory
        #[arg(long, default_value = ".")]
        output: PathBuf,
        /// Output format, overrides the config (jpeg or png)
        #[arg(long)]
        format: Option<print_frame::imaging::OutputFormat>,
    },
    /// Remove the current image
    Delete,
    /// Print a stock print-frame.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Upload { ref file, ref mime } => {
            let config = config::load_config(&cli.config_dir)?;
            let mime = match mime {
                Some(m) => MimeType::parse(m)?,
                None => MimeType::from_path(file)?,
            };
            let bytes = std::fs::read(file)?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.display().to_string());

            // Validate before storing so a rejected file never replaces the current one
            let mut session = Session::new(RustBackend::new(), config.session_settings());
            session.load(&name, mime, bytes)?;
            let Some(asset) = session.asset() else {
                return Err("image was not loaded".into());
            };
            AssetStore::open(&cli.store)?.save(&asset.name, asset.mime, asset.bytes())?;

            output::print_asset_info(asset, &session.source_quality());
            print_advisory(&session);
        }
        Command::Info => {
            let config = config::load_config(&cli.config_dir)?;
            let session = open_session(&cli.store, &config)?;
            if let Some(asset) = session.asset() {
                output::print_asset_info(asset, &session.source_quality());
            }
            print_advisory(&session);
        }
        Command::Crop(ref args) => {
            let config = config::load_config(&cli.config_dir)?;
            let mut session = open_session(&cli.store, &config)?;
            let rect = apply_selection(&mut session, args)?;
            let pixels = selection_pixels(&session, &rect);
            let advisory = match session.mode() {
                SelectionMode::Crop => session.advisory(),
                SelectionMode::Placement => None,
            };
            output::print_selection(session.mode(), &rect, pixels, advisory);
        }
        Command::Export {
            ref selection,
            output: ref output_dir,
            format,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let mut settings = config.export_settings();
            if let Some(format) = format {
                settings.format = format;
            }
            let mut session = open_session(&cli.store, &config)?;
            apply_selection(&mut session, selection)?;
            print_advisory(&session);

            session.compose()?;
            let path = session.export(output_dir, settings)?;
            let Some(composite) = session.composite() else {
                return Err("no composite to report".into());
            };
            let minimum = session
                .crop_region()
                .map(|c| c.geometry().minimum.dimensions())
                .ok_or("no image loaded")?;
            output::print_export_report(&path, composite, settings, &session.quality(), minimum);
        }
        Command::Delete => {
            let store = AssetStore::open(&cli.store)?;
            if store.delete()? {
                println!("Removed current image");
            } else {
                println!("No image stored");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the stored image into a fresh session.
fn open_session(
    store: &std::path::Path,
    config: &PrintConfig,
) -> Result<Session<RustBackend>, Box<dyn std::error::Error>> {
    let store = AssetStore::open(store)?;
    let Some((record, bytes)) = store.load()? else {
        return Err("No image uploaded. Run 'print-frame upload <file>' first.".into());
    };
    let mut session = Session::new(RustBackend::new(), config.session_settings());
    session.load(&record.name, record.mime, bytes)?;
    Ok(session)
}

/// Apply mode, display size, and any selection overrides, then finalize.
fn apply_selection(
    session: &mut Session<RustBackend>,
    args: &SelectionArgs,
) -> Result<SelectionRect, Box<dyn std::error::Error>> {
    session.set_mode(args.mode);
    if let Some(displayed) = args.display {
        session.set_display_size(displayed)?;
    }

    let has_override =
        args.x.is_some() || args.y.is_some() || args.width.is_some() || args.height.is_some();
    if has_override {
        let Some(current) = session.selection() else {
            return Err("no image loaded".into());
        };
        let candidate = if args.pixels {
            let displayed = session.display_size().unwrap_or(Dimensions::new(1, 1));
            let dw = displayed.width as f64;
            let dh = displayed.height as f64;
            SelectionRect::from_display_pixels(
                args.x.unwrap_or(current.x / 100.0 * dw),
                args.y.unwrap_or(current.y / 100.0 * dh),
                args.width.unwrap_or(current.width / 100.0 * dw),
                args.height.unwrap_or(current.height / 100.0 * dh),
                displayed,
            )
        } else {
            SelectionRect::new(
                args.x.unwrap_or(current.x),
                args.y.unwrap_or(current.y),
                args.width.unwrap_or(current.width),
                args.height.unwrap_or(current.height),
            )
        };
        session.propose(candidate)?;
    }
    Ok(session.complete_selection()?)
}

/// Selection size in source pixels (crop) or frame pixels (placement).
fn selection_pixels(session: &Session<RustBackend>, rect: &SelectionRect) -> (f64, f64) {
    match session.mode() {
        SelectionMode::Crop => session
            .asset()
            .map(|a| rect.native_size(a.metadata.dimensions()))
            .unwrap_or_default(),
        SelectionMode::Placement => session
            .placement_region()
            .map(|p| rect.native_size(p.frame()))
            .unwrap_or_default(),
    }
}

fn print_advisory(session: &Session<RustBackend>) {
    for line in output::format_advisory(session.advisory()) {
        println!("{}", line);
    }
}

/// Parse `WIDTHxHEIGHT` in whole pixels.
fn parse_dimensions(text: &str) -> Result<Dimensions, String> {
    let size = naming::parse_physical_size(text)?;
    if size.width.fract() != 0.0 || size.height.fract() != 0.0 {
        return Err(format!("pixel sizes must be whole numbers, got '{text}'"));
    }
    Ok(Dimensions::new(size.width as u32, size.height as u32))
}
