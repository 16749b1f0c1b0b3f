//! field-display: live robot pose over a field image.
//!
//! Controls:
//! - H: Toggle the telemetry overlay
//! - Escape: Quit

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use eframe::egui;
use log::info;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use field_display::{AppConfig, FieldDisplayApp, FieldImage, Result, SourceKind};
use telemetry::{SimulatedPublisher, TableSource, TelemetryTable, UdpTableReceiver};

const TITLE: &str = "Robot Pose Display";

#[derive(Parser, Debug)]
#[command(name = "field-display", version, about = "Live robot pose display over a field image")]
struct Args {
    /// JSON config file
    #[arg(short, long, env = "FIELD_DISPLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Field image (PNG or JPEG), overrides the config
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// UDP address to receive telemetry on, overrides the config
    #[arg(short, long)]
    bind: Option<String>,

    /// Drive the display from the built-in simulated path
    #[arg(long)]
    simulate: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(image) = &args.image {
        config.field.image = Some(image.clone());
    }
    if let Some(bind) = &args.bind {
        config.telemetry.receiver.bind_addr = bind.clone();
    }
    if args.simulate {
        config.telemetry.source = SourceKind::Simulated;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    TermLogger::init(
        config.logging.level_filter()?,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let field = FieldImage::from_config(&config.field)?;
    let geometry = &config.field.geometry;
    info!(
        "Field {:.2} m x {:.2} m at {:.2} px/m",
        geometry.width_m(),
        geometry.height_m(),
        geometry.pixels_per_meter
    );

    let table = TelemetryTable::new();
    let running = Arc::new(AtomicBool::new(true));
    let namespace = config.telemetry.receiver.namespace.clone();
    let producer = match config.telemetry.source {
        SourceKind::Udp => {
            UdpTableReceiver::bind(&config.telemetry.receiver, table.clone(), running)?.spawn()?
        }
        SourceKind::Simulated => SimulatedPublisher::new(config.telemetry.simulation.clone())?
            .spawn(table.clone(), namespace.clone(), running)?,
    };
    let source = TableSource::new(table, &namespace);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([geometry.image_width_px as f32, geometry.image_height_px as f32])
            .with_resizable(true)
            .with_title(TITLE),
        ..Default::default()
    };
    eframe::run_native(
        TITLE,
        options,
        Box::new(move |cc| {
            Ok(Box::new(FieldDisplayApp::new(
                &cc.egui_ctx,
                &config,
                &field,
                Box::new(source),
                Some(producer),
            )))
        }),
    )?;

    info!("Display closed");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("field-display: {e}");
            ExitCode::FAILURE
        }
    }
}
