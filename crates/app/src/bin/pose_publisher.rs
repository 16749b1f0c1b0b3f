//! pose-publisher: send the simulated elliptical path to a display over UDP.

use std::net::UdpSocket;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use log::{debug, info};
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use field_display::{AppConfig, Result};
use telemetry::SimulatedPublisher;

#[derive(Parser, Debug)]
#[command(name = "pose-publisher", version, about = "Publish a simulated robot path over UDP")]
struct Args {
    /// Display address to send to
    #[arg(short, long, default_value = "127.0.0.1:5810")]
    target: String,

    /// JSON config file; only the telemetry.simulation section is used
    #[arg(short, long, env = "FIELD_DISPLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Omit VX and VY so the display has to derive velocity
    #[arg(long)]
    no_velocity: bool,

    /// Publish Omega as well
    #[arg(long)]
    omega: bool,

    /// Standard deviation of position noise (m)
    #[arg(long)]
    noise: Option<f64>,

    /// Noise RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many publications
    #[arg(short = 'n', long)]
    count: Option<u64>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    config.logging.level = args.log_level.clone();
    TermLogger::init(
        config.logging.level_filter()?,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let mut sim = config.telemetry.simulation;
    if args.no_velocity {
        sim.publish_velocity = false;
    }
    if args.omega {
        sim.publish_omega = true;
    }
    if let Some(noise) = args.noise {
        sim.position_noise_std = noise;
    }
    if let Some(seed) = args.seed {
        sim.seed = seed;
    }

    let mut publisher = SimulatedPublisher::new(sim)?;
    let socket = UdpSocket::bind("0.0.0.0:0").map_err(telemetry::TelemetryError::from)?;
    let period = publisher.period();

    let c = publisher.config();
    info!(
        "Publishing to {} at {:.0} Hz: ellipse at ({:.2}, {:.2}) m, radii {:.1} x {:.1} m",
        args.target,
        1.0 / c.period,
        c.center_x,
        c.center_y,
        c.radius_x,
        c.radius_y
    );
    info!(
        "Velocity keys: {}, Omega key: {}, noise: {} m",
        c.publish_velocity, c.publish_omega, c.position_noise_std
    );

    let mut sent: u64 = 0;
    while args.count.is_none_or(|n| sent < n) {
        let publication = publisher.next_publication();
        let datagram = publication.to_datagram()?;
        socket
            .send_to(&datagram, &args.target)
            .map_err(telemetry::TelemetryError::from)?;
        sent += 1;

        debug!(
            "X={:6.3} m Y={:6.3} m Theta={:6.2}°",
            publication.x,
            publication.y,
            publication.theta.to_degrees().rem_euclid(360.0)
        );
        thread::sleep(period);
    }

    info!("Sent {sent} publications");
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pose-publisher: {e}");
            ExitCode::FAILURE
        }
    }
}
