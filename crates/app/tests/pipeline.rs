//! End-to-end: simulated publisher -> table -> source -> estimator -> scene.

use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;
use estimation::{Estimator, EstimatorConfig};
use field_display::scene::{SceneShape, VELOCITY_COLOR};
use field_display::{AppConfig, DisplayPipeline};
use projection::{project, unproject, PixelRect, ViewTransform};
use telemetry::{
    qualified_key, Publication, ReceiverConfig, SampleSource, SimulatedPublisher, SimulationConfig,
    TableSource, TelemetryTable, UdpTableReceiver, DEFAULT_NAMESPACE,
};

fn write(table: &TelemetryTable, publication: &Publication, at: Instant) {
    let values: Vec<(String, f64)> = publication
        .values()
        .into_iter()
        .map(|(k, v)| (qualified_key(DEFAULT_NAMESPACE, k), v))
        .collect();
    table.put_many(&values, at);
}

#[test]
fn derived_velocity_tracks_published_velocity() {
    let withheld = SimulationConfig { publish_velocity: false, ..Default::default() };
    let mut derived_sim = SimulatedPublisher::new(withheld).unwrap();
    let mut truth_sim = SimulatedPublisher::new(SimulationConfig::default()).unwrap();

    let epoch = Instant::now();
    let table = TelemetryTable::new();
    let mut source = TableSource::with_epoch(table.clone(), DEFAULT_NAMESPACE, epoch);
    let mut estimator = Estimator::new(EstimatorConfig::default().unsmoothed());

    for k in 0..200u64 {
        let publication = derived_sim.next_publication();
        let truth = truth_sim.next_publication();
        write(&table, &publication, epoch + Duration::from_millis(20 * k));

        let state = estimator.update(source.poll().unwrap());
        assert!(state.is_finite());
        if k > 0 {
            assert_abs_diff_eq!(state.vx, truth.vx.unwrap(), epsilon = 0.25);
            assert_abs_diff_eq!(state.vy, truth.vy.unwrap(), epsilon = 0.25);
            // Heading advances 0.05 rad every 20 ms through the wrap
            assert_abs_diff_eq!(state.omega, 2.5, epsilon = 1e-6);
        }
    }
}

#[test]
fn published_velocity_passes_through() {
    let mut sim = SimulatedPublisher::new(SimulationConfig::default()).unwrap();
    let epoch = Instant::now();
    let table = TelemetryTable::new();
    let mut source = TableSource::with_epoch(table.clone(), DEFAULT_NAMESPACE, epoch);
    let mut estimator = Estimator::new(EstimatorConfig::default());

    for k in 0..20u64 {
        let publication = sim.next_publication();
        write(&table, &publication, epoch + Duration::from_millis(20 * k));
        let state = estimator.update(source.poll().unwrap());
        assert_eq!(state.vx, publication.vx.unwrap());
        assert_eq!(state.vy, publication.vy.unwrap());
    }
}

#[test]
fn repeated_poll_holds_rates() {
    let config = SimulationConfig { publish_velocity: false, ..Default::default() };
    let mut sim = SimulatedPublisher::new(config).unwrap();
    let epoch = Instant::now();
    let table = TelemetryTable::new();
    let mut source = TableSource::with_epoch(table.clone(), DEFAULT_NAMESPACE, epoch);
    let mut estimator = Estimator::new(EstimatorConfig::default());

    for k in 0..5u64 {
        write(&table, &sim.next_publication(), epoch + Duration::from_millis(20 * k));
        estimator.update(source.poll().unwrap());
    }
    let settled = estimator.current();
    // The display ticks faster than the publisher: same publication again
    let again = estimator.update(source.poll().unwrap());
    assert_eq!(again.vx, settled.vx);
    assert_eq!(again.vy, settled.vy);
    assert_eq!(again.omega, settled.omega);
}

#[test]
fn projected_path_round_trips() {
    let config = AppConfig::default();
    let geometry = &config.field.geometry;
    let transform = ViewTransform::fit(geometry, PixelRect::new(0.0, 40.0, 1024.0, 700.0));
    let mut sim = SimulatedPublisher::new(SimulationConfig::default()).unwrap();
    let mut estimator = Estimator::new(config.estimator.clone());

    for k in 0..130 {
        let p = sim.next_publication();
        let state = estimator.update(posecore::RawSample::pose(p.x, p.y, p.theta, k as f64 * 0.02));
        let pixel = project(&state, &transform);
        let (x, y) = unproject(pixel.position.x, pixel.position.y, &transform);
        assert_abs_diff_eq!(x, p.x, epsilon = 1e-9);
        assert_abs_diff_eq!(y, p.y, epsilon = 1e-9);
        assert!(transform.image_rect(geometry).contains(pixel.position.x, pixel.position.y));
    }
}

#[test]
fn display_pipeline_over_udp() {
    let table = TelemetryTable::new();
    let running = Arc::new(AtomicBool::new(true));
    let receiver_config = ReceiverConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        disconnect_timeout: 5.0,
        ..Default::default()
    };
    let receiver = UdpTableReceiver::bind(&receiver_config, table.clone(), running).unwrap();
    let addr = receiver.local_addr().unwrap();
    let mut handle = receiver.spawn().unwrap();

    let mut pipeline = DisplayPipeline::new(
        &AppConfig::default(),
        Box::new(TableSource::new(table.clone(), DEFAULT_NAMESPACE)),
    );
    pipeline.resize(PixelRect::sized(1340.0, 670.0));

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    let mut sim = SimulatedPublisher::new(SimulationConfig::default()).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut scene = pipeline.tick(0.016);
    while pipeline.state().x == 0.0 && Instant::now() < deadline {
        let publication = sim.next_publication();
        sender.send_to(&publication.to_datagram().unwrap(), addr).unwrap();
        thread::sleep(Duration::from_millis(20));
        scene = pipeline.tick(0.02);
    }
    handle.shutdown();

    let state = pipeline.state();
    assert!(state.x > 5.0 && state.x < 11.5);
    assert!(state.speed() > 1.0);
    let velocity_segments = scene
        .markers
        .iter()
        .filter(|s| matches!(s, SceneShape::Segment { color, .. } if *color == VELOCITY_COLOR))
        .count();
    assert_eq!(velocity_segments, 3);
}
