//! Try-on session wiring, tracking events and adaptive quality tests


use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::{face_output, hands_output, MockCamera, ScriptedDetector};
use wearable_tryon::config::Config;
use wearable_tryon::detector::{DetectorOutput, TrackerQuality};
use wearable_tryon::error::CameraError;
use wearable_tryon::headless::HeadlessEngine;
use wearable_tryon::landmarks::Handedness;
use wearable_tryon::replay::{Recording, ReplayCamera, ReplayDetector};
use wearable_tryon::session::{ProductCategory, TryOnSession};
use wearable_tryon::Error;

fn config_with_model(url: &str) -> Config {
    let mut config = Config::default();
    config.renderer.model_url = url.to_string();
    config
}

fn replay_session(
    category: ProductCategory,
    frames: Vec<DetectorOutput>,
    config: &Config,
    engine: &HeadlessEngine,
) -> TryOnSession {
    let recording = Arc::new(Recording::new(frames));
    let detector = Box::new(ReplayDetector::new(Arc::clone(&recording)));
    let mut session = TryOnSession::new(category, detector, engine.loader(), config).unwrap();
    session
        .initialize(Box::new(ReplayCamera::new(recording)), &mut engine.scene())
        .unwrap();
    session
}

fn tracking_log(session: &mut TryOnSession) -> Rc<RefCell<Vec<bool>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    session.on_tracking(move |tracking| sink.borrow_mut().push(tracking));
    log
}

fn quality_log(session: &mut TryOnSession) -> Rc<RefCell<Vec<TrackerQuality>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    session.on_quality_change(move |quality| sink.borrow_mut().push(quality));
    log
}

#[test]
fn test_eyewear_session_tracks_face() {
    let engine = HeadlessEngine::new();
    let frames = vec![
        face_output(0.0),
        face_output(0.01),
        DetectorOutput::default(),
        face_output(0.0),
    ];
    let mut session = replay_session(ProductCategory::Eyewear, frames, &config_with_model("glasses.glb"), &engine);
    let events = tracking_log(&mut session);

    let mut visible = Vec::new();
    while session.pump().unwrap() {
        visible.push(session.render_tick());
    }

    assert_eq!(visible, vec![true, true, false, true]);
    // only changes are reported
    assert_eq!(*events.borrow(), vec![true, false, true]);
    assert_eq!(session.frames_processed(), 4);
    assert_eq!(session.tracker_quality(), None);
    assert_eq!(session.renderer().name(), "eyewear");
}

#[test]
fn test_bracelet_session_tracks_hands() {
    let engine = HeadlessEngine::new();
    let frames = vec![hands_output(&[(Handedness::Right, 0.4)]), hands_output(&[])];
    let mut session = replay_session(ProductCategory::Bracelet, frames, &config_with_model("bracelet.glb"), &engine);

    assert!(session.pump().unwrap());
    assert!(session.render_tick());
    assert_eq!(engine.drawn_nodes()[0].url, "bracelet.glb");

    assert!(session.pump().unwrap());
    assert!(!session.render_tick());
    assert!(engine.drawn_nodes().is_empty());
}

#[test]
fn test_face_results_do_not_drive_hand_products() {
    let engine = HeadlessEngine::new();
    let mut session = replay_session(
        ProductCategory::Ring,
        vec![face_output(0.0)],
        &config_with_model("ring.glb"),
        &engine,
    );
    session.pump().unwrap();
    assert!(!session.render_tick());
}

#[test]
fn test_adaptive_quality_upgrades_when_fast() {
    let engine = HeadlessEngine::new();
    let mut config = config_with_model("watch.glb");
    config.adaptive_quality.window_size = 2;
    config.adaptive_quality.latency_budget_ms = 10_000.0;

    let (detector, calls) = ScriptedDetector::new(Vec::new());
    let mut session = TryOnSession::new(ProductCategory::Watch, Box::new(detector), engine.loader(), &config).unwrap();
    session
        .initialize(Box::new(MockCamera::working().0), &mut engine.scene())
        .unwrap();
    assert_eq!(session.tracker_quality(), Some(TrackerQuality::Medium));
    let changes = quality_log(&mut session);

    session.pump().unwrap();
    session.pump().unwrap();
    assert_eq!(session.tracker_quality(), Some(TrackerQuality::High));

    // already at the top: no further reconfiguration
    session.pump().unwrap();
    session.pump().unwrap();
    assert_eq!(calls.configurations.borrow().len(), 2);
    assert_eq!(*changes.borrow(), vec![TrackerQuality::High]);
}

#[test]
fn test_adaptive_quality_downgrades_when_slow() {
    let engine = HeadlessEngine::new();
    let mut config = config_with_model("watch.glb");
    config.adaptive_quality.window_size = 2;
    config.adaptive_quality.latency_budget_ms = 1.0;

    let (detector, _) = ScriptedDetector::new(Vec::new());
    let detector = detector.with_latency(Duration::from_millis(5));
    let mut session = TryOnSession::new(ProductCategory::Watch, Box::new(detector), engine.loader(), &config).unwrap();
    session
        .initialize(Box::new(MockCamera::working().0), &mut engine.scene())
        .unwrap();
    let changes = quality_log(&mut session);

    session.pump().unwrap();
    session.pump().unwrap();
    assert_eq!(session.tracker_quality(), Some(TrackerQuality::Low));
    assert_eq!(*changes.borrow(), vec![TrackerQuality::Low]);
}

#[test]
fn test_adaptive_quality_disabled() {
    let engine = HeadlessEngine::new();
    let mut config = config_with_model("watch.glb");
    config.adaptive_quality.enabled = false;
    config.adaptive_quality.window_size = 1;

    let (detector, calls) = ScriptedDetector::new(Vec::new());
    let mut session = TryOnSession::new(ProductCategory::Watch, Box::new(detector), engine.loader(), &config).unwrap();
    session
        .initialize(Box::new(MockCamera::working().0), &mut engine.scene())
        .unwrap();

    let changes = quality_log(&mut session);
    for _ in 0..5 {
        session.pump().unwrap();
    }
    assert_eq!(session.tracker_quality(), Some(TrackerQuality::Medium));
    assert!(changes.borrow().is_empty());
    assert_eq!(calls.configurations.borrow().len(), 1);
}

#[test]
fn test_model_failure_leaves_camera_untouched() {
    let engine = HeadlessEngine::new();
    engine.fail_url("missing.glb");
    let (detector, _) = ScriptedDetector::new(Vec::new());
    let mut session = TryOnSession::new(
        ProductCategory::Necklace,
        Box::new(detector),
        engine.loader(),
        &config_with_model("missing.glb"),
    )
    .unwrap();
    let (camera, camera_calls) = MockCamera::working();

    assert!(matches!(
        session.initialize(Box::new(camera), &mut engine.scene()),
        Err(Error::ModelLoad { .. })
    ));
    assert_eq!(camera_calls.opens.get(), 0);
}

#[test]
fn test_camera_failure_releases_model() {
    let engine = HeadlessEngine::new();
    let (detector, _) = ScriptedDetector::new(Vec::new());
    let mut session = TryOnSession::new(
        ProductCategory::Earring,
        Box::new(detector),
        engine.loader(),
        &config_with_model("earring.glb"),
    )
    .unwrap();
    let (camera, _) = MockCamera::failing(CameraError::DeviceNotFound("no camera".to_string()));

    let err = session.initialize(Box::new(camera), &mut engine.scene()).unwrap_err();
    assert!(matches!(err.camera_error(), Some(CameraError::DeviceNotFound(_))));
    assert_eq!(engine.live_count(), 0);
}

#[test]
fn test_stop_hides_and_start_resumes() {
    let engine = HeadlessEngine::new();
    let (detector, _) = ScriptedDetector::new(vec![face_output(0.0), face_output(0.0)]);
    let mut session = TryOnSession::new(
        ProductCategory::Eyewear,
        Box::new(detector),
        engine.loader(),
        &config_with_model("glasses.glb"),
    )
    .unwrap();
    session
        .initialize(Box::new(MockCamera::working().0), &mut engine.scene())
        .unwrap();

    session.pump().unwrap();
    assert!(session.render_tick());

    session.stop();
    assert!(!session.pump().unwrap());
    assert!(!session.render_tick());

    session.start().unwrap();
    session.pump().unwrap();
    assert!(session.render_tick());
}

#[test]
fn test_destroy_releases_everything() {
    let engine = HeadlessEngine::new();
    let (detector, calls) = ScriptedDetector::new(vec![face_output(0.0)]);
    let mut session = TryOnSession::new(
        ProductCategory::Earring,
        Box::new(detector),
        engine.loader(),
        &config_with_model("earring.glb"),
    )
    .unwrap();
    let (camera, camera_calls) = MockCamera::working();
    session.initialize(Box::new(camera), &mut engine.scene()).unwrap();
    session.pump().unwrap();
    session.render_tick();
    assert_eq!(engine.drawn_nodes().len(), 2);

    session.destroy();
    session.destroy();
    assert_eq!(engine.live_count(), 0);
    assert!(calls.closed.get());
    assert_eq!(camera_calls.stops.get(), 1);
    assert!(!session.is_tracking());
    assert!(matches!(
        session.initialize(Box::new(MockCamera::working().0), &mut engine.scene()),
        Err(Error::InvalidState(_))
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let engine = HeadlessEngine::new();
    let mut config = config_with_model("glasses.glb");
    config.smoothing.eyewear = Some("median".to_string());
    let (detector, _) = ScriptedDetector::new(Vec::new());

    assert!(matches!(
        TryOnSession::new(ProductCategory::Eyewear, Box::new(detector), engine.loader(), &config),
        Err(Error::ConfigError(_))
    ));
}
