//! Renderer anchoring, smoothing, visibility, LOD and disposal tests


use nalgebra::Vector3;
use test_helpers::{face, hand};
use wearable_tryon::headless::HeadlessEngine;
use wearable_tryon::landmarks::{FaceLandmarks, HandLandmarks, Handedness};
use wearable_tryon::renderers::earring::EarringAnchor;
use wearable_tryon::renderers::eyewear::EyewearAnchor;
use wearable_tryon::renderers::necklace::NecklaceAnchor;
use wearable_tryon::renderers::watch::WatchAnchor;
use wearable_tryon::renderers::{
    AnchorGeometry, EarringRenderer, EyewearRenderer, LodLevel, LodUrls, NecklaceRenderer, ProductRenderer,
    RendererConfig, RingRenderer, TrackingFrame, WatchRenderer,
};
use wearable_tryon::Error;

const TOLERANCE: f64 = 1e-9;

fn attached<R: ProductRenderer>(engine: &HeadlessEngine, mut renderer: R, url: &str) -> R {
    renderer.load_model(url).unwrap();
    renderer.attach_to_scene(&mut engine.scene()).unwrap();
    renderer
}

fn eyewear(engine: &HeadlessEngine, config: RendererConfig) -> EyewearRenderer {
    attached(engine, EyewearRenderer::new(config, engine.loader()).unwrap(), "glasses.glb")
}

/// Feed `start` once, then `target` `steps` times; returns (initial error, residual)
fn face_residual<A, R>(renderer: &mut R, anchor: &A, start: &FaceLandmarks, target: &FaceLandmarks, steps: i32) -> (f64, f64)
where
    A: AnchorGeometry,
    R: ProductRenderer,
{
    let goal = anchor.face_target(target, 1.0).unwrap().position;
    renderer.update_from_face_tracking(Some(start));
    let e0 = (renderer.current_pose().unwrap().position - goal).norm();
    for _ in 0..steps {
        renderer.update_from_face_tracking(Some(target));
    }
    (e0, (renderer.current_pose().unwrap().position - goal).norm())
}

#[test]
fn test_model_starts_hidden_with_defaults() {
    let engine = HeadlessEngine::new();
    let config = RendererConfig {
        scale_factor: 2.0,
        default_position: [0.0, 0.1, 0.0],
        enable_shadows: false,
        ..RendererConfig::default()
    };
    let renderer = eyewear(&engine, config);

    let node = renderer.active_node().unwrap();
    assert!(!node.is_visible());
    assert!(!renderer.is_visible());
    assert_eq!(node.scale(), Vector3::repeat(2.0));
    assert_eq!(node.position(), Vector3::new(0.0, 0.1, 0.0));

    let state = engine.nodes().pop().unwrap();
    assert!(state.attached);
    assert!(!state.flags.cast_shadow);
    assert!(state.flags.occlusion);
    assert!(engine.drawn_nodes().is_empty());
}

#[test]
fn test_first_transform_equals_raw_target() {
    let engine = HeadlessEngine::new();
    let mut renderer = eyewear(&engine, RendererConfig::default());
    let face = face(0.1);

    renderer.update_from_face_tracking(Some(&face));
    let target = EyewearAnchor.face_target(&face, 1.0).unwrap();

    assert!(renderer.is_visible());
    assert_eq!(renderer.current_pose(), Some(target));
    let node = renderer.active_node().unwrap();
    assert_eq!(node.position(), target.position);
    assert_eq!(node.rotation(), target.rotation);
    assert_eq!(node.scale(), Vector3::repeat(target.scale));
    assert!(node.is_visible());
}

#[test]
fn test_lost_target_hides_on_next_update() {
    let engine = HeadlessEngine::new();
    let mut renderer = eyewear(&engine, RendererConfig::default());

    renderer.update_from_face_tracking(Some(&face(0.0)));
    assert_eq!(engine.drawn_nodes().len(), 1);

    renderer.update_from_face_tracking(None);
    assert!(!renderer.is_visible());
    assert!(renderer.current_pose().is_none());
    assert!(engine.drawn_nodes().is_empty());

    let mut watch = attached(&engine, WatchRenderer::new(RendererConfig::default(), engine.loader()).unwrap(), "watch.glb");
    watch.update_from_hand_tracking(&[hand(Handedness::Left, 0.5)]);
    assert!(watch.is_visible());
    watch.update_from_hand_tracking(&[]);
    assert!(!watch.is_visible());
}

#[test]
fn test_inapplicable_source_always_hides() {
    let engine = HeadlessEngine::new();
    let mut glasses = eyewear(&engine, RendererConfig::default());
    glasses.update_from_face_tracking(Some(&face(0.0)));
    glasses.update_from_hand_tracking(&[hand(Handedness::Left, 0.5)]);
    assert!(!glasses.is_visible());

    let mut ring = attached(&engine, RingRenderer::new(RendererConfig::default(), engine.loader()).unwrap(), "ring.glb");
    ring.update_from_hand_tracking(&[hand(Handedness::Left, 0.5)]);
    assert!(ring.is_visible());
    ring.update_from_face_tracking(Some(&face(0.0)));
    assert!(!ring.is_visible());
}

#[test]
fn test_uniform_update_dispatches_by_source() {
    let engine = HeadlessEngine::new();
    let mut glasses = eyewear(&engine, RendererConfig::default());
    let face = face(0.0);
    let hands = [hand(Handedness::Left, 0.5)];

    glasses.update(&TrackingFrame {
        face: Some(&face),
        hands: &hands,
    });
    assert!(glasses.is_visible());

    glasses.update(&TrackingFrame {
        face: None,
        hands: &hands,
    });
    assert!(!glasses.is_visible());
}

#[test]
fn test_smoothing_contracts_geometrically() {
    let engine = HeadlessEngine::new();
    let start = face(-0.1);
    let goal = face(0.1);

    for steps in [1, 3, 8] {
        // eyewear 0.4
        let mut glasses = eyewear(&engine, RendererConfig::default());
        let (e0, residual) = face_residual(&mut glasses, &EyewearAnchor, &start, &goal, steps);
        assert!((residual - 0.6f64.powi(steps) * e0).abs() < TOLERANCE);

        // necklace 0.25
        let mut necklace = attached(
            &engine,
            NecklaceRenderer::new(RendererConfig::default(), engine.loader()).unwrap(),
            "necklace.glb",
        );
        let (e0, residual) = face_residual(&mut necklace, &NecklaceAnchor, &start, &goal, steps);
        assert!((residual - 0.75f64.powi(steps) * e0).abs() < TOLERANCE);

        // earring 0.3
        let mut earrings = attached(
            &engine,
            EarringRenderer::new(RendererConfig::default(), engine.loader()).unwrap(),
            "earring.glb",
        );
        let (e0, residual) = face_residual(&mut earrings, &EarringAnchor, &start, &goal, steps);
        assert!((residual - 0.7f64.powi(steps) * e0).abs() < TOLERANCE);
    }
}

#[test]
fn test_watch_smoothing_contracts_geometrically() {
    let engine = HeadlessEngine::new();
    let mut watch = attached(&engine, WatchRenderer::new(RendererConfig::default(), engine.loader()).unwrap(), "watch.glb");
    let start = [hand(Handedness::Left, 0.3)];
    let goal_hands = [hand(Handedness::Left, 0.6)];
    let goal = WatchAnchor::default().hand_target(&goal_hands, 1.0).unwrap();

    watch.update_from_hand_tracking(&start);
    let e0 = (watch.current_pose().unwrap().position - goal.position).norm();
    for _ in 0..5 {
        watch.update_from_hand_tracking(&goal_hands);
    }
    let residual = (watch.current_pose().unwrap().position - goal.position).norm();
    assert!((residual - 0.7f64.powi(5) * e0).abs() < TOLERANCE);
}

#[test]
fn test_reacquired_target_does_not_fly_in() {
    let engine = HeadlessEngine::new();
    let mut renderer = eyewear(&engine, RendererConfig::default());

    renderer.update_from_face_tracking(Some(&face(-0.2)));
    renderer.update_from_face_tracking(None);

    let face = face(0.2);
    renderer.update_from_face_tracking(Some(&face));
    assert_eq!(renderer.current_pose(), EyewearAnchor.face_target(&face, 1.0));
}

#[test]
fn test_smoothing_override() {
    let engine = HeadlessEngine::new();
    let config = RendererConfig {
        smoothing: Some("none".to_string()),
        ..RendererConfig::default()
    };
    let mut renderer = eyewear(&engine, config);

    renderer.update_from_face_tracking(Some(&face(-0.1)));
    let face = face(0.1);
    renderer.update_from_face_tracking(Some(&face));
    assert_eq!(renderer.current_pose(), EyewearAnchor.face_target(&face, 1.0));

    let bad = RendererConfig {
        smoothing: Some("exponential:2".to_string()),
        ..RendererConfig::default()
    };
    assert!(matches!(
        EyewearRenderer::new(bad, engine.loader()),
        Err(Error::ConfigError(_))
    ));
}

#[test]
fn test_eyewear_scale_scenario() {
    let engine = HeadlessEngine::new();
    let config = RendererConfig {
        scale_factor: 1.2,
        ..RendererConfig::default()
    };
    let mut renderer = eyewear(&engine, config);
    let face = face(0.0);

    // eyes at (0.4, 0.4) and (0.6, 0.4)
    assert!(face.rotation.roll.abs() < TOLERANCE);
    assert!((face.inter_eye_distance - 0.2).abs() < TOLERANCE);

    renderer.update_from_face_tracking(Some(&face));
    let expected = 1.2 * face.inter_ear_distance * 10.0;
    assert!((renderer.current_pose().unwrap().scale - expected).abs() < TOLERANCE);
    assert!((renderer.active_node().unwrap().scale().x - expected).abs() < TOLERANCE);
}

#[test]
fn test_watch_picks_left_hand() {
    let engine = HeadlessEngine::new();
    let mut watch = attached(&engine, WatchRenderer::new(RendererConfig::default(), engine.loader()).unwrap(), "watch.glb");
    let hands: Vec<HandLandmarks> = vec![hand(Handedness::Right, 0.2), hand(Handedness::Left, 0.7)];

    watch.update_from_hand_tracking(&hands);
    let left_only = WatchAnchor::default().hand_target(&hands[1..], 1.0).unwrap();
    assert_eq!(watch.current_pose(), Some(left_only));
}

#[test]
fn test_earring_pair_mirrors() {
    let engine = HeadlessEngine::new();
    let config = RendererConfig {
        scale_factor: 1.5,
        ..RendererConfig::default()
    };
    let mut earrings = attached(&engine, EarringRenderer::new(config, engine.loader()).unwrap(), "earring.glb");

    // mirrored from load time
    let primary = earrings.active_node().unwrap();
    let mirror = earrings.mirror_node().unwrap();
    assert_eq!(mirror.scale(), Vector3::new(-1.5, 1.5, 1.5));
    assert!(!mirror.is_visible());
    assert_eq!(engine.node(mirror.id()).unwrap().cloned_from, Some(primary.id()));

    let face = face(0.0);
    earrings.update_from_face_tracking(Some(&face));
    let target = EarringAnchor.face_target(&face, 1.5).unwrap();

    let primary = earrings.active_node().unwrap();
    let mirror = earrings.mirror_node().unwrap();
    let scale = primary.scale();
    assert_eq!(mirror.scale(), Vector3::new(-scale.x, scale.y, scale.z));
    assert_eq!(mirror.rotation(), primary.rotation());
    assert_eq!(primary.position(), target.position);
    assert_eq!(Some(mirror.position()), target.secondary);
    assert_eq!(engine.drawn_nodes().len(), 2);

    earrings.update_from_face_tracking(None);
    assert!(engine.drawn_nodes().is_empty());
}

#[test]
fn test_lod_switching() {
    let engine = HeadlessEngine::new();
    let config = RendererConfig {
        lod_urls: LodUrls {
            high: None,
            medium: Some("glasses-medium.glb".to_string()),
            low: Some("glasses-low.glb".to_string()),
        },
        ..RendererConfig::default()
    };
    let mut renderer = EyewearRenderer::new(config, engine.loader()).unwrap();
    renderer.load_model("glasses.glb").unwrap();
    assert_eq!(renderer.preload_lods().unwrap(), 2);
    renderer.attach_to_scene(&mut engine.scene()).unwrap();
    assert_eq!(engine.attached_count(), 3);

    let face = face(0.0);
    renderer.update_from_face_tracking(Some(&face));
    assert_eq!(engine.drawn_nodes()[0].url, "glasses.glb");

    assert!(renderer.set_lod(LodLevel::Low));
    let drawn = engine.drawn_nodes();
    assert_eq!(drawn.len(), 1);
    assert_eq!(drawn[0].url, "glasses-low.glb");
    // the swapped-in variant carries the current pose
    assert_eq!(drawn[0].position, renderer.current_pose().unwrap().position);

    // never preloaded: primary model shown
    assert!(!renderer.set_lod(LodLevel::High));
    assert_eq!(renderer.active_lod(), None);
    assert_eq!(engine.drawn_nodes()[0].url, "glasses.glb");
}

#[test]
fn test_earring_lod_switches_both_sides() {
    let engine = HeadlessEngine::new();
    let config = RendererConfig {
        lod_urls: LodUrls {
            low: Some("earring-low.glb".to_string()),
            ..LodUrls::default()
        },
        ..RendererConfig::default()
    };
    let mut earrings = EarringRenderer::new(config, engine.loader()).unwrap();
    earrings.load_model("earring.glb").unwrap();
    assert_eq!(earrings.preload_lods().unwrap(), 1);
    earrings.attach_to_scene(&mut engine.scene()).unwrap();
    assert_eq!(engine.attached_count(), 4);

    let face = face(0.0);
    earrings.update_from_face_tracking(Some(&face));
    assert!(earrings.set_lod(LodLevel::Low));

    let drawn = engine.drawn_nodes();
    assert_eq!(drawn.len(), 2);
    assert!(drawn.iter().all(|node| node.url == "earring-low.glb"));

    let primary = earrings.active_node().unwrap();
    let mirror = earrings.mirror_node().unwrap();
    assert_eq!(engine.node(mirror.id()).unwrap().cloned_from, Some(primary.id()));
    let scale = primary.scale();
    assert_eq!(mirror.scale(), Vector3::new(-scale.x, scale.y, scale.z));
    assert_eq!(Some(mirror.position()), earrings.current_pose().unwrap().secondary);

    // back to the primary pair
    assert!(!earrings.set_lod(LodLevel::High));
    let drawn = engine.drawn_nodes();
    assert_eq!(drawn.len(), 2);
    assert!(drawn.iter().all(|node| node.url == "earring.glb"));

    earrings.dispose();
    assert_eq!(engine.live_count(), 0);
}

#[test]
fn test_preload_lods_ordering() {
    let engine = HeadlessEngine::new();
    let config = RendererConfig {
        lod_urls: LodUrls {
            low: Some("low.glb".to_string()),
            ..LodUrls::default()
        },
        ..RendererConfig::default()
    };
    let mut renderer = EyewearRenderer::new(config, engine.loader()).unwrap();
    assert!(matches!(renderer.preload_lods(), Err(Error::InvalidState(_))));

    renderer.load_model("glasses.glb").unwrap();
    renderer.attach_to_scene(&mut engine.scene()).unwrap();
    assert!(matches!(renderer.preload_lods(), Err(Error::InvalidState(_))));
}

#[test]
fn test_failed_lod_is_skipped() {
    let engine = HeadlessEngine::new();
    engine.fail_url("medium.glb");
    let config = RendererConfig {
        lod_urls: LodUrls {
            high: Some("high.glb".to_string()),
            medium: Some("medium.glb".to_string()),
            low: None,
        },
        ..RendererConfig::default()
    };
    let mut renderer = EyewearRenderer::new(config, engine.loader()).unwrap();
    renderer.load_model("glasses.glb").unwrap();
    assert_eq!(renderer.preload_lods().unwrap(), 1);
    assert!(!renderer.set_lod(LodLevel::Medium));
    assert!(renderer.set_lod(LodLevel::High));
}

#[test]
fn test_failed_load_keeps_previous_model() {
    let engine = HeadlessEngine::new();
    engine.fail_url("broken.glb");
    let mut renderer = eyewear(&engine, RendererConfig::default());
    renderer.update_from_face_tracking(Some(&face(0.0)));
    let before = renderer.active_node().unwrap().id();

    match renderer.load_model("broken.glb") {
        Err(Error::ModelLoad { url, .. }) => assert_eq!(url, "broken.glb"),
        other => panic!("Expected ModelLoad, got {other:?}"),
    }
    assert_eq!(renderer.active_node().unwrap().id(), before);
    assert!(renderer.is_visible());
    assert_eq!(engine.live_count(), 1);
}

#[test]
fn test_update_without_model_stays_hidden() {
    let engine = HeadlessEngine::new();
    let mut renderer = EyewearRenderer::new(RendererConfig::default(), engine.loader()).unwrap();
    renderer.update_from_face_tracking(Some(&face(0.0)));
    assert!(!renderer.is_visible());
    assert!(matches!(
        renderer.attach_to_scene(&mut engine.scene()),
        Err(Error::InvalidState(_))
    ));
}

#[test]
fn test_dispose_is_idempotent_and_reloadable() {
    let engine = HeadlessEngine::new();
    let config = RendererConfig {
        lod_urls: LodUrls {
            low: Some("earring-low.glb".to_string()),
            ..LodUrls::default()
        },
        ..RendererConfig::default()
    };
    let mut earrings = EarringRenderer::new(config.clone(), engine.loader()).unwrap();
    earrings.load_model("earring.glb").unwrap();
    earrings.preload_lods().unwrap();
    earrings.attach_to_scene(&mut engine.scene()).unwrap();
    assert_eq!(engine.live_count(), 3);

    earrings.dispose();
    earrings.dispose();
    assert_eq!(engine.live_count(), 0);
    assert_eq!(engine.attached_count(), 0);
    assert!(earrings.active_node().is_none());
    assert!(earrings.mirror_node().is_none());

    // a disposed renderer loads again, and so does a fresh one
    earrings.load_model("earring.glb").unwrap();
    assert!(earrings.is_loaded());

    let mut fresh = attached(&engine, EarringRenderer::new(config, engine.loader()).unwrap(), "earring.glb");
    fresh.update_from_face_tracking(Some(&face(0.0)));
    assert!(fresh.is_visible());
}

#[test]
fn test_drop_releases_nodes() {
    let engine = HeadlessEngine::new();
    {
        let _renderer = eyewear(&engine, RendererConfig::default());
        assert_eq!(engine.live_count(), 1);
    }
    assert_eq!(engine.live_count(), 0);
}
