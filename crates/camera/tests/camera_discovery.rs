use framelens_camera::{
    score_pair, CameraCache, CameraConfig, JitterEngine, JitterInput, JitterSource,
    MemoryScanner, Orientation, SegmentedSource, SliceSource, PAIR_BYTES,
};
use framelens_common::logging::init_test_logging;
use framelens_frame_model::matrix::{look_to, perspective, transpose, with_jitter, IDENTITY};
use framelens_frame_model::{DiscoveryMethod, Mat4};

const WORLD: f32 = 10_000.0;

fn scene_camera() -> (Mat4, Mat4) {
    (
        look_to([120.0, 14.0, -65.0], 2.1, -0.15),
        perspective(75f32.to_radians(), 21.0 / 9.0, 0.1, 10_000.0),
    )
}

fn dump(len: usize, placements: &[(usize, Mat4, Mat4)]) -> Vec<u8> {
    // Fill with a repeating non-matrix pattern so the scanner sees noise, not zeros.
    let mut words: Vec<f32> = (0..len / 4).map(|i| (i % 97) as f32 * 0.37 - 11.0).collect();
    for (offset, view, proj) in placements {
        let w = offset / 4;
        words[w..w + 16].copy_from_slice(view);
        words[w + 16..w + 32].copy_from_slice(proj);
    }
    bytemuck::cast_slice(&words).to_vec()
}

#[test]
fn good_camera_clears_acceptance_and_hard_rejects_are_zero() {
    let (view, proj) = scene_camera();
    assert!(score_pair(&view, &proj, WORLD) > 0.6);

    let mut nan = view;
    nan[5] = f32::NAN;
    assert_eq!(score_pair(&nan, &proj, WORLD), 0.0);

    let mut ortho = proj;
    ortho[11] = 0.0;
    ortho[15] = 1.0;
    assert_eq!(score_pair(&view, &ortho, WORLD), 0.0);
}

#[test]
fn scanner_finds_column_major_pair_through_transpose() {
    let (view, proj) = scene_camera();
    let bytes = dump(16 * 1024, &[(512, transpose(&view), transpose(&proj))]);

    let scanner = MemoryScanner::default();
    let hit = scanner.find_best_camera(&SliceSource::new(&bytes)).unwrap();

    assert_eq!(hit.offset, 512);
    assert_eq!(hit.orientation, Orientation::ColumnMajor);
    assert_eq!(hit.view, view);
    assert_eq!(hit.proj, proj);
}

#[test]
fn scanner_keeps_the_strongest_of_several_pairs() {
    init_test_logging();
    let (view, proj) = scene_camera();
    // Same view, but a telephoto lens outside the common FOV band.
    let tele = perspective(15f32.to_radians(), 21.0 / 9.0, 0.1, 10_000.0);
    let bytes = dump(8192, &[(1024, view, tele), (4096, view, proj)]);

    let hit = MemoryScanner::default()
        .find_best_camera(&SliceSource::new(&bytes))
        .unwrap();
    assert_eq!(hit.offset, 4096);
}

#[test]
fn scanner_skips_unreadable_pages_without_failing() {
    init_test_logging();
    let (view, proj) = scene_camera();
    let bytes = dump(16 * 1024, &[(12 * 1024 + 64, view, proj)]);
    let source =
        SegmentedSource::with_unreadable(&bytes, &[(0, 4096), (6000, 9000)]).unwrap();

    let (hit, stats) = MemoryScanner::default().scan(&source);
    assert_eq!(hit.unwrap().offset, 12 * 1024 + 64);
    assert!(stats.regions_skipped >= 2);
}

#[test]
fn pair_straddling_a_region_boundary_is_not_read() {
    let (view, proj) = scene_camera();
    let bytes = dump(4096, &[(1024, view, proj)]);
    let source = SegmentedSource::with_unreadable(&bytes, &[(1024 + PAIR_BYTES - 4, 2048)]).unwrap();
    assert!(MemoryScanner::default().find_best_camera(&source).is_none());
}

#[test]
fn camera_cache_ignores_noise_and_follows_consistent_camera() {
    init_test_logging();
    let (view, proj) = scene_camera();
    let mut cache = CameraCache::new(CameraConfig::default());

    assert!(cache.update(&view, &proj, 0.0, 0.0, DiscoveryMethod::FullScan, 1));
    let cached_score = cache.stats().score;

    // Noise: weak perspective signature and a garbage, non-orthonormal view.
    let mut noise_view = IDENTITY;
    noise_view[0] = 3.0;
    noise_view[1] = 2.0;
    noise_view[12] = 1.0e6;
    let mut noise_proj = proj;
    noise_proj[11] = 0.7;
    let noise_score = score_pair(&noise_view, &noise_proj, WORLD);
    assert!(noise_score > 0.0 && noise_score < 0.6, "noise scored {noise_score}");
    assert!(!cache.update(&noise_view, &noise_proj, 0.0, 0.0, DiscoveryMethod::FullScan, 2));
    assert_eq!(cache.snapshot().view, view);

    // Tiny perturbation of the same camera earns the tight stability bonus.
    let mut nudged_view = view;
    nudged_view[12] += 0.001;
    let mut nudged_proj = proj;
    nudged_proj[0] += 0.001;
    assert!(cache.stability_bonus(&nudged_view, &nudged_proj) > 0.1);
    assert!(cache.update(&nudged_view, &nudged_proj, 0.0, 0.0, DiscoveryMethod::CachedLocation, 3));
    assert_eq!(cache.snapshot().view, nudged_view);
    assert!(cache.stats().score >= cached_score - 0.1);
    assert_eq!(cache.stats().updates, 2);
}

#[test]
fn hysteresis_rejects_clearly_worse_camera() {
    let (view, proj) = scene_camera();
    let mut cache = CameraCache::new(CameraConfig::default());
    cache.update(&view, &proj, 0.0, 0.0, DiscoveryMethod::Direct, 0);

    // Far away and with an implausible lens: plausible enough to pass the
    // threshold, but well below the cached score with no stability bonus.
    let other_view = look_to([-900.0, 40.0, 300.0], 0.2, 0.0);
    let tele = perspective(15f32.to_radians(), 21.0 / 9.0, 0.1, 10_000.0);
    assert!(score_pair(&other_view, &tele, WORLD) >= 0.6);
    assert!(!cache.update(&other_view, &tele, 0.0, 0.0, DiscoveryMethod::Direct, 1));
    assert_eq!(cache.snapshot().view, view);
}

#[test]
fn jitter_tiers_follow_trust_order() {
    init_test_logging();
    let mut engine = JitterEngine::default();
    let mut proj = IDENTITY;
    proj[8] = 0.02;
    proj[9] = -0.01;

    let sample = engine.update(JitterInput {
        pattern: Some((f32::NAN, 0.1)),
        projection: Some(proj),
    });
    assert_eq!(sample.source, JitterSource::CbvExtraction);
    assert!((sample.x - 0.02).abs() < 1e-7);
    assert!((sample.y + 0.01).abs() < 1e-7);

    let sample = engine.update(JitterInput {
        pattern: Some((0.9, 0.9)),
        projection: Some(with_jitter(&IDENTITY, 0.01, 0.01)),
    });
    assert_eq!(sample.source, JitterSource::Pattern);
    // Far from the moving average: replaced by it.
    assert_eq!((sample.x, sample.y), (0.02, -0.01));
    assert_eq!(engine.outliers(), 1);
}
