use framelens_classifier::{ClassifierConfig, RegisterOutcome, ResourceClassifier};
use framelens_frame_model::{PixelFormat, ResourceDescriptor, ResourceHandle, Role, UsageFlags};
use proptest::prelude::*;

fn depth() -> ResourceDescriptor {
    ResourceDescriptor::texture_2d(2560, 1440, PixelFormat::D32Float, UsageFlags::DEPTH_STENCIL)
}

fn motion() -> ResourceDescriptor {
    ResourceDescriptor::texture_2d(
        2560,
        1440,
        PixelFormat::Rg16Float,
        UsageFlags::UNORDERED_ACCESS | UsageFlags::SHADER_RESOURCE,
    )
}

#[test]
fn repeated_registration_in_one_frame_is_idempotent() {
    let mut once = ResourceClassifier::with_defaults();
    let mut many = ResourceClassifier::with_defaults();

    once.register(ResourceHandle(0x10), &motion(), None);
    for _ in 0..25 {
        many.register(ResourceHandle(0x10), &motion(), None);
    }

    let a = once.candidate(Role::MotionVectors, ResourceHandle(0x10)).cloned();
    let b = many.candidate(Role::MotionVectors, ResourceHandle(0x10)).cloned();
    assert_eq!(a, b);
    assert_eq!(once.best_pick(Role::MotionVectors), many.best_pick(Role::MotionVectors));
    assert_eq!(many.stats().duplicates, 24);
}

#[test]
fn collection_is_trimmed_past_the_hard_cap() {
    let config = ClassifierConfig::default();
    let mut classifier = ResourceClassifier::new(config.clone());

    for i in 0..=config.hard_cap as u64 {
        classifier.register(ResourceHandle(i + 1), &depth(), None);
    }

    assert_eq!(classifier.candidate_count(Role::Depth), config.retain_after_trim);
    assert_eq!(classifier.stats().trims, 1);
    assert!(classifier.best(Role::Depth).is_some());
}

#[test]
fn best_motion_vectors_outlive_ordinary_stale_age() {
    let config = ClassifierConfig::default();
    let stale = config.stale_age_frames;
    let mut classifier = ResourceClassifier::new(config.clone());

    classifier.register(ResourceHandle(1), &motion(), None);
    // Lower-scoring companion that never becomes best.
    let companion = ResourceDescriptor::texture_2d(
        2560,
        1440,
        PixelFormat::Rg32Float,
        UsageFlags::UNORDERED_ACCESS,
    );
    classifier.register(ResourceHandle(2), &companion, None);
    assert_eq!(classifier.best(Role::MotionVectors), Some(ResourceHandle(1)));

    for _ in 0..=stale {
        classifier.tick();
    }
    assert!(classifier.candidate(Role::MotionVectors, ResourceHandle(2)).is_none());
    assert!(classifier.candidate(Role::MotionVectors, ResourceHandle(1)).is_some());

    while classifier.frame() < stale * 2 - 1 {
        classifier.tick();
    }
    assert!(classifier.candidate(Role::MotionVectors, ResourceHandle(1)).is_some());

    while classifier.frame() < stale * 2 + 1 {
        classifier.tick();
    }
    assert!(classifier.candidate(Role::MotionVectors, ResourceHandle(1)).is_none());
    assert_eq!(classifier.best(Role::MotionVectors), Some(ResourceHandle(1)));
}

#[test]
fn returning_best_is_rescored_without_promotion() {
    let mut classifier = ResourceClassifier::with_defaults();
    classifier.register(ResourceHandle(1), &depth(), None);
    for _ in 0..10 {
        classifier.tick();
    }
    let outcome = classifier.register(ResourceHandle(1), &depth(), None);
    assert_eq!(
        outcome,
        RegisterOutcome::Tracked {
            roles: vec![Role::Depth],
            promoted: vec![],
        }
    );
    let pick = classifier.best_pick(Role::Depth).unwrap();
    assert_eq!(pick.seen_count, 2);
    assert_eq!(pick.last_seen_frame, 10);
}

#[test]
fn viewport_mismatch_demotes_offscreen_targets() {
    let mut classifier = ResourceClassifier::with_defaults();
    classifier.set_expected_viewport(Some((2560, 1440)));

    let shadow_map =
        ResourceDescriptor::texture_2d(2048, 2048, PixelFormat::D32Float, UsageFlags::DEPTH_STENCIL);
    classifier.register(ResourceHandle(0xa), &shadow_map, None);
    classifier.register(ResourceHandle(0xb), &depth(), None);

    assert_eq!(classifier.best(Role::Depth), Some(ResourceHandle(0xb)));
}

proptest! {
    #[test]
    fn store_never_exceeds_cap(handles in prop::collection::vec(1u64..2000, 1..400)) {
        let config = ClassifierConfig {
            hard_cap: 50,
            retain_after_trim: 20,
            ..Default::default()
        };
        let mut classifier = ResourceClassifier::new(config);
        for (i, handle) in handles.into_iter().enumerate() {
            classifier.register(ResourceHandle(handle), &motion(), None);
            prop_assert!(classifier.candidate_count(Role::MotionVectors) <= 50);
            if i % 7 == 0 {
                classifier.tick();
            }
        }
    }

    #[test]
    fn best_always_has_a_score_at_least_the_bar(widths in prop::collection::vec(64u32..4096, 1..40)) {
        let mut classifier = ResourceClassifier::with_defaults();
        for (i, w) in widths.into_iter().enumerate() {
            let desc = ResourceDescriptor::texture_2d(w, 1080, PixelFormat::D24UnormS8, UsageFlags::DEPTH_STENCIL);
            classifier.register(ResourceHandle(i as u64 + 1), &desc, None);
        }
        let pick = classifier.best_pick(Role::Depth).unwrap();
        prop_assert!(pick.base_score >= classifier.config().min_role_score);
    }
}

fn depth_variant(index: usize) -> ResourceDescriptor {
    let format = [
        PixelFormat::D32Float,
        PixelFormat::D16Unorm,
        PixelFormat::R32Typeless,
        PixelFormat::D24UnormS8,
    ][index % 4];
    ResourceDescriptor::texture_2d(2560, 1440, format, UsageFlags::DEPTH_STENCIL)
}

proptest! {
    #[test]
    fn best_is_the_maximum_after_every_tick(
        ops in prop::collection::vec((1u64..6, 0usize..4, any::<bool>()), 1..120)
    ) {
        let mut classifier = ResourceClassifier::with_defaults();
        let margin = classifier.config().promote_margin;
        for (handle, variant, tick) in ops {
            classifier.register(ResourceHandle(handle), &depth_variant(variant), None);
            if !tick {
                continue;
            }
            classifier.tick();
            let best = classifier.best_pick(Role::Depth).unwrap();
            for other in 1u64..6 {
                if let Some(candidate) = classifier.candidate(Role::Depth, ResourceHandle(other)) {
                    prop_assert!(best.score + margin >= candidate.adjusted_score);
                }
            }
        }
    }
}
