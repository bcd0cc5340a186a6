//! Per-role scoring of resource descriptors.
//!
//! Every function here is pure: a descriptor (plus the expected viewport, if
//! known) goes in, a confidence score comes out. Scores are on an open scale
//! where `ClassifierConfig::min_role_score` (0.5) is the tracking bar.
//!
//! # Signals
//!
//! 1. **Format** sets the base weight. Role-specific formats score highest,
//!    typeless ones lower, incompatible ones short-circuit to 0.
//! 2. **Usage flags** add signed evidence (depth attachment for depth,
//!    UAV for motion vectors, large render target for color).
//! 3. **MSAA / mips** are penalised: upscaler inputs are single-sample,
//!    single-mip.
//! 4. **Viewport ratio** rewards full-size or uniformly scaled targets and
//!    punishes everything else once the viewport is known.
//! 5. **Minimum size** (64 px) disqualifies icons and UI elements outright.

use framelens_frame_model::{PixelFormat, ResourceDescriptor, Role, UsageFlags};

use crate::config::{BonusConfig, ViewportMatchConfig};

/// Pixel count above which a color render target counts as "large".
pub const LARGE_TARGET_PIXELS: u64 = 1280 * 720;

/// Largest edge of an exposure texture.
pub const MAX_EXPOSURE_EDGE: u32 = 4;

const MSAA_PENALTY: f32 = 0.3;
const MIP_PENALTY: f32 = 0.2;

/// Inputs shared by all role scorers.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub min_dimension: u32,
    pub expected_viewport: Option<(u32, u32)>,
    pub viewport: &'a ViewportMatchConfig,
}

/// Score a descriptor for one tracked role. Exposure is not scored here.
pub fn score_for(role: Role, desc: &ResourceDescriptor, ctx: &ScoringContext<'_>) -> f32 {
    match role {
        Role::Color => score_color(desc, ctx),
        Role::Depth => score_depth(desc, ctx),
        Role::MotionVectors => score_motion_vectors(desc, ctx),
        Role::Exposure => 0.0,
    }
}

/// Likelihood that a resource is the scene color target.
pub fn score_color(desc: &ResourceDescriptor, ctx: &ScoringContext<'_>) -> f32 {
    if !passes_size_gate(desc, ctx) || desc.usage.contains(UsageFlags::DEPTH_STENCIL) {
        return 0.0;
    }

    let mut score = match desc.format {
        PixelFormat::Rgba16Float | PixelFormat::R11G11B10Float => 0.5,
        PixelFormat::Rgb10A2Unorm => 0.45,
        PixelFormat::Rgba8Unorm
        | PixelFormat::Rgba8UnormSrgb
        | PixelFormat::Bgra8Unorm
        | PixelFormat::Bgra8UnormSrgb => 0.35,
        PixelFormat::Rgba16Typeless | PixelFormat::Rgba8Typeless | PixelFormat::Rgb10A2Typeless => {
            0.3
        }
        PixelFormat::Rgba32Float => 0.25,
        _ => return 0.0,
    };

    if desc.usage.contains(UsageFlags::RENDER_TARGET) {
        score += 0.15;
        if desc.pixel_count() >= LARGE_TARGET_PIXELS {
            score += 0.15;
        }
    }
    if desc.usage.contains(UsageFlags::UNORDERED_ACCESS) {
        score += 0.05;
    }

    finish(score, desc, ctx)
}

/// Likelihood that a resource is the scene depth buffer.
pub fn score_depth(desc: &ResourceDescriptor, ctx: &ScoringContext<'_>) -> f32 {
    if !passes_size_gate(desc, ctx) {
        return 0.0;
    }

    let mut score = match desc.format {
        PixelFormat::D32Float | PixelFormat::D32FloatS8X24 | PixelFormat::D24UnormS8 => 0.6,
        PixelFormat::D16Unorm => 0.5,
        PixelFormat::R32Typeless | PixelFormat::R32G8X24Typeless | PixelFormat::R24G8Typeless => {
            0.45
        }
        PixelFormat::R16Typeless => 0.35,
        PixelFormat::R32Float => 0.25,
        _ => return 0.0,
    };

    if desc.usage.contains(UsageFlags::DEPTH_STENCIL) {
        score += 0.4;
    }
    if desc.usage.contains(UsageFlags::RENDER_TARGET) {
        score -= 0.2;
    }
    if desc.usage.contains(UsageFlags::UNORDERED_ACCESS) {
        score -= 0.1;
    }

    finish(score, desc, ctx)
}

/// Likelihood that a resource is the motion-vector field.
pub fn score_motion_vectors(desc: &ResourceDescriptor, ctx: &ScoringContext<'_>) -> f32 {
    if !passes_size_gate(desc, ctx) || desc.usage.contains(UsageFlags::DEPTH_STENCIL) {
        return 0.0;
    }

    let mut score = match desc.format {
        PixelFormat::Rg16Float => 0.6,
        PixelFormat::Rg32Float => 0.5,
        PixelFormat::Rg16Snorm | PixelFormat::Rg16Typeless => 0.4,
        PixelFormat::Rgba16Float => 0.2,
        _ => return 0.0,
    };

    if desc.usage.contains(UsageFlags::UNORDERED_ACCESS) {
        score += 0.2;
    }
    if desc.usage.contains(UsageFlags::RENDER_TARGET) {
        score += 0.15;
    }

    finish(score, desc, ctx)
}

/// Tiny floating-point textures holding the auto-exposure value.
pub fn is_exposure_candidate(desc: &ResourceDescriptor) -> bool {
    desc.is_well_formed_2d()
        && desc.width <= MAX_EXPOSURE_EDGE
        && desc.height <= MAX_EXPOSURE_EDGE
        && desc.format.is_float()
}

/// Structural base score plus recency and frequency bonuses.
///
/// The bonuses are bounded and never look at the base score.
pub fn adjust(base: f32, frames_since_seen: u64, seen_count: u32, bonus: &BonusConfig) -> f32 {
    let recency = if frames_since_seen <= bonus.recency_window_frames {
        bonus.recency_bonus
    } else {
        0.0
    };

    let frequency = if bonus.frequency_saturation == 0 {
        bonus.max_frequency_bonus
    } else {
        let saturated = seen_count.min(bonus.frequency_saturation) as f32;
        bonus.max_frequency_bonus * saturated / bonus.frequency_saturation as f32
    };

    base + recency + frequency
}

fn passes_size_gate(desc: &ResourceDescriptor, ctx: &ScoringContext<'_>) -> bool {
    desc.is_well_formed_2d() && desc.width >= ctx.min_dimension && desc.height >= ctx.min_dimension
}

fn finish(score: f32, desc: &ResourceDescriptor, ctx: &ScoringContext<'_>) -> f32 {
    let mut score = score;
    if desc.sample_count > 1 {
        score -= MSAA_PENALTY;
    }
    if desc.mip_levels > 1 {
        score -= MIP_PENALTY;
    }
    score += viewport_adjustment(desc, ctx);
    score.max(0.0)
}

fn viewport_adjustment(desc: &ResourceDescriptor, ctx: &ScoringContext<'_>) -> f32 {
    let Some((vw, vh)) = ctx.expected_viewport else {
        return 0.0;
    };
    if vw == 0 || vh == 0 {
        return 0.0;
    }

    let cfg = ctx.viewport;
    let rx = desc.width as f32 / vw as f32;
    let ry = desc.height as f32 / vh as f32;

    if (rx - 1.0).abs() <= cfg.tolerance && (ry - 1.0).abs() <= cfg.tolerance {
        cfg.exact_bonus
    } else if (rx - ry).abs() <= cfg.tolerance && rx >= cfg.min_scale && rx <= 1.0 + cfg.tolerance
    {
        cfg.scaled_bonus
    } else {
        -cfg.mismatch_penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framelens_frame_model::ResourceDimension;

    fn ctx(viewport: Option<(u32, u32)>, cfg: &ViewportMatchConfig) -> ScoringContext<'_> {
        ScoringContext {
            min_dimension: 64,
            expected_viewport: viewport,
            viewport: cfg,
        }
    }

    fn tex(w: u32, h: u32, format: PixelFormat, usage: UsageFlags) -> ResourceDescriptor {
        ResourceDescriptor::texture_2d(w, h, format, usage)
    }

    #[test]
    fn test_depth_attachment_scores_high() {
        let cfg = ViewportMatchConfig::default();
        let desc = tex(1920, 1080, PixelFormat::D32Float, UsageFlags::DEPTH_STENCIL);
        let score = score_depth(&desc, &ctx(None, &cfg));
        assert!((score - 1.0).abs() < 1e-6);
        assert_eq!(score_color(&desc, &ctx(None, &cfg)), 0.0);
        assert_eq!(score_motion_vectors(&desc, &ctx(None, &cfg)), 0.0);
    }

    #[test]
    fn test_motion_vector_format_with_uav() {
        let cfg = ViewportMatchConfig::default();
        let desc = tex(
            1920,
            1080,
            PixelFormat::Rg16Float,
            UsageFlags::UNORDERED_ACCESS | UsageFlags::SHADER_RESOURCE,
        );
        let score = score_motion_vectors(&desc, &ctx(None, &cfg));
        assert!((score - 0.8).abs() < 1e-6);
        assert_eq!(score_color(&desc, &ctx(None, &cfg)), 0.0);
    }

    #[test]
    fn test_large_hdr_render_target_is_color() {
        let cfg = ViewportMatchConfig::default();
        let desc = tex(2560, 1440, PixelFormat::Rgba16Float, UsageFlags::RENDER_TARGET);
        let color = score_color(&desc, &ctx(None, &cfg));
        let mv = score_motion_vectors(&desc, &ctx(None, &cfg));
        assert!((color - 0.8).abs() < 1e-6);
        assert!(mv < 0.5, "RGBA16F should not qualify as motion vectors: {mv}");
    }

    #[test]
    fn test_small_textures_are_disqualified() {
        let cfg = ViewportMatchConfig::default();
        let desc = tex(63, 1080, PixelFormat::D32Float, UsageFlags::DEPTH_STENCIL);
        assert_eq!(score_depth(&desc, &ctx(None, &cfg)), 0.0);
        let desc = tex(256, 32, PixelFormat::Rgba16Float, UsageFlags::RENDER_TARGET);
        assert_eq!(score_color(&desc, &ctx(None, &cfg)), 0.0);
    }

    #[test]
    fn test_non_2d_is_rejected() {
        let cfg = ViewportMatchConfig::default();
        let mut desc = tex(1920, 1080, PixelFormat::D32Float, UsageFlags::DEPTH_STENCIL);
        desc.dimension = ResourceDimension::Texture3D;
        assert_eq!(score_depth(&desc, &ctx(None, &cfg)), 0.0);
    }

    #[test]
    fn test_msaa_and_mips_are_penalised() {
        let cfg = ViewportMatchConfig::default();
        let base = tex(1920, 1080, PixelFormat::D32Float, UsageFlags::DEPTH_STENCIL);
        let plain = score_depth(&base, &ctx(None, &cfg));
        let msaa = score_depth(&base.with_samples(4), &ctx(None, &cfg));
        let mips = score_depth(&base.with_mips(11), &ctx(None, &cfg));
        assert!((plain - msaa - MSAA_PENALTY).abs() < 1e-6);
        assert!((plain - mips - MIP_PENALTY).abs() < 1e-6);
    }

    #[test]
    fn test_viewport_ratio_bands() {
        let cfg = ViewportMatchConfig::default();
        let vp = Some((1920, 1080));

        let full = tex(1920, 1080, PixelFormat::Rg16Float, UsageFlags::RENDER_TARGET);
        let half = tex(960, 540, PixelFormat::Rg16Float, UsageFlags::RENDER_TARGET);
        let odd = tex(512, 512, PixelFormat::Rg16Float, UsageFlags::RENDER_TARGET);

        let unknown = score_motion_vectors(&full, &ctx(None, &cfg));
        assert!((score_motion_vectors(&full, &ctx(vp, &cfg)) - (unknown + 0.2)).abs() < 1e-6);
        assert!((score_motion_vectors(&half, &ctx(vp, &cfg)) - (unknown + 0.1)).abs() < 1e-6);
        assert!((score_motion_vectors(&odd, &ctx(vp, &cfg)) - (unknown - 0.3)).abs() < 1e-6);
    }

    #[test]
    fn test_exposure_shapes() {
        assert!(is_exposure_candidate(&tex(
            1,
            1,
            PixelFormat::R32Float,
            UsageFlags::UNORDERED_ACCESS
        )));
        assert!(is_exposure_candidate(&tex(
            4,
            4,
            PixelFormat::Rgba16Float,
            UsageFlags::NONE
        )));
        assert!(!is_exposure_candidate(&tex(
            1,
            1,
            PixelFormat::Rgba8Unorm,
            UsageFlags::NONE
        )));
        assert!(!is_exposure_candidate(&tex(
            8,
            8,
            PixelFormat::R32Float,
            UsageFlags::NONE
        )));
    }

    #[test]
    fn test_adjust_bonuses() {
        let bonus = BonusConfig::default();
        let fresh = adjust(0.6, 0, 1, &bonus);
        assert!((fresh - (0.6 + 0.15 + 0.1 / 30.0)).abs() < 1e-6);

        let saturated = adjust(0.6, 0, 1000, &bonus);
        assert!((saturated - 0.85).abs() < 1e-6);

        let stale = adjust(0.6, 10, 30, &bonus);
        assert!((stale - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_adjust_is_independent_of_base() {
        let bonus = BonusConfig::default();
        let low = adjust(0.1, 2, 7, &bonus) - 0.1;
        let high = adjust(1.1, 2, 7, &bonus) - 1.1;
        assert!((low - high).abs() < 1e-6);
    }
}
