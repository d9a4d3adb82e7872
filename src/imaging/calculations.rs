//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Every result dimension is at least 1px.

use super::params::{FitMode, ResizeRequest};

/// The concrete resize a backend has to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeStep {
    /// Resample to exactly this size, ignoring the source aspect ratio.
    Stretch { width: u32, height: u32 },
    /// Resample to this size; it already preserves the source aspect ratio.
    Scale { width: u32, height: u32 },
    /// Resample to `scaled`, then take the centred `width`×`height` window.
    ScaleThenCrop {
        scaled: (u32, u32),
        width: u32,
        height: u32,
    },
    /// Resample to `scaled`, then centre it on a `width`×`height` canvas.
    ScaleThenPad {
        scaled: (u32, u32),
        width: u32,
        height: u32,
    },
}

impl ResizeStep {
    /// Final output dimensions after the step.
    pub fn output(&self) -> (u32, u32) {
        match *self {
            ResizeStep::Stretch { width, height }
            | ResizeStep::Scale { width, height }
            | ResizeStep::ScaleThenCrop { width, height, .. }
            | ResizeStep::ScaleThenPad { width, height, .. } => (width, height),
        }
    }

    /// Largest buffer the step materializes, per side.
    ///
    /// For `ScaleThenCrop` the covering intermediate can be far bigger than
    /// the output.
    pub fn peak(&self) -> (u32, u32) {
        match *self {
            ResizeStep::ScaleThenCrop {
                scaled,
                width,
                height,
            }
            | ResizeStep::ScaleThenPad {
                scaled,
                width,
                height,
            } => (scaled.0.max(width), scaled.1.max(height)),
            _ => self.output(),
        }
    }
}

fn scaled(value: u32, ratio: f64) -> u32 {
    ((value as f64 * ratio).round() as u32).max(1)
}

/// Height that keeps `original`'s aspect ratio at the given width.
///
/// ```
/// # use webp_optimizer::imaging::linked_height;
/// assert_eq!(linked_height((400, 200), 200), 100);
/// ```
pub fn linked_height(original: (u32, u32), width: u32) -> u32 {
    let (orig_w, orig_h) = original;
    scaled(width, orig_h as f64 / orig_w as f64)
}

/// Width that keeps `original`'s aspect ratio at the given height.
pub fn linked_width(original: (u32, u32), height: u32) -> u32 {
    let (orig_w, orig_h) = original;
    scaled(height, orig_w as f64 / orig_h as f64)
}

/// Scale both sides by a percentage (clamped to 1–100), rounding each axis
/// independently. Extreme percentages may drift the ratio by up to 1px per axis.
pub fn scale_by_percent(original: (u32, u32), percent: u32) -> (u32, u32) {
    let factor = percent.clamp(1, 100) as f64 / 100.0;
    (scaled(original.0, factor), scaled(original.1, factor))
}

/// The percentage a `current` size represents, averaged over both axes.
///
/// A missing side counts as 100%.
pub fn average_percent(original: (u32, u32), current: (Option<u32>, Option<u32>)) -> u32 {
    let axis = |cur: Option<u32>, orig: u32| match cur {
        Some(c) if orig > 0 => c as f64 / orig as f64 * 100.0,
        _ => 100.0,
    };
    let w = axis(current.0, original.0);
    let h = axis(current.1, original.1);
    ((w + h) / 2.0).round() as u32
}

/// Resolve a [`ResizeRequest`] against the source dimensions.
///
/// Returns `None` when neither side is requested.
pub fn resize_step(source: (u32, u32), request: &ResizeRequest) -> Option<ResizeStep> {
    let (src_w, src_h) = source;

    let (tgt_w, tgt_h) = match (request.width, request.height) {
        (None, None) => return None,
        (Some(w), None) => {
            return Some(ResizeStep::Scale {
                width: w,
                height: linked_height(source, w),
            });
        }
        (None, Some(h)) => {
            return Some(ResizeStep::Scale {
                width: linked_width(source, h),
                height: h,
            });
        }
        (Some(w), Some(h)) => (w, h),
    };

    let ratio_w = tgt_w as f64 / src_w as f64;
    let ratio_h = tgt_h as f64 / src_h as f64;

    // Size that fits within the box (one side matches, the other is smaller)
    let within = {
        let r = ratio_w.min(ratio_h);
        (scaled(src_w, r).min(tgt_w), scaled(src_h, r).min(tgt_h))
    };
    // Size that covers the box (one side matches, the other is larger)
    let covering = {
        let r = ratio_w.max(ratio_h);
        (scaled(src_w, r).max(tgt_w), scaled(src_h, r).max(tgt_h))
    };

    let step = match request.fit {
        FitMode::Fill => ResizeStep::Stretch {
            width: tgt_w,
            height: tgt_h,
        },
        FitMode::Inside => ResizeStep::Scale {
            width: within.0,
            height: within.1,
        },
        FitMode::Outside => ResizeStep::Scale {
            width: covering.0,
            height: covering.1,
        },
        FitMode::Contain if within == (tgt_w, tgt_h) => ResizeStep::Scale {
            width: tgt_w,
            height: tgt_h,
        },
        FitMode::Contain => ResizeStep::ScaleThenPad {
            scaled: within,
            width: tgt_w,
            height: tgt_h,
        },
        FitMode::Cover if covering == (tgt_w, tgt_h) => ResizeStep::Scale {
            width: tgt_w,
            height: tgt_h,
        },
        FitMode::Cover => ResizeStep::ScaleThenCrop {
            scaled: covering,
            width: tgt_w,
            height: tgt_h,
        },
    };
    Some(step)
}

/// Top-left offset that centres an `inner` rectangle within an `outer` one.
pub fn centre_offset(outer: (u32, u32), inner: (u32, u32)) -> (u32, u32) {
    (
        outer.0.saturating_sub(inner.0) / 2,
        outer.1.saturating_sub(inner.1) / 2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(width: Option<u32>, height: Option<u32>, fit: FitMode) -> ResizeRequest {
        ResizeRequest { width, height, fit }
    }

    // =========================================================================
    // aspect linking and percentages
    // =========================================================================

    #[test]
    fn linked_height_preserves_two_to_one() {
        assert_eq!(linked_height((400, 200), 200), 100);
    }

    #[test]
    fn linked_width_rounds_to_nearest() {
        // 3:2 at height 101 → 151.5 → 152
        assert_eq!(linked_width((300, 200), 101), 152);
    }

    #[test]
    fn linked_dimensions_never_collapse_to_zero() {
        assert_eq!(linked_height((10000, 1), 1), 1);
        assert_eq!(linked_width((1, 10000), 1), 1);
    }

    #[test]
    fn percent_rounds_each_axis_independently() {
        // 333x111 at 50% → 166.5 → 167, 55.5 → 56
        assert_eq!(scale_by_percent((333, 111), 50), (167, 56));
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(scale_by_percent((400, 200), 0), (4, 2));
        assert_eq!(scale_by_percent((400, 200), 250), (400, 200));
    }

    #[test]
    fn average_percent_of_half_size() {
        assert_eq!(average_percent((400, 200), (Some(200), Some(100))), 50);
    }

    #[test]
    fn average_percent_treats_missing_side_as_full() {
        assert_eq!(average_percent((400, 200), (Some(200), None)), 75);
    }

    // =========================================================================
    // resize_step
    // =========================================================================

    #[test]
    fn no_dimensions_means_no_resize() {
        assert_eq!(resize_step((800, 600), &request(None, None, FitMode::Cover)), None);
    }

    #[test]
    fn single_width_scales_height_for_every_fit() {
        for fit in [FitMode::Contain, FitMode::Cover, FitMode::Fill, FitMode::Inside] {
            assert_eq!(
                resize_step((800, 600), &request(Some(400), None, fit)),
                Some(ResizeStep::Scale {
                    width: 400,
                    height: 300
                })
            );
        }
    }

    #[test]
    fn single_height_scales_width() {
        assert_eq!(
            resize_step((800, 600), &request(None, Some(150), FitMode::Outside)),
            Some(ResizeStep::Scale {
                width: 200,
                height: 150
            })
        );
    }

    #[test]
    fn fill_stretches_to_exact_box() {
        assert_eq!(
            resize_step((800, 600), &request(Some(300), Some(300), FitMode::Fill)),
            Some(ResizeStep::Stretch {
                width: 300,
                height: 300
            })
        );
    }

    #[test]
    fn inside_fits_within_box() {
        // 800x600 into 300x300 → ratio 0.375 → 300x225
        assert_eq!(
            resize_step((800, 600), &request(Some(300), Some(300), FitMode::Inside)),
            Some(ResizeStep::Scale {
                width: 300,
                height: 225
            })
        );
    }

    #[test]
    fn outside_covers_box() {
        // 800x600 over 300x300 → ratio 0.5 → 400x300
        assert_eq!(
            resize_step((800, 600), &request(Some(300), Some(300), FitMode::Outside)),
            Some(ResizeStep::Scale {
                width: 400,
                height: 300
            })
        );
    }

    #[test]
    fn contain_pads_to_box() {
        assert_eq!(
            resize_step((800, 600), &request(Some(300), Some(300), FitMode::Contain)),
            Some(ResizeStep::ScaleThenPad {
                scaled: (300, 225),
                width: 300,
                height: 300
            })
        );
    }

    #[test]
    fn cover_crops_to_box() {
        assert_eq!(
            resize_step((800, 600), &request(Some(300), Some(300), FitMode::Cover)),
            Some(ResizeStep::ScaleThenCrop {
                scaled: (400, 300),
                width: 300,
                height: 300
            })
        );
    }

    #[test]
    fn matching_aspect_needs_no_pad_or_crop() {
        for fit in [FitMode::Contain, FitMode::Cover] {
            assert_eq!(
                resize_step((800, 600), &request(Some(400), Some(300), fit)),
                Some(ResizeStep::Scale {
                    width: 400,
                    height: 300
                })
            );
        }
    }

    #[test]
    fn upscaling_is_allowed() {
        assert_eq!(
            resize_step((100, 50), &request(Some(400), None, FitMode::Contain)),
            Some(ResizeStep::Scale {
                width: 400,
                height: 200
            })
        );
    }

    #[test]
    fn output_reports_final_box() {
        let step = ResizeStep::ScaleThenCrop {
            scaled: (400, 300),
            width: 300,
            height: 300,
        };
        assert_eq!(step.output(), (300, 300));
        assert_eq!(step.peak(), (400, 300));
    }

    #[test]
    fn cover_of_a_sliver_peaks_past_the_box() {
        let step = resize_step((1, 1000), &request(Some(16000), Some(16000), FitMode::Cover))
            .unwrap();
        assert_eq!(step.output(), (16000, 16000));
        assert_eq!(step.peak(), (16000, 16_000_000));
    }

    #[test]
    fn peak_of_plain_steps_is_the_output() {
        let step = ResizeStep::Stretch {
            width: 20,
            height: 10,
        };
        assert_eq!(step.peak(), step.output());
        let pad = ResizeStep::ScaleThenPad {
            scaled: (50, 25),
            width: 50,
            height: 50,
        };
        assert_eq!(pad.peak(), (50, 50));
    }

    #[test]
    fn centre_offset_splits_slack() {
        assert_eq!(centre_offset((300, 300), (300, 225)), (0, 37));
        assert_eq!(centre_offset((400, 300), (300, 300)), (50, 0));
    }
}
