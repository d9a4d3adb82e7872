//! Resize controls: the editing rules that sit between user input and
//! [`OptionsPatch`].
//!
//! With the aspect lock on, editing one side recomputes the other from the
//! original's proportions. Percentage mode scales both sides from the
//! original, each axis rounded on its own.

use crate::imaging::{Quality, average_percent, linked_height, linked_width, scale_by_percent};
use crate::types::{OptionsPatch, ResizeOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstraintMode {
    #[default]
    Dimensions,
    Percentage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeControls {
    original: Option<(u32, u32)>,
    mode: ConstraintMode,
    percentage: u32,
}

impl Default for ResizeControls {
    fn default() -> Self {
        Self {
            original: None,
            mode: ConstraintMode::Dimensions,
            percentage: 100,
        }
    }
}

impl ResizeControls {
    pub fn new(original_width: u32, original_height: u32) -> Self {
        Self {
            original: Some((original_width, original_height)),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ConstraintMode {
        self.mode
    }

    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    /// Set the width. `None` or `Some(0)` clears it.
    pub fn set_width(&self, options: &ResizeOptions, width: Option<u32>) -> OptionsPatch {
        match (width.filter(|w| *w > 0), self.original) {
            (None, _) => OptionsPatch {
                width: Some(None),
                ..OptionsPatch::default()
            },
            (Some(w), Some(original)) if options.maintain_aspect_ratio => {
                OptionsPatch::default().width(w).height(linked_height(original, w))
            }
            (Some(w), _) => OptionsPatch::default().width(w),
        }
    }

    /// Set the height. `None` or `Some(0)` clears it.
    pub fn set_height(&self, options: &ResizeOptions, height: Option<u32>) -> OptionsPatch {
        match (height.filter(|h| *h > 0), self.original) {
            (None, _) => OptionsPatch {
                height: Some(None),
                ..OptionsPatch::default()
            },
            (Some(h), Some(original)) if options.maintain_aspect_ratio => {
                OptionsPatch::default().width(linked_width(original, h)).height(h)
            }
            (Some(h), _) => OptionsPatch::default().height(h),
        }
    }

    /// Scale both sides to `percent` of the original (clamped to 1..=100).
    ///
    /// `None` when there is no original to scale from.
    pub fn set_percentage(&mut self, percent: u32) -> Option<OptionsPatch> {
        let original = self.original?;
        self.percentage = percent.clamp(1, 100);
        let (w, h) = scale_by_percent(original, self.percentage);
        Some(OptionsPatch::default().width(w).height(h))
    }

    /// Switch between dimension and percentage editing.
    ///
    /// Entering percentage mode derives the percentage from the current
    /// dimensions; the dimensions themselves are left alone.
    pub fn toggle_constraint_mode(&mut self, options: &ResizeOptions) {
        self.mode = match self.mode {
            ConstraintMode::Dimensions => {
                if let Some(original) = self.original {
                    self.percentage = average_percent(original, (options.width, options.height));
                }
                ConstraintMode::Percentage
            }
            ConstraintMode::Percentage => ConstraintMode::Dimensions,
        };
    }

    pub fn toggle_aspect_ratio(&self, options: &ResizeOptions) -> OptionsPatch {
        OptionsPatch::default().maintain_aspect_ratio(!options.maintain_aspect_ratio)
    }

    /// Quality patch, clamped into range rather than rejected.
    pub fn set_quality(&self, quality: i64) -> OptionsPatch {
        OptionsPatch::default().quality(quality.clamp(1, 100) as u32)
    }

    /// Back to dimension mode at 100% with default options.
    pub fn reset(&mut self) -> OptionsPatch {
        self.mode = ConstraintMode::Dimensions;
        self.percentage = 100;
        let defaults = ResizeOptions::default();
        OptionsPatch::default()
            .dimensions(defaults.width, defaults.height)
            .maintain_aspect_ratio(defaults.maintain_aspect_ratio)
            .fit(defaults.fit)
            .quality(Quality::default().value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::FitMode;

    fn locked() -> ResizeOptions {
        ResizeOptions {
            width: Some(400),
            height: Some(200),
            ..ResizeOptions::default()
        }
    }

    fn apply(options: &ResizeOptions, patch: OptionsPatch) -> ResizeOptions {
        options.merge(&patch).unwrap()
    }

    #[test]
    fn width_links_height_when_locked() {
        let controls = ResizeControls::new(400, 200);
        let next = apply(&locked(), controls.set_width(&locked(), Some(200)));
        assert_eq!((next.width, next.height), (Some(200), Some(100)));
    }

    #[test]
    fn height_links_width_when_locked() {
        let controls = ResizeControls::new(400, 200);
        let next = apply(&locked(), controls.set_height(&locked(), Some(50)));
        assert_eq!((next.width, next.height), (Some(100), Some(50)));
    }

    #[test]
    fn unlocked_edits_one_side() {
        let controls = ResizeControls::new(400, 200);
        let options = ResizeOptions {
            maintain_aspect_ratio: false,
            ..locked()
        };
        let next = apply(&options, controls.set_width(&options, Some(300)));
        assert_eq!((next.width, next.height), (Some(300), Some(200)));
    }

    #[test]
    fn clearing_a_side() {
        let controls = ResizeControls::new(400, 200);
        let next = apply(&locked(), controls.set_width(&locked(), Some(0)));
        assert_eq!((next.width, next.height), (None, Some(200)));
        let next = apply(&locked(), controls.set_height(&locked(), None));
        assert_eq!((next.width, next.height), (Some(400), None));
    }

    #[test]
    fn no_original_means_no_linking() {
        let controls = ResizeControls::default();
        let patch = controls.set_width(&locked(), Some(100));
        assert_eq!(patch.height, None);
    }

    #[test]
    fn percentage_scales_each_axis() {
        let mut controls = ResizeControls::new(333, 101);
        let next = apply(&locked(), controls.set_percentage(50).unwrap());
        // 166.5 → 167, 50.5 → 51
        assert_eq!((next.width, next.height), (Some(167), Some(51)));
        assert_eq!(controls.percentage(), 50);
    }

    #[test]
    fn percentage_is_clamped() {
        let mut controls = ResizeControls::new(400, 200);
        controls.set_percentage(250);
        assert_eq!(controls.percentage(), 100);
        controls.set_percentage(0);
        assert_eq!(controls.percentage(), 1);
    }

    #[test]
    fn percentage_needs_original() {
        assert!(ResizeControls::default().set_percentage(50).is_none());
    }

    #[test]
    fn entering_percentage_mode_averages() {
        let mut controls = ResizeControls::new(400, 200);
        let options = ResizeOptions {
            width: Some(200),
            height: Some(150),
            ..ResizeOptions::default()
        };
        controls.toggle_constraint_mode(&options);
        assert_eq!(controls.mode(), ConstraintMode::Percentage);
        // (50 + 75) / 2
        assert_eq!(controls.percentage(), 63);

        controls.toggle_constraint_mode(&options);
        assert_eq!(controls.mode(), ConstraintMode::Dimensions);
        assert_eq!(controls.percentage(), 63);
    }

    #[test]
    fn quality_is_clamped() {
        let controls = ResizeControls::default();
        assert_eq!(controls.set_quality(0).quality, Some(1));
        assert_eq!(controls.set_quality(-40).quality, Some(1));
        assert_eq!(controls.set_quality(150).quality, Some(100));
        assert_eq!(controls.set_quality(65).quality, Some(65));
    }

    #[test]
    fn aspect_toggle_flips() {
        let controls = ResizeControls::default();
        let next = apply(&locked(), controls.toggle_aspect_ratio(&locked()));
        assert!(!next.maintain_aspect_ratio);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut controls = ResizeControls::new(400, 200);
        controls.toggle_constraint_mode(&locked());
        let options = ResizeOptions {
            fit: FitMode::Cover,
            maintain_aspect_ratio: false,
            ..locked()
        };
        let next = apply(&options, controls.reset());
        assert_eq!(next, ResizeOptions::default());
        assert_eq!(controls.mode(), ConstraintMode::Dimensions);
        assert_eq!(controls.percentage(), 100);
    }
}
