//! Header transforms
//!
//! At progress 0 the header is fully expanded: the panel sits at its natural
//! position and the title is centered in the area above the collapsed bar.
//! At progress 1 the panel has moved up by the collapse distance, leaving
//! only the collapsed bar visible, and the title is shrunk into the bar's
//! top-left corner. Everything in between is a straight lerp.

use serde::{Deserialize, Serialize};

/// Linear interpolation, `t` clamped to `[0, 1]`
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    start + (end - start) * t
}

/// Geometry of the header panel and its title
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderLayout {
    /// Panel width
    pub width: f32,
    /// Panel height when expanded
    pub height: f32,
    /// Title width at scale 1
    pub title_width: f32,
    /// Title height at scale 1
    pub title_height: f32,
    /// Height of the bar that stays visible when collapsed
    pub collapsed_height: f32,
    /// Distance the panel moves up at progress 1
    pub collapse_distance: f32,
}

impl Default for HeaderLayout {
    fn default() -> Self {
        Self {
            width: 360.0,
            height: 250.0,
            title_width: 200.0,
            title_height: 100.0,
            collapsed_height: 50.0,
            collapse_distance: 150.0,
        }
    }
}

impl HeaderLayout {
    /// Title offset inside the panel at progress 0
    pub fn expanded_title_offset(&self) -> (f32, f32) {
        (
            (self.width - self.title_width) / 2.0,
            (self.height - self.collapsed_height - self.title_height) / 2.0,
        )
    }

    /// Title offset inside the panel at progress 1
    pub fn collapsed_title_offset(&self) -> (f32, f32) {
        (0.0, self.collapse_distance)
    }

    /// Title scale at progress 1
    pub fn collapsed_title_scale(&self) -> f32 {
        if self.title_height <= 0.0 {
            return 1.0;
        }
        self.collapsed_height / self.title_height
    }
}

/// Resolved visual state of the header for one progress value
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HeaderTransform {
    /// Vertical translation of the whole panel (zero or negative)
    pub panel_offset_y: f32,
    pub title_offset: (f32, f32),
    /// Uniform title scale
    pub title_scale: f32,
}

impl HeaderTransform {
    pub fn at(layout: &HeaderLayout, progress: f64) -> Self {
        let t = progress as f32;
        let (sx, sy) = layout.expanded_title_offset();
        let (ex, ey) = layout.collapsed_title_offset();
        Self {
            panel_offset_y: -layout.collapse_distance * t.clamp(0.0, 1.0),
            title_offset: (lerp(sx, ex, t), lerp(sy, ey, t)),
            title_scale: lerp(1.0, layout.collapsed_title_scale(), t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_lerp_clamps() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, -1.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 2.0), 10.0);
    }

    #[test]
    fn test_expanded_header() {
        let layout = HeaderLayout::default();
        let t = HeaderTransform::at(&layout, 0.0);
        assert_eq!(t.panel_offset_y, 0.0);
        assert_eq!(t.title_offset, (80.0, 50.0));
        assert_eq!(t.title_scale, 1.0);
    }

    #[test]
    fn test_collapsed_header() {
        let layout = HeaderLayout::default();
        let t = HeaderTransform::at(&layout, 1.0);
        assert_eq!(t.panel_offset_y, -150.0);
        assert_eq!(t.title_offset, (0.0, 150.0));
        assert!(approx(t.title_scale, 0.5));
    }

    #[test]
    fn test_halfway() {
        let layout = HeaderLayout::default();
        let t = HeaderTransform::at(&layout, 0.5);
        assert!(approx(t.panel_offset_y, -75.0));
        assert!(approx(t.title_offset.0, 40.0));
        assert!(approx(t.title_offset.1, 100.0));
        assert!(approx(t.title_scale, 0.75));
    }

    #[test]
    fn test_zero_title_height_keeps_scale() {
        let layout = HeaderLayout {
            title_height: 0.0,
            ..HeaderLayout::default()
        };
        assert_eq!(layout.collapsed_title_scale(), 1.0);
    }
}
