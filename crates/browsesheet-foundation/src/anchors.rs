//! Anchor positions the sheet rests at.
//!
//! Offsets grow downwards: `0` is fully expanded and `max_offset` (the
//! available height) is fully dismissed.

use browsesheet_ui_graphics::{Density, Dp};

use crate::config::SheetConfig;
use crate::error::SheetError;

/// Named anchor role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetValue {
    Expanded,
    FullWidth,
    Collapsed,
    Dismissed,
}

impl SheetValue {
    pub const ALL: [SheetValue; 4] = [
        SheetValue::Expanded,
        SheetValue::FullWidth,
        SheetValue::Collapsed,
        SheetValue::Dismissed,
    ];
}

/// Four ordered offsets: `min <= full_width <= collapsed <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetAnchors {
    /// Fully expanded.
    pub min_offset: f32,
    /// Sheet has reached full width.
    pub full_width_offset: f32,
    /// Initial resting position.
    pub collapsed_offset: f32,
    /// Dismissed.
    pub max_offset: f32,
}

impl SheetAnchors {
    /// Placeholder until the first layout. Drags cannot go above 0 but are
    /// otherwise unbounded.
    pub const EMPTY: SheetAnchors = SheetAnchors {
        min_offset: 0.0,
        full_width_offset: 0.0,
        collapsed_offset: 0.0,
        max_offset: f32::MAX,
    };

    pub fn new(
        min_offset: f32,
        full_width_offset: f32,
        collapsed_offset: f32,
        max_offset: f32,
    ) -> Result<Self, SheetError> {
        for (name, value) in [
            ("min_offset", min_offset),
            ("full_width_offset", full_width_offset),
            ("collapsed_offset", collapsed_offset),
            ("max_offset", max_offset),
        ] {
            if !value.is_finite() {
                return Err(SheetError::NonFiniteAnchor { name, value });
            }
        }
        if !(min_offset <= full_width_offset
            && full_width_offset <= collapsed_offset
            && collapsed_offset <= max_offset)
        {
            return Err(SheetError::UnorderedAnchors {
                min: min_offset,
                full_width: full_width_offset,
                collapsed: collapsed_offset,
                max: max_offset,
            });
        }
        Ok(Self {
            min_offset,
            full_width_offset,
            collapsed_offset,
            max_offset,
        })
    }

    /// Anchors for `max_height` pixels of room: full width at 20%, collapsed
    /// at 30%, dismissed at the bottom edge.
    pub fn from_max_height(max_height: f32) -> Self {
        Self::from_fractions(max_height, 0.2, 0.3)
    }

    pub fn from_max_height_with(max_height: f32, config: &SheetConfig) -> Self {
        Self::from_fractions(
            max_height,
            config.full_width_fraction,
            config.collapsed_fraction,
        )
    }

    pub fn from_max_height_dp(max_height: Dp, density: Density) -> Self {
        Self::from_max_height(density.dp_to_px(max_height))
    }

    fn from_fractions(max_height: f32, full_width_fraction: f32, collapsed_fraction: f32) -> Self {
        let height = if max_height.is_finite() {
            max_height.max(0.0)
        } else {
            0.0
        };
        if height == 0.0 {
            log::warn!("sheet laid out with no height ({max_height})");
        }
        Self {
            min_offset: 0.0,
            full_width_offset: full_width_fraction * height,
            collapsed_offset: collapsed_fraction * height,
            max_offset: height,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn offset_of(&self, value: SheetValue) -> f32 {
        match value {
            SheetValue::Expanded => self.min_offset,
            SheetValue::FullWidth => self.full_width_offset,
            SheetValue::Collapsed => self.collapsed_offset,
            SheetValue::Dismissed => self.max_offset,
        }
    }

    /// Role whose offset equals `offset` exactly. When anchors coincide the
    /// first role in expanded-to-dismissed order wins.
    pub fn value_at(&self, offset: f32) -> Option<SheetValue> {
        SheetValue::ALL
            .into_iter()
            .find(|value| self.offset_of(*value) == offset)
    }

    /// Role whose offset is closest to `offset`.
    pub fn nearest_value(&self, offset: f32) -> SheetValue {
        SheetValue::ALL
            .into_iter()
            .min_by(|a, b| {
                let da = (self.offset_of(*a) - offset).abs();
                let db = (self.offset_of(*b) - offset).abs();
                da.total_cmp(&db)
            })
            .unwrap_or(SheetValue::Expanded)
    }

    /// Clamps `offset` into `[min_offset, max_offset]`.
    pub fn coerce(&self, offset: f32) -> f32 {
        offset.max(self.min_offset).min(self.max_offset)
    }

    /// Maps `offset` onto `new`: an offset sitting exactly on one of these
    /// anchors moves to the same role in `new`, anything else is kept.
    pub fn corresponding_offset(&self, offset: f32, new: &SheetAnchors) -> f32 {
        match self.value_at(offset) {
            Some(value) => new.offset_of(value),
            None => offset,
        }
    }
}

impl Default for SheetAnchors {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn from_max_height_uses_fixed_fractions() {
        let anchors = SheetAnchors::from_max_height(1000.0);
        assert_eq!(anchors.min_offset, 0.0);
        assert_close(anchors.full_width_offset, 200.0);
        assert_close(anchors.collapsed_offset, 300.0);
        assert_eq!(anchors.max_offset, 1000.0);
    }

    #[test]
    fn zero_height_collapses_every_anchor() {
        let anchors = SheetAnchors::from_max_height(0.0);
        assert_eq!(anchors.min_offset, 0.0);
        assert_eq!(anchors.max_offset, 0.0);
        assert!(!anchors.is_empty());
    }

    #[test]
    fn negative_and_nan_heights_clamp_to_zero() {
        assert_eq!(SheetAnchors::from_max_height(-50.0).max_offset, 0.0);
        assert_eq!(SheetAnchors::from_max_height(f32::NAN).max_offset, 0.0);
    }

    #[test]
    fn dp_heights_convert_through_density() {
        let anchors = SheetAnchors::from_max_height_dp(Dp(400.0), Density::new(2.0));
        assert_eq!(anchors.max_offset, 800.0);
        assert_close(anchors.collapsed_offset, 240.0);
    }

    #[test]
    fn configured_fractions_are_applied() {
        let config = SheetConfig::default().with_fractions(0.1, 0.5);
        let anchors = SheetAnchors::from_max_height_with(200.0, &config);
        assert_close(anchors.full_width_offset, 20.0);
        assert_close(anchors.collapsed_offset, 100.0);
    }

    #[test]
    fn new_rejects_bad_anchors() {
        assert!(matches!(
            SheetAnchors::new(0.0, f32::INFINITY, 30.0, 100.0),
            Err(SheetError::NonFiniteAnchor {
                name: "full_width_offset",
                ..
            })
        ));
        assert!(matches!(
            SheetAnchors::new(0.0, 40.0, 30.0, 100.0),
            Err(SheetError::UnorderedAnchors { .. })
        ));
        assert!(SheetAnchors::new(0.0, 20.0, 30.0, 100.0).is_ok());
    }

    #[test]
    fn value_lookup_matches_roles_exactly() {
        let anchors = SheetAnchors::new(0.0, 20.0, 30.0, 100.0).unwrap();
        assert_eq!(anchors.value_at(30.0), Some(SheetValue::Collapsed));
        assert_eq!(anchors.value_at(100.0), Some(SheetValue::Dismissed));
        assert_eq!(anchors.value_at(31.0), None);
        assert_eq!(anchors.nearest_value(31.0), SheetValue::Collapsed);
        assert_eq!(anchors.nearest_value(80.0), SheetValue::Dismissed);
    }

    #[test]
    fn corresponding_offset_follows_roles() {
        let old = SheetAnchors::new(0.0, 20.0, 30.0, 100.0).unwrap();
        let new = SheetAnchors::new(0.0, 25.0, 35.0, 120.0).unwrap();

        assert_eq!(old.corresponding_offset(30.0, &new), 35.0);
        assert_eq!(old.corresponding_offset(100.0, &new), 120.0);
        assert_eq!(old.corresponding_offset(17.0, &new), 17.0);
    }

    #[test]
    fn empty_sentinel_floors_at_zero() {
        let empty = SheetAnchors::EMPTY;
        assert!(empty.is_empty());
        assert_eq!(empty.coerce(-1.0e9), 0.0);
        assert_eq!(empty.coerce(1.0e9), 1.0e9);
    }
}
