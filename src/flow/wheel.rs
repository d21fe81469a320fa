//! Cyclic hue lookup table.

use std::sync::LazyLock;

/// Lengths of the red-yellow, yellow-green, green-cyan, cyan-blue,
/// blue-magenta and magenta-red arcs.
pub const ARC_LENGTHS: [usize; 6] = [15, 6, 4, 11, 13, 6];

/// Number of entries in the wheel.
pub const WHEEL_SIZE: usize = 55;

const RED: usize = 0;
const GREEN: usize = 1;
const BLUE: usize = 2;

/// (held channel, ramped channel, ramp rises) per arc.
const ARCS: [(usize, usize, bool); 6] = [
    (RED, GREEN, true),
    (GREEN, RED, false),
    (GREEN, BLUE, true),
    (BLUE, GREEN, false),
    (BLUE, RED, true),
    (RED, BLUE, false),
];

static WHEEL: LazyLock<ColorWheel> = LazyLock::new(ColorWheel::build);

/// Fixed table of `WHEEL_SIZE` RGB entries in `[0, 255]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorWheel {
    entries: [[f64; 3]; WHEEL_SIZE],
}

impl ColorWheel {
    /// Shared, lazily built wheel.
    pub fn global() -> &'static Self {
        &WHEEL
    }

    /// Build the wheel from scratch.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build() -> Self {
        let mut entries = [[0.0; 3]; WHEEL_SIZE];
        let mut row = 0;

        for (&len, &(held, ramped, rising)) in ARC_LENGTHS.iter().zip(ARCS.iter()) {
            for i in 0..len {
                let ramp = (255.0 * i as f64 / len as f64).floor();
                entries[row][held] = 255.0;
                entries[row][ramped] = if rising { ramp } else { 255.0 - ramp };
                row += 1;
            }
        }

        Self { entries }
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        WHEEL_SIZE
    }

    /// Always false; the wheel has a fixed size.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Entry `index` as (r, g, b).
    #[must_use]
    pub const fn get(&self, index: usize) -> [f64; 3] {
        self.entries[index]
    }

    /// All entries in order.
    #[must_use]
    pub const fn entries(&self) -> &[[f64; 3]; WHEEL_SIZE] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_size() {
        assert_eq!(ARC_LENGTHS.iter().sum::<usize>(), WHEEL_SIZE);
        assert_eq!(ColorWheel::global().len(), 55);
    }

    #[test]
    fn test_wheel_landmarks() {
        let wheel = ColorWheel::build();
        assert_eq!(wheel.get(0), [255.0, 0.0, 0.0]);
        // Start of yellow-green: pure yellow.
        assert_eq!(wheel.get(15), [255.0, 255.0, 0.0]);
        // Start of green-cyan: pure green.
        assert_eq!(wheel.get(21), [0.0, 255.0, 0.0]);
        // Start of cyan-blue: pure cyan.
        assert_eq!(wheel.get(25), [0.0, 255.0, 255.0]);
        // Start of blue-magenta: pure blue.
        assert_eq!(wheel.get(36), [0.0, 0.0, 255.0]);
        // Start of magenta-red: pure magenta.
        assert_eq!(wheel.get(49), [255.0, 0.0, 255.0]);
        // 255 - floor(255 * 5 / 6)
        assert_eq!(wheel.get(54), [255.0, 0.0, 43.0]);
    }

    #[test]
    fn test_red_yellow_ramp() {
        let wheel = ColorWheel::build();
        assert_eq!(wheel.get(1)[1], 17.0);
        assert_eq!(wheel.get(14)[1], 238.0);
    }

    #[test]
    fn test_global_matches_build() {
        assert_eq!(ColorWheel::global(), &ColorWheel::build());
    }
}
