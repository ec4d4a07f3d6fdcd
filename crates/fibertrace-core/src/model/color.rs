// ── TIA-598 fiber color code ──
//
// Fibers inside a cable are identified by the standard 12-color sequence,
// repeating per buffer tube. Colors are derived from the fiber number,
// never stored; the splice-tray UI renders them on trace reports.

use serde::{Deserialize, Serialize};

/// One of the twelve TIA-598 jacket colors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FiberColor {
    Blue,
    Orange,
    Green,
    Brown,
    Slate,
    White,
    Red,
    Black,
    Yellow,
    Violet,
    Rose,
    Aqua,
}

impl FiberColor {
    /// Standard ordering, position 1 through 12.
    pub const SEQUENCE: [Self; 12] = [
        Self::Blue,
        Self::Orange,
        Self::Green,
        Self::Brown,
        Self::Slate,
        Self::White,
        Self::Red,
        Self::Black,
        Self::Yellow,
        Self::Violet,
        Self::Rose,
        Self::Aqua,
    ];

    /// Color for a 1-based fiber number. Repeats every 12 fibers.
    pub fn for_fiber(fiber: u32) -> Self {
        let index = fiber.saturating_sub(1) % 12;
        Self::SEQUENCE[usize::try_from(index).unwrap_or(0)]
    }

    /// 1-based buffer tube holding a fiber (12 fibers per tube).
    pub fn tube_for_fiber(fiber: u32) -> u32 {
        fiber.saturating_sub(1) / 12 + 1
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn first_tube_colors() {
        assert_eq!(FiberColor::for_fiber(1), FiberColor::Blue);
        assert_eq!(FiberColor::for_fiber(5), FiberColor::Slate);
        assert_eq!(FiberColor::for_fiber(12), FiberColor::Aqua);
    }

    #[test]
    fn sequence_repeats_per_tube() {
        assert_eq!(FiberColor::for_fiber(13), FiberColor::Blue);
        assert_eq!(FiberColor::for_fiber(24), FiberColor::Aqua);
        assert_eq!(FiberColor::tube_for_fiber(12), 1);
        assert_eq!(FiberColor::tube_for_fiber(13), 2);
        assert_eq!(FiberColor::tube_for_fiber(144), 12);
    }

    #[test]
    fn renders_kebab_case() {
        assert_eq!(FiberColor::Slate.to_string(), "slate");
        let parsed: FiberColor = "rose".parse().unwrap();
        assert_eq!(parsed, FiberColor::Rose);
    }
}
