//! Driver primitives
//!
//! A driver primitive identifies a single raw hardware signal: a button,
//! one cardinal direction of a hat, or one signed half of an axis.

use std::fmt;

/// Hat bitmask constants as reported by the driver layer
pub mod hat_mask {
    pub const CENTERED: u8 = 0;
    pub const UP: u8 = 1;
    pub const RIGHT: u8 = 2;
    pub const DOWN: u8 = 4;
    pub const LEFT: u8 = 8;
    pub const RIGHTUP: u8 = RIGHT | UP;
    pub const RIGHTDOWN: u8 = RIGHT | DOWN;
    pub const LEFTUP: u8 = LEFT | UP;
    pub const LEFTDOWN: u8 = LEFT | DOWN;
}

/// One cardinal direction of a hat (D-pad)
///
/// `Unknown` is representable so that centered and composite driver masks
/// have a value, but it never passes validity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HatDirection {
    Unknown,
    Up,
    Right,
    Down,
    Left,
}

impl HatDirection {
    /// All four cardinal directions, in driver bit order
    pub const CARDINALS: [HatDirection; 4] = [
        HatDirection::Up,
        HatDirection::Right,
        HatDirection::Down,
        HatDirection::Left,
    ];

    /// Map a driver hat bitmask to a direction.
    ///
    /// Centered and composite masks (e.g. up|left) yield `Unknown`.
    pub fn from_mask(mask: u8) -> Self {
        match mask {
            hat_mask::UP => HatDirection::Up,
            hat_mask::RIGHT => HatDirection::Right,
            hat_mask::DOWN => HatDirection::Down,
            hat_mask::LEFT => HatDirection::Left,
            _ => HatDirection::Unknown,
        }
    }

    /// The driver bit for this direction, zero for `Unknown`
    pub fn mask(&self) -> u8 {
        match self {
            HatDirection::Unknown => hat_mask::CENTERED,
            HatDirection::Up => hat_mask::UP,
            HatDirection::Right => hat_mask::RIGHT,
            HatDirection::Down => hat_mask::DOWN,
            HatDirection::Left => hat_mask::LEFT,
        }
    }
}

impl fmt::Display for HatDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HatDirection::Unknown => "unknown",
            HatDirection::Up => "up",
            HatDirection::Right => "right",
            HatDirection::Down => "down",
            HatDirection::Left => "left",
        };
        write!(f, "{}", name)
    }
}

/// One signed half of an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SemiAxisDirection {
    Unknown,
    Negative,
    Positive,
}

impl SemiAxisDirection {
    /// The direction a signed axis position falls into; zero yields `Unknown`
    pub fn from_position(position: f32) -> Self {
        if position > 0.0 {
            SemiAxisDirection::Positive
        } else if position < 0.0 {
            SemiAxisDirection::Negative
        } else {
            SemiAxisDirection::Unknown
        }
    }

    /// The other half of the same axis
    pub fn opposite(&self) -> Self {
        match self {
            SemiAxisDirection::Unknown => SemiAxisDirection::Unknown,
            SemiAxisDirection::Negative => SemiAxisDirection::Positive,
            SemiAxisDirection::Positive => SemiAxisDirection::Negative,
        }
    }
}

impl fmt::Display for SemiAxisDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self {
            SemiAxisDirection::Unknown => "?",
            SemiAxisDirection::Negative => "-",
            SemiAxisDirection::Positive => "+",
        };
        write!(f, "{}", sign)
    }
}

/// Identity of one raw hardware element.
///
/// Plain value type: copied freely, usable as a map key. The derived ordering
/// is total (kind, then index, then direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DriverPrimitive {
    /// A button, by driver index
    Button(u32),
    /// One cardinal direction of a hat
    Hat(u32, HatDirection),
    /// One signed half of an axis
    SemiAxis(u32, SemiAxisDirection),
}

impl DriverPrimitive {
    pub fn button(index: u32) -> Self {
        DriverPrimitive::Button(index)
    }

    pub fn hat(index: u32, direction: HatDirection) -> Self {
        DriverPrimitive::Hat(index, direction)
    }

    pub fn semiaxis(index: u32, direction: SemiAxisDirection) -> Self {
        DriverPrimitive::SemiAxis(index, direction)
    }

    /// Whether this primitive may enter a button map.
    ///
    /// Buttons are always valid; hats require exactly one cardinal
    /// direction; semiaxes require a signed direction.
    pub fn is_valid(&self) -> bool {
        match self {
            DriverPrimitive::Button(_) => true,
            DriverPrimitive::Hat(_, dir) => *dir != HatDirection::Unknown,
            DriverPrimitive::SemiAxis(_, dir) => *dir != SemiAxisDirection::Unknown,
        }
    }

    /// The raw element index this primitive refers to
    pub fn index(&self) -> u32 {
        match self {
            DriverPrimitive::Button(index) => *index,
            DriverPrimitive::Hat(index, _) => *index,
            DriverPrimitive::SemiAxis(index, _) => *index,
        }
    }

    /// For a semiaxis, the primitive for the other half of the same axis
    pub fn opposite_semiaxis(&self) -> Option<DriverPrimitive> {
        match self {
            DriverPrimitive::SemiAxis(index, dir) => {
                Some(DriverPrimitive::SemiAxis(*index, dir.opposite()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for DriverPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverPrimitive::Button(index) => write!(f, "button {}", index),
            DriverPrimitive::Hat(index, dir) => write!(f, "hat {} {}", index, dir),
            DriverPrimitive::SemiAxis(index, dir) => write!(f, "axis {}{}", dir, index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_button_always_valid() {
        assert!(DriverPrimitive::button(0).is_valid());
        assert!(DriverPrimitive::button(255).is_valid());
    }

    #[rstest]
    #[case(HatDirection::Up, true)]
    #[case(HatDirection::Right, true)]
    #[case(HatDirection::Down, true)]
    #[case(HatDirection::Left, true)]
    #[case(HatDirection::Unknown, false)]
    fn test_hat_validity(#[case] dir: HatDirection, #[case] valid: bool) {
        assert_eq!(DriverPrimitive::hat(0, dir).is_valid(), valid);
    }

    #[test]
    fn test_composite_hat_mask_is_invalid() {
        let dir = HatDirection::from_mask(hat_mask::LEFTUP);
        assert_eq!(dir, HatDirection::Unknown);
        assert!(!DriverPrimitive::hat(0, dir).is_valid());

        let centered = HatDirection::from_mask(hat_mask::CENTERED);
        assert!(!DriverPrimitive::hat(0, centered).is_valid());
    }

    #[test]
    fn test_semiaxis_validity() {
        assert!(DriverPrimitive::semiaxis(2, SemiAxisDirection::Positive).is_valid());
        assert!(DriverPrimitive::semiaxis(2, SemiAxisDirection::Negative).is_valid());
        assert!(!DriverPrimitive::semiaxis(2, SemiAxisDirection::Unknown).is_valid());
    }

    #[test]
    fn test_equality_requires_all_fields() {
        assert_eq!(DriverPrimitive::button(3), DriverPrimitive::button(3));
        assert_ne!(DriverPrimitive::button(3), DriverPrimitive::button(4));
        assert_ne!(
            DriverPrimitive::hat(0, HatDirection::Up),
            DriverPrimitive::hat(0, HatDirection::Down)
        );
        assert_ne!(
            DriverPrimitive::hat(0, HatDirection::Up),
            DriverPrimitive::hat(1, HatDirection::Up)
        );
        assert_ne!(
            DriverPrimitive::button(0),
            DriverPrimitive::semiaxis(0, SemiAxisDirection::Positive)
        );
    }

    #[test]
    fn test_order_kind_then_index_then_direction() {
        let a = DriverPrimitive::button(9);
        let b = DriverPrimitive::hat(0, HatDirection::Up);
        let c = DriverPrimitive::hat(0, HatDirection::Right);
        let d = DriverPrimitive::semiaxis(0, SemiAxisDirection::Negative);

        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
    }

    #[test]
    fn test_semiaxis_opposite() {
        let pos = DriverPrimitive::semiaxis(4, SemiAxisDirection::Positive);
        let neg = DriverPrimitive::semiaxis(4, SemiAxisDirection::Negative);

        assert_eq!(pos.opposite_semiaxis(), Some(neg));
        assert_eq!(neg.opposite_semiaxis(), Some(pos));
        assert_eq!(DriverPrimitive::button(4).opposite_semiaxis(), None);
    }

    #[test]
    fn test_direction_from_position() {
        assert_eq!(
            SemiAxisDirection::from_position(0.7),
            SemiAxisDirection::Positive
        );
        assert_eq!(
            SemiAxisDirection::from_position(-0.1),
            SemiAxisDirection::Negative
        );
        assert_eq!(
            SemiAxisDirection::from_position(0.0),
            SemiAxisDirection::Unknown
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_primitive() -> impl Strategy<Value = DriverPrimitive> {
            prop_oneof![
                (0u32..16).prop_map(DriverPrimitive::Button),
                (0u32..4, prop_oneof![
                    Just(HatDirection::Up),
                    Just(HatDirection::Right),
                    Just(HatDirection::Down),
                    Just(HatDirection::Left),
                ])
                    .prop_map(|(i, d)| DriverPrimitive::Hat(i, d)),
                (0u32..8, prop_oneof![
                    Just(SemiAxisDirection::Negative),
                    Just(SemiAxisDirection::Positive),
                ])
                    .prop_map(|(i, d)| DriverPrimitive::SemiAxis(i, d)),
            ]
        }

        proptest! {
            #[test]
            fn test_order_is_total(a in arb_primitive(), b in arb_primitive(), c in arb_primitive()) {
                // Antisymmetry
                if a <= b && b <= a {
                    prop_assert_eq!(a, b);
                }
                // Transitivity
                if a <= b && b <= c {
                    prop_assert!(a <= c);
                }
                // Consistency with equality
                prop_assert_eq!(a == b, a.cmp(&b) == std::cmp::Ordering::Equal);
            }
        }
    }
}
