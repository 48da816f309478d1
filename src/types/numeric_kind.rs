//! Sample data type resolution

use serde::{Deserialize, Serialize};

/// Type class used by logger float channels.
pub const TYPE_CLASS_FLOAT: u16 = 0x07;
/// Type classes used by logger integer channels.
pub const TYPE_CLASSES_INT: [u16; 3] = [0x00, 0x03, 0x05];

const FLOAT_ROW: [NumericKind; 4] =
    [NumericKind::Unresolved, NumericKind::Float16, NumericKind::Unresolved, NumericKind::Float32];
const INT_ROW: [NumericKind; 4] =
    [NumericKind::Unresolved, NumericKind::Int16, NumericKind::Unresolved, NumericKind::Int32];

/// Numeric interpretation of a channel's raw sample array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericKind {
    /// 16-bit signed little-endian integer
    Int16,
    /// 32-bit signed little-endian integer
    Int32,
    /// IEEE 754 half precision (recognized, not decodable)
    Float16,
    /// IEEE 754 single precision
    Float32,
    /// No known interpretation for the type codes
    Unresolved,
}

impl NumericKind {
    /// Returns the byte width of one sample, `None` for `Unresolved`.
    pub const fn size(&self) -> Option<usize> {
        match self {
            NumericKind::Int16 | NumericKind::Float16 => Some(2),
            NumericKind::Int32 | NumericKind::Float32 => Some(4),
            NumericKind::Unresolved => None,
        }
    }

    /// Whether samples of this kind can be reconstructed.
    pub const fn is_decodable(&self) -> bool {
        matches!(self, NumericKind::Int16 | NumericKind::Int32 | NumericKind::Float32)
    }
}

/// Resolves a channel's `(datatypeA, datatype)` pair to a numeric kind.
///
/// The type code indexes a four-entry row selected by the type class; codes
/// outside `1..=4` and unknown classes resolve to [`NumericKind::Unresolved`].
pub fn resolve(type_class: u16, type_code: u16) -> NumericKind {
    let row = if type_class == TYPE_CLASS_FLOAT {
        &FLOAT_ROW
    } else if TYPE_CLASSES_INT.contains(&type_class) {
        &INT_ROW
    } else {
        return NumericKind::Unresolved;
    };

    type_code
        .checked_sub(1)
        .and_then(|index| row.get(index as usize))
        .copied()
        .unwrap_or(NumericKind::Unresolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn documented_rows_resolve() {
        assert_eq!(resolve(0x07, 2), NumericKind::Float16);
        assert_eq!(resolve(0x07, 4), NumericKind::Float32);
        for class in TYPE_CLASSES_INT {
            assert_eq!(resolve(class, 2), NumericKind::Int16);
            assert_eq!(resolve(class, 4), NumericKind::Int32);
        }
        assert_eq!(NumericKind::Float32.size(), Some(4));
        assert_eq!(NumericKind::Int16.size(), Some(2));
    }

    #[test]
    fn gaps_and_edges_are_unresolved() {
        for class in [0x00, 0x03, 0x05, 0x07] {
            assert_eq!(resolve(class, 0), NumericKind::Unresolved);
            assert_eq!(resolve(class, 1), NumericKind::Unresolved);
            assert_eq!(resolve(class, 3), NumericKind::Unresolved);
            assert_eq!(resolve(class, 5), NumericKind::Unresolved);
        }
        assert_eq!(NumericKind::Unresolved.size(), None);
        assert!(!NumericKind::Float16.is_decodable());
    }

    proptest! {
        #[test]
        fn unlisted_type_classes_never_resolve(
            class in any::<u16>().prop_filter("listed class", |c| ![0, 3, 5, 7].contains(c)),
            code in any::<u16>(),
        ) {
            prop_assert_eq!(resolve(class, code), NumericKind::Unresolved);
        }

        #[test]
        fn resolved_kinds_always_have_a_width(
            class in prop::sample::select(vec![0u16, 3, 5, 7]),
            code in 0u16..16,
        ) {
            let kind = resolve(class, code);
            prop_assert_eq!(kind == NumericKind::Unresolved, kind.size().is_none());
        }
    }
}
