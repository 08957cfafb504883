//! Control axis identifiers.

/// One of the three axes this control law drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    Roll,
    Pitch,
    Yaw,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::Roll, Axis::Pitch, Axis::Yaw];

    /// Map a raw axis index (0 = roll, 1 = pitch, 2 = yaw).
    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Axis::Roll),
            1 => Some(Axis::Pitch),
            2 => Some(Axis::Yaw),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Axis::Roll => 0,
            Axis::Pitch => 1,
            Axis::Yaw => 2,
        }
    }

    /// Roll and pitch are cyclic; yaw is the tail rotor.
    #[inline]
    #[must_use]
    pub const fn is_cyclic(self) -> bool {
        matches!(self, Axis::Roll | Axis::Pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_index(axis.index()), Some(axis));
        }
    }

    #[test]
    fn test_unknown_index() {
        assert_eq!(Axis::from_index(3), None);
        assert_eq!(Axis::from_index(usize::MAX), None);
    }

    #[test]
    fn test_cyclic_axes() {
        assert!(Axis::Roll.is_cyclic());
        assert!(Axis::Pitch.is_cyclic());
        assert!(!Axis::Yaw.is_cyclic());
    }
}
