//! Player markers.

use serde::{Deserialize, Serialize};

/// One of the two markers placed on a grid.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Marker {
    /// Moves first.
    X,
    /// Moves second.
    O,
}

impl Marker {
    /// Returns the other marker.
    pub fn opponent(self) -> Self {
        match self {
            Marker::X => Marker::O,
            Marker::O => Marker::X,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("x".parse::<Marker>(), Ok(Marker::X));
        assert_eq!("O".parse::<Marker>(), Ok(Marker::O));
        assert!("y".parse::<Marker>().is_err());
    }

    #[test]
    fn test_opponent() {
        assert_eq!(Marker::X.opponent(), Marker::O);
        assert_eq!(Marker::O.opponent(), Marker::X);
    }
}
