//! Configuration errors

/// A configuration value outside its accepted range
///
/// Carries the rejected raw value so callers can log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Chained group size not in 1..=4
    GroupSize(u8),
    /// Address is not one of the four Beam addresses
    Address(u8),
    /// Frame delay not in 1..=15
    Speed(u8),
    /// Loop count not in 1..=7
    Loops(u8),
    /// Scroll direction other than right (0) or left (1)
    Direction(u8),
    /// Mode other than movie or scroll
    Mode(u8),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GroupSize(n) => write!(f, "group size {} not in 1..=4", n),
            Self::Address(a) => write!(f, "{:#x} is not a Beam address", a),
            Self::Speed(s) => write!(f, "speed {} not in 1..=15", s),
            Self::Loops(l) => write!(f, "loop count {} not in 1..=7", l),
            Self::Direction(d) => write!(f, "scroll direction {} not 0 or 1", d),
            Self::Mode(m) => write!(f, "mode {} not movie or scroll", m),
        }
    }
}
