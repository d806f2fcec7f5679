use std::str;

use crate::error::ModelError;
use strum::{EnumIter, IntoStaticStr};

/// Bus access mode of a register
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Mode {
    /// Bus can read a value that fabric provides
    #[strum(serialize = "r")]
    Read,
    /// Bus can write a value that is available for fabric usage
    #[strum(serialize = "w")]
    Write,
    /// Bus can write a value and read it back
    #[strum(serialize = "r_w")]
    ReadWrite,
    /// Bus can write a value that is asserted for one clock cycle in fabric
    #[strum(serialize = "wpulse")]
    WritePulse,
    /// Bus can read a value that fabric provides, and write a pulsed value
    #[strum(serialize = "r_wpulse")]
    ReadWritePulse,
}

impl Mode {
    /// Short name as used in register TOML files and HDL, e.g., `r_w`
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Human readable description, e.g., "Read, Write"
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Write => "Write",
            Self::ReadWrite => "Read, Write",
            Self::WritePulse => "Write-pulse",
            Self::ReadWritePulse => "Read, Write-pulse",
        }
    }

    #[must_use]
    pub const fn is_bus_readable(&self) -> bool {
        match self {
            Self::Read | Self::ReadWrite | Self::ReadWritePulse => true,
            Self::Write | Self::WritePulse => false,
        }
    }

    #[must_use]
    pub const fn is_bus_writeable(&self) -> bool {
        !matches!(self, Self::Read)
    }
}

impl str::FromStr for Mode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            "r_w" => Ok(Self::ReadWrite),
            "wpulse" => Ok(Self::WritePulse),
            "r_wpulse" => Ok(Self::ReadWritePulse),
            s => Err(ModelError::InvalidMode(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn mode_strings_round_trip() {
        for mode in Mode::iter() {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!(Mode::ReadWrite.as_str(), "r_w");
        assert_eq!(
            "rw".parse::<Mode>(),
            Err(ModelError::InvalidMode("rw".to_owned()))
        );
    }

    #[test]
    fn bus_access() {
        let readable = Mode::iter().filter(Mode::is_bus_readable).count();
        let writeable = Mode::iter().filter(Mode::is_bus_writeable).count();
        assert_eq!(readable, 3);
        assert_eq!(writeable, 4);
        assert!(!Mode::Read.is_bus_writeable());
        assert!(!Mode::WritePulse.is_bus_readable());
    }
}
