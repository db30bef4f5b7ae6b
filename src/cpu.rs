//! Controller model families.
//!
//! This module defines the [`CpuFamily`] enum which identifies the
//! Allen-Bradley controller family being addressed. The family determines
//! two things the rest of the crate cares about:
//!
//! - whether a **routing path** (backplane port/slot, e.g. `"1,0"`) is
//!   mandatory when constructing a [`Controller`](crate::Controller), and
//! - the `cpu=` token placed in the transport address string.
//!
//! | Family | Routing path | Address token |
//! |--------|:------------:|---------------|
//! | [`CpuFamily::ControlLogix`] | required | `lgx` |
//! | [`CpuFamily::CompactLogix`] | required | `lgx` |
//! | [`CpuFamily::Micro800`] | — | `micro800` |
//! | [`CpuFamily::Plc5`] | — | `plc5` |
//! | [`CpuFamily::Slc500`] | — | `slc500` |
//! | [`CpuFamily::MicroLogix`] | — | `mlgx` |
//!
//! # Example
//!
//! ```
//! use logix_tags::CpuFamily;
//!
//! assert!(CpuFamily::ControlLogix.requires_path());
//! assert!(!CpuFamily::MicroLogix.requires_path());
//! assert_eq!(CpuFamily::CompactLogix.to_string(), "CompactLogix");
//! ```

/// Allen-Bradley controller families supported by the transport.
///
/// Logix-class controllers sit behind a backplane, so reaching the CPU from
/// the EtherNet/IP gateway needs a routing path. The older PLC/SLC/MicroLogix
/// families are addressed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuFamily {
    /// ControlLogix (1756 chassis).
    ControlLogix,
    /// CompactLogix (1769 and 5380 lines).
    CompactLogix,
    /// Micro800 series.
    Micro800,
    /// PLC-5 legacy family.
    Plc5,
    /// SLC 500 legacy family.
    Slc500,
    /// MicroLogix (1100/1400).
    MicroLogix,
}

impl CpuFamily {
    /// Returns whether this family mandates a routing path at construction.
    ///
    /// # Example
    ///
    /// ```
    /// use logix_tags::CpuFamily;
    ///
    /// assert!(CpuFamily::ControlLogix.requires_path());
    /// assert!(!CpuFamily::Slc500.requires_path());
    /// ```
    pub fn requires_path(self) -> bool {
        matches!(self, CpuFamily::ControlLogix | CpuFamily::CompactLogix)
    }

    /// Returns the `cpu=` token used in the transport address string.
    pub(crate) fn address_token(self) -> &'static str {
        match self {
            CpuFamily::ControlLogix | CpuFamily::CompactLogix => "lgx",
            CpuFamily::Micro800 => "micro800",
            CpuFamily::Plc5 => "plc5",
            CpuFamily::Slc500 => "slc500",
            CpuFamily::MicroLogix => "mlgx",
        }
    }
}

impl std::fmt::Display for CpuFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CpuFamily::ControlLogix => write!(f, "ControlLogix"),
            CpuFamily::CompactLogix => write!(f, "CompactLogix"),
            CpuFamily::Micro800 => write!(f, "Micro800"),
            CpuFamily::Plc5 => write!(f, "PLC-5"),
            CpuFamily::Slc500 => write!(f, "SLC 500"),
            CpuFamily::MicroLogix => write!(f, "MicroLogix"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_path() {
        assert!(CpuFamily::ControlLogix.requires_path());
        assert!(CpuFamily::CompactLogix.requires_path());
        assert!(!CpuFamily::Micro800.requires_path());
        assert!(!CpuFamily::Plc5.requires_path());
        assert!(!CpuFamily::Slc500.requires_path());
        assert!(!CpuFamily::MicroLogix.requires_path());
    }

    #[test]
    fn test_address_tokens() {
        assert_eq!(CpuFamily::ControlLogix.address_token(), "lgx");
        assert_eq!(CpuFamily::CompactLogix.address_token(), "lgx");
        assert_eq!(CpuFamily::Micro800.address_token(), "micro800");
        assert_eq!(CpuFamily::Plc5.address_token(), "plc5");
        assert_eq!(CpuFamily::Slc500.address_token(), "slc500");
        assert_eq!(CpuFamily::MicroLogix.address_token(), "mlgx");
    }

    #[test]
    fn test_display() {
        assert_eq!(CpuFamily::ControlLogix.to_string(), "ControlLogix");
        assert_eq!(CpuFamily::Plc5.to_string(), "PLC-5");
        assert_eq!(CpuFamily::MicroLogix.to_string(), "MicroLogix");
    }
}
