//! Output flags compatible with the classic stdlib logger flag set

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

/// Formatting flags captured into every record
///
/// The bit values match the traditional `Ldate`, `Ltime`, ... constants so
/// numeric flag values carried over from other configurations keep meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u32);

impl Flags {
    /// The date in the local time zone: `2009/01/23`
    pub const DATE: Flags = Flags(1);
    /// The time in the local time zone: `01:23:23`
    pub const TIME: Flags = Flags(1 << 1);
    /// Microsecond resolution: `01:23:23.123123`. Assumes `TIME`.
    pub const MICROSECONDS: Flags = Flags(1 << 2);
    /// Full file name and line number of the call site
    pub const LONG_FILE: Flags = Flags(1 << 3);
    /// Final file name element and line number. Overrides `LONG_FILE`.
    pub const SHORT_FILE: Flags = Flags(1 << 4);
    /// Use UTC rather than the record's own offset
    pub const UTC: Flags = Flags(1 << 5);
    /// Accepted for compatibility; the prefix position is fixed by the handlers
    pub const MSG_PREFIX: Flags = Flags(1 << 6);
    /// `DATE | TIME`
    pub const STD: Flags = Flags(1 | (1 << 1));

    #[must_use]
    pub const fn empty() -> Self {
        Flags(0)
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Flags(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// All bits of `other` are set
    #[must_use]
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Any bit of `other` is set
    #[must_use]
    pub const fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether call-site capture was requested
    #[must_use]
    pub const fn wants_source(self) -> bool {
        self.intersects(Flags(Flags::LONG_FILE.0 | Flags::SHORT_FILE.0))
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Flags {
    type Output = Flags;

    fn bitand(self, rhs: Flags) -> Flags {
        Flags(self.0 & rhs.0)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Flags, &str); 7] = [
            (Flags::DATE, "date"),
            (Flags::TIME, "time"),
            (Flags::MICROSECONDS, "microseconds"),
            (Flags::LONG_FILE, "longfile"),
            (Flags::SHORT_FILE, "shortfile"),
            (Flags::UTC, "utc"),
            (Flags::MSG_PREFIX, "msgprefix"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}

impl FromStr for Flags {
    type Err = String;

    /// Parses `|` or `,` separated names, e.g. `date|time|microseconds`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Flags::empty();
        for part in s.split(['|', ',']).map(str::trim).filter(|p| !p.is_empty()) {
            flags |= match part.to_lowercase().as_str() {
                "date" => Flags::DATE,
                "time" => Flags::TIME,
                "microseconds" | "micros" => Flags::MICROSECONDS,
                "longfile" => Flags::LONG_FILE,
                "shortfile" => Flags::SHORT_FILE,
                "utc" => Flags::UTC,
                "msgprefix" => Flags::MSG_PREFIX,
                "std" | "stdflags" => Flags::STD,
                _ => return Err(format!("Invalid flag: '{}'", part)),
            };
        }
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_flags() {
        assert_eq!(Flags::STD, Flags::DATE | Flags::TIME);
        assert_eq!(Flags::STD.bits(), 3);
        assert!(Flags::STD.contains(Flags::DATE));
        assert!(!Flags::STD.contains(Flags::MICROSECONDS));
    }

    #[test]
    fn test_wants_source() {
        assert!(!Flags::STD.wants_source());
        assert!((Flags::STD | Flags::SHORT_FILE).wants_source());
        assert!(Flags::LONG_FILE.wants_source());
    }

    #[test]
    fn test_parse_and_display() {
        let flags: Flags = "date|time, microseconds".parse().unwrap();
        assert_eq!(flags, Flags::DATE | Flags::TIME | Flags::MICROSECONDS);
        assert_eq!(flags.to_string(), "date|time|microseconds");
        assert_eq!("".parse::<Flags>(), Ok(Flags::empty()));
        assert!("colour".parse::<Flags>().is_err());
    }
}
