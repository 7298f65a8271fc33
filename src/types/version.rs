//! Format version identifiers

use std::fmt;

/// Supported on-disk format versions, ordered oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QxpVersion {
    /// 1.x
    Qxp1,
    /// 3.1 Macintosh
    Qxp31Mac,
    /// 3.1
    Qxp31,
    /// 3.3
    Qxp33,
    /// 4.x
    Qxp4,
}

impl QxpVersion {
    /// The version word stored in the file header.
    pub fn code(&self) -> u16 {
        match self {
            QxpVersion::Qxp1 => 0x20,
            QxpVersion::Qxp31Mac => 0x39,
            QxpVersion::Qxp31 => 0x3e,
            QxpVersion::Qxp33 => 0x3f,
            QxpVersion::Qxp4 => 0x41,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x20 => Some(QxpVersion::Qxp1),
            0x39 => Some(QxpVersion::Qxp31Mac),
            0x3e => Some(QxpVersion::Qxp31),
            0x3f => Some(QxpVersion::Qxp33),
            0x41 => Some(QxpVersion::Qxp4),
            _ => None,
        }
    }

    /// Version words of later releases whose layout is not decoded (5.x to 8.x).
    pub fn is_known_unsupported(code: u16) -> bool {
        (0x42..=0x45).contains(&code)
    }
}

impl fmt::Display for QxpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QxpVersion::Qxp1 => "1.x",
            QxpVersion::Qxp31Mac => "3.1 Mac",
            QxpVersion::Qxp31 => "3.1",
            QxpVersion::Qxp33 => "3.3",
            QxpVersion::Qxp4 => "4.x",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for v in [
            QxpVersion::Qxp1,
            QxpVersion::Qxp31Mac,
            QxpVersion::Qxp31,
            QxpVersion::Qxp33,
            QxpVersion::Qxp4,
        ] {
            assert_eq!(QxpVersion::from_code(v.code()), Some(v));
        }
        assert_eq!(QxpVersion::from_code(0x42), None);
    }

    #[test]
    fn test_ordering() {
        assert!(QxpVersion::Qxp1 < QxpVersion::Qxp31Mac);
        assert!(QxpVersion::Qxp31 < QxpVersion::Qxp33);
        assert!(QxpVersion::Qxp33 < QxpVersion::Qxp4);
    }

    #[test]
    fn test_known_unsupported() {
        assert!(QxpVersion::is_known_unsupported(0x43));
        assert!(!QxpVersion::is_known_unsupported(0x41));
    }
}
