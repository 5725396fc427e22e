//! Synthetic file content generators

/// Content mode selected by the CREATE command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// Repeating lowercase alphabet
    Alpha,

    /// Repeating decimal digits
    Numeric,

    /// Repeating uppercase hexadecimal digits
    Hex,
}

impl ContentMode {
    /// Parses a `-MODE` token; keywords are case-sensitive
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "-ALFA" => Some(Self::Alpha),
            "-NUM" => Some(Self::Numeric),
            "-HEX" => Some(Self::Hex),
            _ => None,
        }
    }

    fn source(self) -> &'static [u8] {
        match self {
            Self::Alpha => b"abcdefghijklmnopqrstuvwxyz",
            Self::Numeric => b"0123456789",
            Self::Hex => b"0123456789ABCDEF",
        }
    }

    /// Produces `length` bytes of the infinitely repeated source sequence
    pub fn generate(self, length: usize) -> Vec<u8> {
        self.source().iter().copied().cycle().take(length).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_repeats_the_alphabet_from_a() {
        assert_eq!(
            ContentMode::Alpha.generate(28),
            b"abcdefghijklmnopqrstuvwxyzab".to_vec()
        );
    }

    #[test]
    fn generators_cycle_their_sources() {
        assert_eq!(ContentMode::Numeric.generate(12), b"012345678901".to_vec());
        assert_eq!(
            ContentMode::Hex.generate(18),
            b"0123456789ABCDEF01".to_vec()
        );
        assert!(ContentMode::Alpha.generate(0).is_empty());
    }

    #[test]
    fn parse_accepts_only_the_exact_keywords() {
        assert_eq!(ContentMode::parse("-ALFA"), Some(ContentMode::Alpha));
        assert_eq!(ContentMode::parse("-NUM"), Some(ContentMode::Numeric));
        assert_eq!(ContentMode::parse("-HEX"), Some(ContentMode::Hex));
        assert_eq!(ContentMode::parse("-alfa"), None);
        assert_eq!(ContentMode::parse("ALFA"), None);
        assert_eq!(ContentMode::parse(""), None);
    }
}
