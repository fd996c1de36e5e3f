//! Activation code generation.
//!
//! Codes are eight decimal digits derived from the vehicle plate and the
//! number of days they unlock. The default checksum scheme is trivially
//! brute-forceable (a 32-bit hash over four possible durations); it deters
//! casual sharing and nothing more. The keyed scheme replaces the checksum
//! with a BLAKE3 keyed hash so codes cannot be minted without the key.

use serde::Serialize;

use crate::config::{LicenseConfig, SchemeKind, DEFAULT_LICENSE_SECRET};
use crate::error::{Error, Result};

/// Number of digits in an activation code.
pub const CODE_LEN: usize = 8;

const CODE_MODULUS: u64 = 100_000_000;

/// A purchasable license extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u32")]
pub enum LicenseDuration {
    /// 30 days.
    OneMonth,
    /// 90 days.
    ThreeMonths,
    /// 180 days.
    SixMonths,
    /// 365 days.
    TwelveMonths,
}

impl LicenseDuration {
    /// All durations, in the order activation tries them.
    pub const ALL: [Self; 4] = [
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::TwelveMonths,
    ];

    /// Length in days.
    #[must_use]
    pub fn days(self) -> u32 {
        match self {
            Self::OneMonth => 30,
            Self::ThreeMonths => 90,
            Self::SixMonths => 180,
            Self::TwelveMonths => 365,
        }
    }

    /// Label shown next to issued codes.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "1 Mois",
            Self::ThreeMonths => "3 Mois",
            Self::SixMonths => "6 Mois",
            Self::TwelveMonths => "12 Mois",
        }
    }
}

impl From<LicenseDuration> for u32 {
    fn from(duration: LicenseDuration) -> Self {
        duration.days()
    }
}

/// Whitespace as the code issuer's `\s` sees it: Unicode `White_Space`
/// minus NEL (U+0085), plus the byte order mark (U+FEFF).
fn is_code_whitespace(c: char) -> bool {
    match c {
        '\u{FEFF}' => true,
        '\u{0085}' => false,
        c => c.is_whitespace(),
    }
}

/// Strip all whitespace and uppercase.
#[must_use]
pub fn normalize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !is_code_whitespace(*c))
        .collect::<String>()
        .to_uppercase()
}

/// Generate the checksum-scheme code for `identifier` with the stock secret.
#[must_use]
pub fn generate_code(identifier: &str, duration_days: u32) -> String {
    checksum_code(identifier, DEFAULT_LICENSE_SECRET, duration_days)
}

/// Generate a checksum-scheme code with an explicit shared secret.
///
/// The hash is `acc = acc * 31 + unit` over the UTF-16 code units of
/// `normalized identifier + secret + days`, wrapping at 32 bits. Its absolute
/// value is zero-padded to eight digits and cut to the first eight.
#[must_use]
pub fn checksum_code(identifier: &str, secret: &str, duration_days: u32) -> String {
    let input = format!(
        "{}{}{}",
        normalize_identifier(identifier),
        secret,
        duration_days
    );

    let acc = input.encode_utf16().fold(0_i32, |acc, unit| {
        acc.wrapping_mul(31).wrapping_add(i32::from(unit))
    });

    // unsigned_abs keeps i32::MIN representable
    let mut code = format!("{:0>width$}", acc.unsigned_abs(), width = CODE_LEN);
    code.truncate(CODE_LEN);
    code
}

/// Generate a keyed-scheme code.
#[must_use]
pub fn keyed_code(identifier: &str, key: &[u8; 32], duration_days: u32) -> String {
    let input = format!("{}\n{}", normalize_identifier(identifier), duration_days);
    let hash = blake3::keyed_hash(key, input.as_bytes());

    let mut prefix = [0_u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    let value = u64::from_le_bytes(prefix) % CODE_MODULUS;
    format!("{value:0>width$}", width = CODE_LEN)
}

/// The scheme an installation issues and accepts codes under.
#[derive(Clone, PartialEq, Eq)]
pub enum CodeScheme {
    /// Legacy 32-bit checksum with a shared secret.
    Checksum {
        /// Shared secret appended to the identifier.
        secret: String,
    },
    /// BLAKE3 keyed hash.
    Keyed {
        /// 32-byte key.
        key: [u8; 32],
    },
}

impl std::fmt::Debug for CodeScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Checksum { .. } => f.write_str("CodeScheme::Checksum"),
            Self::Keyed { .. } => f.write_str("CodeScheme::Keyed"),
        }
    }
}

impl Default for CodeScheme {
    fn default() -> Self {
        Self::Checksum {
            secret: DEFAULT_LICENSE_SECRET.to_string(),
        }
    }
}

/// One generated code with its duration, as shown by the admin tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCode {
    /// Unlocked duration.
    pub duration: LicenseDuration,
    /// Human label for the duration.
    pub label: &'static str,
    /// The code itself.
    pub code: String,
}

impl CodeScheme {
    /// Build the scheme selected in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if the keyed scheme is selected
    /// without a valid 64-hex-character key.
    pub fn from_config(config: &LicenseConfig) -> Result<Self> {
        match config.scheme {
            SchemeKind::Checksum => Ok(Self::Checksum {
                secret: config.secret.clone(),
            }),
            SchemeKind::Keyed => {
                let hex = config
                    .keyed_secret
                    .as_deref()
                    .ok_or_else(|| Error::ConfigValidation {
                        message: "keyed scheme requires keyed_secret".to_string(),
                    })?;
                let key = blake3::Hash::from_hex(hex).map_err(|e| Error::ConfigValidation {
                    message: format!("keyed_secret is not a valid key: {e}"),
                })?;
                Ok(Self::Keyed { key: *key.as_bytes() })
            }
        }
    }

    /// The code unlocking `duration` for `identifier`.
    #[must_use]
    pub fn generate(&self, identifier: &str, duration: LicenseDuration) -> String {
        match self {
            Self::Checksum { secret } => checksum_code(identifier, secret, duration.days()),
            Self::Keyed { key } => keyed_code(identifier, key, duration.days()),
        }
    }

    /// The first duration, in [`LicenseDuration::ALL`] order, whose code
    /// equals `code` exactly.
    #[must_use]
    pub fn match_code(&self, identifier: &str, code: &str) -> Option<LicenseDuration> {
        LicenseDuration::ALL
            .into_iter()
            .find(|d| self.generate(identifier, *d) == code)
    }

    /// Generate the code for every duration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `identifier` is blank.
    pub fn issue_all(&self, identifier: &str) -> Result<Vec<IssuedCode>> {
        if identifier.trim().is_empty() {
            return Err(Error::validation("plate", "cannot be empty"));
        }
        Ok(LicenseDuration::ALL
            .into_iter()
            .map(|duration| IssuedCode {
                duration,
                label: duration.label(),
                code: self.generate(identifier, duration),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    fn keyed() -> CodeScheme {
        let config = LicenseConfig {
            scheme: SchemeKind::Keyed,
            keyed_secret: Some(KEY_HEX.to_string()),
            ..LicenseConfig::default()
        };
        CodeScheme::from_config(&config).unwrap()
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(generate_code("200 TU 5555", 30), "46528829");
        assert_eq!(generate_code("200 TU 5555", 90), "46528810");
        assert_eq!(generate_code("200 TU 5555", 180), "15390367");
        assert_eq!(generate_code("200 TU 5555", 365), "15390348");
        assert_eq!(generate_code("000 TU 0000", 30), "98825569");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            generate_code("123 TU 4567", 180),
            generate_code("123 TU 4567", 180)
        );
    }

    #[test]
    fn test_whitespace_insensitive() {
        assert_eq!(generate_code("123 TU 4567", 30), generate_code("123TU4567", 30));
        assert_eq!(generate_code("123 TU 4567", 30), "92421027");
        assert_eq!(
            generate_code(" 123\tTU\n4567 ", 30),
            generate_code("123TU4567", 30)
        );
    }

    #[test]
    fn test_whitespace_set_matches_issued_codes() {
        // NEL is kept, the byte order mark and ideographic space are stripped
        assert_eq!(normalize_identifier("200\u{85}TU"), "200\u{85}TU");
        assert_eq!(generate_code("200\u{85}TU 5555", 30), "19931819");
        assert_eq!(generate_code("200\u{FEFF}TU 5555", 30), "46528829");
        assert_eq!(generate_code("200\u{3000}TU\u{2028}5555", 30), "46528829");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(generate_code("abc", 90), generate_code("ABC", 90));
        assert_eq!(generate_code("200 tu 5555", 90), "46528810");
    }

    #[test]
    fn test_always_eight_digits() {
        for plate in ["", "a", "200 TU 5555", "999 TU 9999", "ÉÀÇ", "🚕 1 TU 1"] {
            for d in LicenseDuration::ALL {
                let code = generate_code(plate, d.days());
                assert_eq!(code.len(), CODE_LEN, "{plate} {d:?}");
                assert!(code.bytes().all(|b| b.is_ascii_digit()));
            }
        }
    }

    #[test]
    fn test_accumulator_at_i32_min() {
        // This plate drives the 30-day accumulator to exactly i32::MIN
        assert_eq!(generate_code("896 TU BRQNS", 30), "21474836");
    }

    #[test]
    fn test_empty_identifier_still_hashes_secret() {
        assert_eq!(generate_code("", 30), "16915345");
    }

    #[test]
    fn test_durations_usually_differ() {
        let codes: std::collections::HashSet<_> = LicenseDuration::ALL
            .into_iter()
            .map(|d| generate_code("200 TU 5555", d.days()))
            .collect();
        assert_eq!(codes.len(), 4);
    }

    #[test]
    fn test_secret_changes_code() {
        assert_ne!(
            checksum_code("200 TU 5555", "OTHER", 30),
            generate_code("200 TU 5555", 30)
        );
    }

    #[test]
    fn test_duration_days_and_labels() {
        let days: Vec<u32> = LicenseDuration::ALL.into_iter().map(LicenseDuration::days).collect();
        assert_eq!(days, vec![30, 90, 180, 365]);
        assert_eq!(LicenseDuration::TwelveMonths.label(), "12 Mois");
    }

    #[test]
    fn test_duration_serializes_as_days() {
        assert_eq!(
            serde_json::to_string(&LicenseDuration::ThreeMonths).unwrap(),
            "90"
        );
    }

    #[test]
    fn test_match_code_first_match() {
        let scheme = CodeScheme::default();
        assert_eq!(
            scheme.match_code("200 TU 5555", "46528810"),
            Some(LicenseDuration::ThreeMonths)
        );
        assert_eq!(scheme.match_code("200 TU 5555", "12345678"), None);
        assert_eq!(scheme.match_code("200 TU 5555", ""), None);
    }

    #[test]
    fn test_issue_all() {
        let issued = CodeScheme::default().issue_all("200 TU 5555").unwrap();
        assert_eq!(issued.len(), 4);
        assert_eq!(issued[1].label, "3 Mois");
        assert_eq!(issued[1].code, "46528810");
    }

    #[test]
    fn test_issue_all_rejects_blank() {
        let err = CodeScheme::default().issue_all("  ").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_keyed_scheme() {
        let scheme = keyed();
        let code = scheme.generate("200 TU 5555", LicenseDuration::OneMonth);

        assert_eq!(code.len(), CODE_LEN);
        assert_eq!(code, scheme.generate("200tu5555", LicenseDuration::OneMonth));
        assert_ne!(code, generate_code("200 TU 5555", 30));
        assert_eq!(
            scheme.match_code("200 TU 5555", &code),
            Some(LicenseDuration::OneMonth)
        );
    }

    #[test]
    fn test_keyed_requires_key() {
        let config = LicenseConfig {
            scheme: SchemeKind::Keyed,
            ..LicenseConfig::default()
        };
        assert!(CodeScheme::from_config(&config).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", keyed());
        assert!(!debug.contains("0001"));
        let debug = format!("{:?}", CodeScheme::default());
        assert!(!debug.contains("TUNISIE"));
    }
}
