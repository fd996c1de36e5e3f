//! Closed sets of labels that are stored as text.

/// Declare a fieldless enum whose variants map to fixed text labels.
///
/// The label is used for storage, JSON and display; parsing is
/// case-insensitive and ignores surrounding whitespace.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stored text label.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::Error;

            fn from_str(s: &str) -> crate::error::Result<Self> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        crate::error::Error::validation(
                            stringify!($name),
                            format!("unknown value '{wanted}'"),
                        )
                    })
            }
        }

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    text_enum! {
        /// A test enum.
        pub enum Colour {
            /// Red.
            Red => "Rouge",
            /// Light blue.
            LightBlue => "Bleu Clair",
        }
    }

    #[test]
    fn test_as_str_and_display() {
        assert_eq!(Colour::Red.as_str(), "Rouge");
        assert_eq!(Colour::LightBlue.to_string(), "Bleu Clair");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("rouge".parse::<Colour>().unwrap(), Colour::Red);
        assert_eq!("  BLEU CLAIR ".parse::<Colour>().unwrap(), Colour::LightBlue);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "vert".parse::<Colour>().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("vert"));
    }

    #[test]
    fn test_serde_uses_label() {
        assert_eq!(serde_json::to_string(&Colour::LightBlue).unwrap(), "\"Bleu Clair\"");
        let parsed: Colour = serde_json::from_str("\"Rouge\"").unwrap();
        assert_eq!(parsed, Colour::Red);
    }

    #[test]
    fn test_all_in_order() {
        assert_eq!(Colour::ALL, &[Colour::Red, Colour::LightBlue]);
    }
}
