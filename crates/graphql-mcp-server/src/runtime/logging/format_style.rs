use serde::Deserialize;

/// Log line layout, one per tracing-subscriber formatter
#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormatStyle {
    /// Single-line, human-readable
    #[default]
    Full,
    /// Single-line, shortened
    Compact,
    /// Newline-delimited JSON
    Json,
    /// Multi-line with source locations
    Pretty,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;
    use serde::de::value::{Error, StrDeserializer};

    use super::FormatStyle;

    #[test]
    fn defaults_to_full() {
        assert_eq!(FormatStyle::default(), FormatStyle::Full);
    }

    #[rstest]
    #[case("full", FormatStyle::Full)]
    #[case("compact", FormatStyle::Compact)]
    #[case("json", FormatStyle::Json)]
    #[case("pretty", FormatStyle::Pretty)]
    fn deserializes_snake_case_names(#[case] value: &str, #[case] expected: FormatStyle) {
        let direct = FormatStyle::deserialize(StrDeserializer::<Error>::new(value)).unwrap();
        let yaml: FormatStyle = serde_yaml::from_str(value).unwrap();

        assert_eq!(direct, expected);
        assert_eq!(yaml, expected);
    }

    #[rstest]
    #[case("Full")]
    #[case("JSON")]
    #[case("verbose")]
    fn rejects_other_names(#[case] value: &str) {
        let err = FormatStyle::deserialize(StrDeserializer::<Error>::new(value)).unwrap_err();

        assert!(err.to_string().contains("unknown variant"));
    }
}
