//! Unicode normalization for pre-tokenization.
//!
//! Normalization is off by default: any form other than
//! [`NormalizationForm::None`] may change the bytes of the input, so
//! `decode(encode(text))` then returns the normalized text.

use std::borrow::Cow;
use unicode_normalization::{is_nfc_quick, is_nfd_quick, IsNormalized, UnicodeNormalization};

/// Normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    /// No normalization
    #[default]
    None,
    /// Canonical composition
    NFC,
    /// Canonical decomposition
    NFD,
    /// Compatibility composition
    NFKC,
    /// Compatibility decomposition
    NFKD,
}

impl std::str::FromStr for NormalizationForm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "nfc" => Ok(Self::NFC),
            "nfd" => Ok(Self::NFD),
            "nfkc" => Ok(Self::NFKC),
            "nfkd" => Ok(Self::NFKD),
            other => Err(format!("unknown normalization form: {}", other)),
        }
    }
}

/// Unicode normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    /// Normalization form to apply
    form: NormalizationForm,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(form: NormalizationForm) -> Self {
        Self { form }
    }

    /// Create an NFC normalizer.
    pub fn nfc() -> Self {
        Self::new(NormalizationForm::NFC)
    }

    /// Normalize text, borrowing it when nothing changes.
    pub fn normalize<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.form {
            NormalizationForm::None => Cow::Borrowed(text),
            NormalizationForm::NFC if is_nfc_quick(text.chars()) == IsNormalized::Yes => {
                Cow::Borrowed(text)
            }
            NormalizationForm::NFD if is_nfd_quick(text.chars()) == IsNormalized::Yes => {
                Cow::Borrowed(text)
            }
            NormalizationForm::NFC => Cow::Owned(text.nfc().collect()),
            NormalizationForm::NFD => Cow::Owned(text.nfd().collect()),
            NormalizationForm::NFKC => Cow::Owned(text.nfkc().collect()),
            NormalizationForm::NFKD => Cow::Owned(text.nfkd().collect()),
        }
    }

    /// Normalization form in use.
    pub fn form(&self) -> NormalizationForm {
        self.form
    }

    /// Check if normalization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.form != NormalizationForm::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfc_normalization() {
        let normalizer = Normalizer::nfc();
        // Combining characters
        let text = "e\u{0301}"; // e + combining acute accent
        let result = normalizer.normalize(text);
        assert_eq!(result, "\u{00e9}"); // é as single character
    }

    #[test]
    fn test_nfd_normalization() {
        let normalizer = Normalizer::new(NormalizationForm::NFD);
        let text = "\u{00e9}";
        let result = normalizer.normalize(text);
        assert_eq!(result, "e\u{0301}");
    }

    #[test]
    fn test_default_is_identity() {
        let normalizer = Normalizer::default();
        let text = "e\u{0301}";
        assert!(matches!(normalizer.normalize(text), Cow::Borrowed(t) if t == text));
        assert!(!normalizer.is_enabled());
    }

    #[test]
    fn test_already_normalized_is_borrowed() {
        let normalizer = Normalizer::nfc();
        assert!(matches!(normalizer.normalize("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_parse_form() {
        assert_eq!("NFKC".parse::<NormalizationForm>(), Ok(NormalizationForm::NFKC));
        assert_eq!("none".parse::<NormalizationForm>(), Ok(NormalizationForm::None));
        assert!("nfx".parse::<NormalizationForm>().is_err());
    }
}
