use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGHT: usize = 256;
const FORBIDDEN_CHARS: [char; 9] = ['/', '{', '}', '"', '>', '<', '\\', '(', ')'];

/// Optional first name sent to the mailing list as the FNAME merge field.
/// Unlike a required name, an empty value is fine and maps to an empty merge
/// field on the provider side.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FirstName(String);

impl FirstName {
    pub fn parse(name: String) -> Result<FirstName, String> {
        let is_too_long = name.graphemes(true).count() > MAX_CHAR_LENGHT;
        let contains_forbidden_chars = name.chars().any(|char| FORBIDDEN_CHARS.contains(&char));

        if is_too_long || contains_forbidden_chars {
            return Err(format!("{} is not a valid first name", name));
        }

        Ok(Self(name.trim().to_string()))
    }

    pub fn empty() -> FirstName {
        Self(String::new())
    }
}

impl AsRef<str> for FirstName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
