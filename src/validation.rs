//! Field checks applied by callers before building a request.
//!
//! The frame encoder inserts values verbatim, so a value containing one of the
//! framing characters would corrupt the frame on the wire. These checks let a
//! front end reject such input with a specific message.

/// Characters with meaning inside a frame.
pub const RESERVED_CHARS: [char; 5] = ['<', '>', '|', ':', ','];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} contains reserved framing characters: {chars}")]
    ReservedCharacters { field: String, chars: String },

    #[error("{field} contains control characters")]
    ControlCharacters { field: String },
}

/// Accepts empty values (they encode as `0` where a default applies).
pub fn validate_field(field: &str, value: &str) -> Result<(), FieldError> {
    let mut found: Vec<char> = value.chars().filter(|c| RESERVED_CHARS.contains(c)).collect();
    if !found.is_empty() {
        found.sort_unstable();
        found.dedup();
        return Err(FieldError::ReservedCharacters {
            field: field.to_string(),
            chars: found.into_iter().map(|c| format!("'{}'", c)).collect::<Vec<_>>().join(" "),
        });
    }
    if value.chars().any(char::is_control) {
        return Err(FieldError::ControlCharacters {
            field: field.to_string(),
        });
    }
    Ok(())
}
