//! Local input checks, run before anything is written to the backend.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ValidationError;
use crate::pairing::PairingCode;
use crate::types::{EventDraft, MomentDraft};

/// Validate the event editor's fields. A missing colour becomes the default
/// preset.
pub fn validate_event(
    title: &str,
    date: Option<DateTime<Utc>>,
    is_recurring: bool,
    color: Option<&str>,
) -> Result<EventDraft, ValidationError> {
    let title = non_empty_title(title)?;
    let date = date.ok_or(ValidationError::MissingDate)?;
    let color = match color {
        Some(c) => validate_color(c)?,
        None => EventDraft::default_color(),
    };

    Ok(EventDraft {
        title,
        date,
        is_recurring,
        color,
    })
}

/// Validate the moment editor's fields. The image is attached after upload.
pub fn validate_moment(
    title: &str,
    date: Option<NaiveDate>,
    description: &str,
) -> Result<MomentDraft, ValidationError> {
    let title = non_empty_title(title)?;
    let date = date.ok_or(ValidationError::MissingDate)?;

    Ok(MomentDraft {
        date,
        title,
        description: description.trim().to_string(),
        image_url: None,
    })
}

/// Trimmed chat text, or `None` when there is nothing to send.
pub fn message_text(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Parse the partner code typed by `own`'s holder.
pub fn pairing_input(input: &str, own: &PairingCode) -> Result<PairingCode, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::EmptyPairingCode);
    }
    let code = PairingCode::parse(input)?;
    if &code == own {
        return Err(ValidationError::SelfPairing);
    }
    Ok(code)
}

pub fn display_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyDisplayName);
    }
    Ok(name.to_string())
}

/// Every field of a sign-in or sign-up form must be filled in.
pub fn require_fields(fields: &[&str]) -> Result<(), ValidationError> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(ValidationError::IncompleteForm);
    }
    Ok(())
}

/// Accept `#RRGGBB` colours.
pub fn validate_color(color: &str) -> Result<String, ValidationError> {
    let color = color.trim();
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(color.to_string())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

fn non_empty_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRESET_COLORS;
    use chrono::TimeZone;

    #[test]
    fn event_requires_title_and_date() {
        let date = Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap();
        assert_eq!(
            validate_event("   ", Some(date), false, None),
            Err(ValidationError::EmptyTitle)
        );
        assert_eq!(
            validate_event("Anniversary", None, true, None),
            Err(ValidationError::MissingDate)
        );
    }

    #[test]
    fn event_defaults_color() {
        let date = Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap();
        let draft = validate_event(" Anniversary ", Some(date), true, None).unwrap();
        assert_eq!(draft.title, "Anniversary");
        assert_eq!(draft.color, PRESET_COLORS[0]);
        assert!(draft.is_recurring);
    }

    #[test]
    fn color_format() {
        assert_eq!(validate_color("#a1B2c3").unwrap(), "#a1B2c3");
        assert!(validate_color("a1b2c3").is_err());
        assert!(validate_color("#12345").is_err());
        assert!(validate_color("#12345G").is_err());
    }

    #[test]
    fn moment_requires_date() {
        assert_eq!(
            validate_moment("Picnic", None, ""),
            Err(ValidationError::MissingDate)
        );
        let day = NaiveDate::from_ymd_opt(2025, 6, 28).unwrap();
        let draft = validate_moment("Picnic", Some(day), " at the park ").unwrap();
        assert_eq!(draft.description, "at the park");
        assert!(draft.image_url.is_none());
    }

    #[test]
    fn blank_messages_are_dropped() {
        assert_eq!(message_text("  \n"), None);
        assert_eq!(message_text(" hi "), Some("hi".to_string()));
    }

    #[test]
    fn forms_need_every_field() {
        assert_eq!(
            require_fields(&["a@example.com", " "]),
            Err(ValidationError::IncompleteForm)
        );
        assert!(require_fields(&["a@example.com", "secret1"]).is_ok());
    }

    #[test]
    fn pairing_input_rules() {
        let own = PairingCode::parse("Own123").unwrap();
        assert_eq!(pairing_input("", &own), Err(ValidationError::EmptyPairingCode));
        assert_eq!(pairing_input(" Own123 ", &own), Err(ValidationError::SelfPairing));
        assert!(matches!(
            pairing_input("toolong1", &own),
            Err(ValidationError::PairingCode(_))
        ));
        assert_eq!(pairing_input("Par456", &own).unwrap().as_str(), "Par456");
    }
}
