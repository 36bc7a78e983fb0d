//! Field validation and normalization for new registrations.

use super::error::ValidationError;
use crate::entities::registration::RegistrationInsert;
use crate::entities::{Gender, LocationPreference};
use lazy_static::lazy_static;
use regex::Regex;
use seatline_sdk::objects::RegisterRequest;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 15;
pub const EMAIL_MAX: usize = 254;
pub const NOTES_MAX: usize = 200;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

lazy_static! {
    static ref EMAIL_RE: Option<Regex> = Regex::new(EMAIL_PATTERN).ok();
}

/// Registration fields as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationFields {
    pub name: String,
    pub gender: String,
    pub profession: String,
    pub phone_number: String,
    pub email: String,
    pub location_preference: String,
    pub needs_directions: bool,
    pub notes: Option<String>,
}

impl From<RegisterRequest> for RegistrationFields {
    fn from(request: RegisterRequest) -> Self {
        Self {
            name: request.name,
            gender: request.gender,
            profession: request.profession,
            phone_number: request.phone_number,
            email: request.email,
            location_preference: request.location_preference,
            needs_directions: request.needs_directions,
            notes: request.notes,
        }
    }
}

/// Fields after validation, ready for insertion once a ticket is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub event_id: String,
    pub name: String,
    pub gender: Gender,
    pub profession: String,
    pub phone_number: String,
    pub email: String,
    pub location_preference: LocationPreference,
    pub needs_directions: bool,
    pub notes: Option<String>,
}

impl ValidRegistration {
    pub fn to_insert(&self, ticket_number: String) -> RegistrationInsert {
        RegistrationInsert {
            event_id: self.event_id.clone(),
            name: self.name.clone(),
            gender: self.gender,
            profession: self.profession.clone(),
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
            location_preference: self.location_preference,
            needs_directions: self.needs_directions,
            notes: self.notes.clone(),
            ticket_number,
        }
    }
}

/// Trim and lower-case an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(ValidationError::new("email", "is required"));
    }
    if email.chars().count() > EMAIL_MAX {
        return Err(ValidationError::new(
            "email",
            format!("must be at most {EMAIL_MAX} characters"),
        ));
    }
    if !EMAIL_RE.as_ref().is_some_and(|re| re.is_match(&email)) {
        return Err(ValidationError::new("email", "is not a valid email address"));
    }
    Ok(email)
}

fn bounded_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    let len = value.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(ValidationError::new(
            field,
            format!("must be between {NAME_MIN} and {NAME_MAX} characters"),
        ));
    }
    Ok(value.to_string())
}

fn phone_digits(phone: &str) -> Result<String, ValidationError> {
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '+' | '(' | ')'))
        .collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("phone_number", "must contain digits only"));
    }
    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len()) {
        return Err(ValidationError::new(
            "phone_number",
            format!("must be between {PHONE_MIN_DIGITS} and {PHONE_MAX_DIGITS} digits"),
        ));
    }
    Ok(digits)
}

fn notes(notes: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if notes.chars().count() > NOTES_MAX {
        return Err(ValidationError::new(
            "notes",
            format!("must be at most {NOTES_MAX} characters"),
        ));
    }
    Ok(Some(notes.to_string()))
}

/// Validate and normalize submitted fields. Stops at the first bad field.
pub fn validate(event_id: &str, fields: &RegistrationFields) -> Result<ValidRegistration, ValidationError> {
    let event_id = event_id.trim();
    if event_id.is_empty() {
        return Err(ValidationError::new("event_id", "is required"));
    }
    let name = bounded_text("name", &fields.name)?;
    let gender: seatline_sdk::objects::Gender = fields.gender.parse().map_err(|_| {
        ValidationError::new(
            "gender",
            "must be one of female, male, non-binary, prefer-not-to-say",
        )
    })?;
    let profession = bounded_text("profession", &fields.profession)?;
    let phone_number = phone_digits(&fields.phone_number)?;
    let email = validate_email(&fields.email)?;
    let location: seatline_sdk::objects::LocationPreference =
        fields.location_preference.parse().map_err(|_| {
            ValidationError::new("location_preference", "must be one of lagos, ibadan")
        })?;
    let notes = notes(fields.notes.as_deref())?;

    Ok(ValidRegistration {
        event_id: event_id.to_string(),
        name,
        gender: gender.into(),
        profession,
        phone_number,
        email,
        location_preference: location.into(),
        needs_directions: fields.needs_directions,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> RegistrationFields {
        RegistrationFields {
            name: "  Ada Obi ".to_string(),
            gender: "Female".to_string(),
            profession: "Engineer".to_string(),
            phone_number: "+234 (801) 234-5678".to_string(),
            email: "  Ada@Example.COM ".to_string(),
            location_preference: "lagos".to_string(),
            needs_directions: true,
            notes: Some("   ".to_string()),
        }
    }

    #[test]
    fn email_pattern_compiles() {
        assert!(EMAIL_RE.is_some());
    }

    #[test]
    fn valid_fields_are_normalized() {
        let valid = validate(" launch ", &fields()).unwrap();
        assert_eq!(valid.event_id, "launch");
        assert_eq!(valid.name, "Ada Obi");
        assert_eq!(valid.gender, Gender::Female);
        assert_eq!(valid.phone_number, "2348012345678");
        assert_eq!(valid.email, "ada@example.com");
        assert_eq!(valid.location_preference, LocationPreference::Lagos);
        assert_eq!(valid.notes, None);
    }

    #[test]
    fn each_rule_names_its_field() {
        let cases: Vec<(&str, RegistrationFields)> = vec![
            ("name", RegistrationFields { name: "A".into(), ..fields() }),
            ("name", RegistrationFields { name: "x".repeat(101), ..fields() }),
            ("gender", RegistrationFields { gender: "other".into(), ..fields() }),
            ("profession", RegistrationFields { profession: " ".into(), ..fields() }),
            ("phone_number", RegistrationFields { phone_number: "0801234567x".into(), ..fields() }),
            ("phone_number", RegistrationFields { phone_number: "123456789".into(), ..fields() }),
            ("phone_number", RegistrationFields { phone_number: "1234567890123456".into(), ..fields() }),
            ("email", RegistrationFields { email: "not-an-email".into(), ..fields() }),
            ("email", RegistrationFields { email: "a b@x.com".into(), ..fields() }),
            ("email", RegistrationFields { email: format!("{}@x.com", "a".repeat(250)), ..fields() }),
            ("location_preference", RegistrationFields { location_preference: "abuja".into(), ..fields() }),
            ("notes", RegistrationFields { notes: Some("n".repeat(201)), ..fields() }),
        ];
        for (field, case) in cases {
            let err = validate("launch", &case).unwrap_err();
            assert_eq!(err.field, field, "{case:?}");
        }
        assert_eq!(validate("  ", &fields()).unwrap_err().field, "event_id");
    }

    #[test]
    fn boundary_lengths_are_accepted() {
        let valid = validate(
            "launch",
            &RegistrationFields {
                name: "Al".into(),
                phone_number: "1234567890".into(),
                notes: Some("n".repeat(200)),
                ..fields()
            },
        )
        .unwrap();
        assert_eq!(valid.name, "Al");
        assert_eq!(valid.notes.map(|n| n.len()), Some(200));
    }
}
