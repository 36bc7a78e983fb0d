//! Ticket codes issued to confirmed registrations.
//!
//! The wire format is:
//!
//! ```text
//! TKT-{time}-{random}-{check}
//! ```
//!
//! * `time`: unix milliseconds, Crockford base32, zero-padded to 9 chars
//! * `random`: 5 bytes of CSPRNG output, Crockford base32 (8 chars)
//! * `check`: first 3 bytes of `SHA-256("{time}-{random}")`, uppercase hex
//!
//! Generation never consults the store. Uniqueness is enforced by the
//! store's unique constraint on the ticket column; callers regenerate on a
//! conflict.

use rand::RngCore;

/// Fixed prefix of every ticket code.
pub const TICKET_PREFIX: &str = "TKT";

const TIME_LEN: usize = 9;
const RANDOM_BYTES: usize = 5;
const RANDOM_LEN: usize = 8;
const CHECK_BYTES: usize = 3;
const CHECK_LEN: usize = CHECK_BYTES * 2;

/// Total length of a ticket code, separators included.
pub const TICKET_LEN: usize = TICKET_PREFIX.len() + 1 + TIME_LEN + 1 + RANDOM_LEN + 1 + CHECK_LEN;

const CROCKFORD_ALPHABET: &str = "0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Errors produced when parsing a ticket code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    #[error("ticket code has the wrong shape")]
    Malformed,
    #[error("ticket code checksum mismatch")]
    ChecksumMismatch,
}

/// A normalized (uppercase) ticket code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketCode(String);

impl TicketCode {
    /// Generate a fresh ticket code from the current time and OS randomness.
    pub fn generate() -> Self {
        let now = time::OffsetDateTime::now_utc();
        let millis = u64::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or_default();
        let mut random = [0u8; RANDOM_BYTES];
        rand::rng().fill_bytes(&mut random);
        Self::from_parts(millis, random)
    }

    /// Assemble a ticket code from an explicit timestamp and random bytes.
    pub fn from_parts(unix_millis: u64, random: [u8; RANDOM_BYTES]) -> Self {
        let time_part = format!(
            "{:0>width$}",
            fast32::base32::CROCKFORD.encode_u64(unix_millis),
            width = TIME_LEN
        );
        let random_part = fast32::base32::CROCKFORD.encode(&random);
        let check = checksum(&time_part, &random_part);
        Self(format!("{TICKET_PREFIX}-{time_part}-{random_part}-{check}"))
    }

    /// Parse and verify a ticket code. Input is trimmed and upper-cased first.
    pub fn parse(input: &str) -> Result<Self, TicketError> {
        let normalized = normalize(input);
        let mut parts = normalized.split('-');
        let (Some(prefix), Some(time_part), Some(random_part), Some(check), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(TicketError::Malformed);
        };

        if prefix != TICKET_PREFIX
            || time_part.len() != TIME_LEN
            || random_part.len() != RANDOM_LEN
            || check.len() != CHECK_LEN
            || !is_crockford(time_part)
            || !is_crockford(random_part)
            || !check.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(TicketError::Malformed);
        }

        if checksum(time_part, random_part) != check {
            return Err(TicketError::ChecksumMismatch);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TicketCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TicketCode {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<TicketCode> for String {
    fn from(value: TicketCode) -> Self {
        value.0
    }
}

/// Normalize user-supplied ticket input for lookups (trim + uppercase).
pub fn normalize(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

fn checksum(time_part: &str, random_part: &str) -> String {
    let data = format!("{time_part}-{random_part}");
    let digest = ring::digest::digest(&ring::digest::SHA256, data.as_bytes());
    digest.as_ref()[..CHECK_BYTES]
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect()
}

fn is_crockford(s: &str) -> bool {
    s.chars().all(|c| CROCKFORD_ALPHABET.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_codes_have_fixed_shape() {
        let code = TicketCode::generate();
        let s = code.as_str();
        assert_eq!(s.len(), TICKET_LEN);
        let segments: Vec<&str> = s.split('-').collect();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], TICKET_PREFIX);
        assert_eq!(segments[1].len(), TIME_LEN);
        assert_eq!(segments[2].len(), RANDOM_LEN);
        assert_eq!(segments[3].len(), CHECK_LEN);
        assert_eq!(s, s.to_ascii_uppercase());
    }

    #[test]
    fn ten_thousand_codes_do_not_collide() {
        let codes: HashSet<String> = (0..10_000)
            .map(|_| TicketCode::generate().into_string())
            .collect();
        assert_eq!(codes.len(), 10_000);
    }

    #[test]
    fn time_segment_is_zero_padded() {
        let code = TicketCode::from_parts(31, [0, 0, 0, 0, 1]);
        assert!(code.as_str().starts_with("TKT-00000000Z-"));
        assert_eq!(code.as_str().len(), TICKET_LEN);
    }

    #[test]
    fn parse_accepts_lowercase_and_whitespace() {
        let code = TicketCode::from_parts(1_760_000_000_000, [1, 2, 3, 4, 5]);
        let messy = format!("  {}  ", code.as_str().to_ascii_lowercase());
        assert_eq!(TicketCode::parse(&messy).unwrap(), code);
    }

    #[test]
    fn parse_rejects_tampered_codes() {
        let code = TicketCode::from_parts(1_760_000_000_000, [9, 8, 7, 6, 5]);
        let mut tampered = code.into_string();
        let last = tampered.pop().unwrap();
        tampered.push(if last == '0' { '1' } else { '0' });
        assert_eq!(
            TicketCode::parse(&tampered),
            Err(TicketError::ChecksumMismatch)
        );
        assert_eq!(TicketCode::parse("TKT-123"), Err(TicketError::Malformed));
        assert_eq!(
            TicketCode::parse("ABC-000000001-00000000-000000"),
            Err(TicketError::Malformed)
        );
    }
}
