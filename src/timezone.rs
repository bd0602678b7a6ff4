//! Resolves the configured timezone so that "today" means the user's today.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the current UTC offset of the IANA timezone named `canonical_timezone`,
/// e.g. "Pacific/Auckland".
///
/// # Errors
/// Returns an [Error::InvalidTimezone] if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Result<UtcOffset, Error> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))
}

/// The current date at `offset`.
pub fn today(offset: UtcOffset) -> Date {
    OffsetDateTime::now_utc().to_offset(offset).date()
}

#[cfg(test)]
mod tests {
    use time::UtcOffset;

    use crate::Error;

    use super::get_local_offset;

    #[test]
    fn utc_has_zero_offset() {
        assert_eq!(get_local_offset("Etc/UTC"), Ok(UtcOffset::UTC));
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        assert_eq!(
            get_local_offset("Mars/Olympus_Mons"),
            Err(Error::InvalidTimezone("Mars/Olympus_Mons".to_owned()))
        );
    }
}
