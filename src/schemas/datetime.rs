use serde::de::Error as _;
use serde::Deserialize;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};

pub(crate) use crate::core::time::format_primitive;

pub(crate) fn format_optional(value: Option<PrimitiveDateTime>) -> Option<String> {
    value.map(format_primitive)
}

/// RFC3339, or a zone-less `YYYY-MM-DDTHH:MM[:SS]` taken as UTC.
pub(crate) fn parse_flexible(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    if let Ok(value) =
        PrimitiveDateTime::parse(raw, &format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    {
        return Some(value.assume_utc());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }

    None
}

pub(crate) fn deserialize_flexible<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible(&raw).ok_or_else(|| D::Error::custom(format!("invalid datetime: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::parse_flexible;

    #[test]
    fn accepts_rfc3339_and_local_forms() {
        let with_zone = parse_flexible("2026-03-01T09:00:00+03:00").expect("rfc3339");
        let local = parse_flexible("2026-03-01T06:00").expect("local minutes");
        let local_seconds = parse_flexible("2026-03-01T06:00:00").expect("local seconds");

        assert_eq!(with_zone, local);
        assert_eq!(local, local_seconds);
        assert!(parse_flexible("next tuesday").is_none());
    }
}
