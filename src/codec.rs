use crate::errors::{AppError, AppResult};
use crate::models::{Meridian, RecordKey};

/// Parses a `YYYY-MM-DDTHH:MM` string (24-hour, as emitted by a
/// datetime-local form control) into a [`RecordKey`].
///
/// Only the shape is validated: every sub-field must be an integer, but no
/// calendar range check is applied (a February 31st is accepted).
pub fn parse_civil_datetime(input: &str) -> AppResult<RecordKey> {
    let (date, time) = split_exact2(input, 'T')?;

    let date_fields: Vec<&str> = date.split('-').collect();
    let [year, month, day] = date_fields[..] else {
        return Err(AppError::Format(format!(
            "expected YYYY-MM-DD date in '{}'",
            input
        )));
    };
    let (hour, minute) = split_exact2(time, ':')?;

    let year: i32 = parse_field(year, input)?;
    let month: u32 = parse_field(month, input)?;
    let day: u32 = parse_field(day, input)?;
    let hour24: u32 = parse_field(hour, input)?;
    let minute: u32 = parse_field(minute, input)?;

    let meridian = if hour24 >= 12 { Meridian::Pm } else { Meridian::Am };
    // 12-hour conversion: 0 -> 12am, 12 -> 12pm, otherwise modulo.
    let hour = match hour24 % 12 {
        0 => 12,
        reduced => reduced,
    };

    Ok(RecordKey {
        month,
        day,
        year,
        meridian,
        hour,
        minute,
    })
}

/// Renders the underscore-joined token form used as a routable identifier,
/// e.g. `3_14_2024_pm_2_30`. Reversed by [`decode_key`].
pub fn encode_key(key: &RecordKey) -> String {
    format!(
        "{}_{}_{}_{}_{}_{}",
        key.month,
        key.day,
        key.year,
        key.meridian.as_str(),
        key.hour,
        key.minute
    )
}

pub fn decode_key(input: &str) -> AppResult<RecordKey> {
    let tokens: Vec<&str> = input.split('_').collect();
    let [month, day, year, meridian, hour, minute] = tokens[..] else {
        return Err(AppError::Format(format!(
            "expected 6 underscore-separated tokens in '{}'",
            input
        )));
    };

    let meridian = match meridian {
        "am" => Meridian::Am,
        "pm" => Meridian::Pm,
        other => {
            return Err(AppError::Format(format!(
                "expected am/pm meridian token, got '{}'",
                other
            )))
        }
    };

    Ok(RecordKey {
        month: parse_field(month, input)?,
        day: parse_field(day, input)?,
        year: parse_field(year, input)?,
        meridian,
        hour: parse_field(hour, input)?,
        minute: parse_field(minute, input)?,
    })
}

/// Renders the key back into a 24-hour ISO-8601-like timestamp truncated to
/// minute precision. Hour 12 is special-cased: 12pm stays 12, 12am becomes 0.
pub fn render_timestamp(key: &RecordKey) -> String {
    let hour24 = match (key.meridian, key.hour) {
        (Meridian::Pm, 12) => 12,
        (Meridian::Pm, hour) => hour + 12,
        (Meridian::Am, 12) => 0,
        (Meridian::Am, hour) => hour,
    };
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}",
        key.year, key.month, key.day, hour24, key.minute
    )
}

fn split_exact2(input: &str, separator: char) -> AppResult<(&str, &str)> {
    let mut parts = input.split(separator);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(left), Some(right), None) => Ok((left, right)),
        _ => Err(AppError::Format(format!(
            "expected exactly one '{}' in '{}'",
            separator, input
        ))),
    }
}

fn parse_field<T: std::str::FromStr>(token: &str, input: &str) -> AppResult<T> {
    token
        .parse()
        .map_err(|_| AppError::Format(format!("non-numeric field '{}' in '{}'", token, input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(
        month: u32,
        day: u32,
        year: i32,
        meridian: Meridian,
        hour: u32,
        minute: u32,
    ) -> RecordKey {
        RecordKey {
            month,
            day,
            year,
            meridian,
            hour,
            minute,
        }
    }

    #[test]
    fn parses_afternoon_input() {
        let parsed = parse_civil_datetime("2024-03-14T14:30").expect("valid input");
        assert_eq!(parsed, key(3, 14, 2024, Meridian::Pm, 2, 30));
    }

    #[test]
    fn parses_midnight_as_twelve_am() {
        let parsed = parse_civil_datetime("2024-03-14T00:15").expect("valid input");
        assert_eq!(parsed, key(3, 14, 2024, Meridian::Am, 12, 15));
    }

    #[test]
    fn parses_noon_as_twelve_pm() {
        let parsed = parse_civil_datetime("2024-03-14T12:05").expect("valid input");
        assert_eq!(parsed, key(3, 14, 2024, Meridian::Pm, 12, 5));
    }

    #[test]
    fn accepts_impossible_calendar_dates() {
        let parsed = parse_civil_datetime("2024-02-31T08:00").expect("shape is valid");
        assert_eq!(parsed.day, 31);
    }

    #[test]
    fn rejects_malformed_datetime_shapes() {
        for input in [
            "2024-03-14 14:30",
            "2024-03-14T14:30:00",
            "2024-03T14:30",
            "2024-03-14T14",
            "2024-03-xxT14:30",
            "",
        ] {
            let error = parse_civil_datetime(input).expect_err("must reject");
            assert!(matches!(error, AppError::Format(_)), "input: {input}");
        }
    }

    #[test]
    fn encodes_key_as_underscore_tokens() {
        let encoded = encode_key(&key(3, 14, 2024, Meridian::Pm, 2, 30));
        assert_eq!(encoded, "3_14_2024_pm_2_30");
    }

    #[test]
    fn decodes_encoded_key() {
        let decoded = decode_key("3_14_2024_pm_2_30").expect("valid key");
        assert_eq!(decoded, key(3, 14, 2024, Meridian::Pm, 2, 30));
    }

    #[test]
    fn rejects_malformed_keys() {
        for input in [
            "3_14_2024_pm_2",
            "3_14_2024_pm_2_30_0",
            "3_14_2024_noon_2_30",
            "3_14_2024_2_pm_30",
            "x_14_2024_pm_2_30",
        ] {
            let error = decode_key(input).expect_err("must reject");
            assert!(matches!(error, AppError::Format(_)), "input: {input}");
        }
    }

    #[test]
    fn encode_decode_round_trips() {
        for key in [
            key(3, 14, 2024, Meridian::Pm, 2, 30),
            key(12, 31, 1999, Meridian::Am, 12, 0),
            key(1, 1, 2025, Meridian::Pm, 12, 59),
        ] {
            let decoded = decode_key(&encode_key(&key)).expect("round trip");
            assert_eq!(decoded, key);
        }
    }

    #[test]
    fn renders_display_timestamp() {
        let rendered = render_timestamp(&key(3, 14, 2024, Meridian::Pm, 2, 30));
        assert_eq!(rendered, "2024-03-14T14:30");
    }

    #[test]
    fn renders_noon_and_midnight() {
        assert_eq!(
            render_timestamp(&key(3, 14, 2024, Meridian::Pm, 12, 0)),
            "2024-03-14T12:00"
        );
        assert_eq!(
            render_timestamp(&key(3, 14, 2024, Meridian::Am, 12, 15)),
            "2024-03-14T00:15"
        );
    }

    #[test]
    fn parse_then_render_is_identity_for_every_hour() {
        for hour in 0..24 {
            let input = format!("2024-03-14T{:02}:45", hour);
            let parsed = parse_civil_datetime(&input).expect("valid input");
            assert_eq!(render_timestamp(&parsed), input);
        }
    }
}
