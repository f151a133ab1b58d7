//! Scalar conversions used by the soft types.
//!
//! All conversions are total: a value that has no sensible numeric, boolean,
//! textual or date reading converts to the zero value of the target.

use super::{DateValue, Number, Value};

const MILLIS_PER_DAY: i64 = 86_400_000;

impl Value {
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(n) => *n,
            #[expect(clippy::cast_possible_truncation, reason = "saturating float to int")]
            Value::Float(f) => *f as i64,
            #[expect(clippy::cast_possible_truncation, reason = "saturating float to int")]
            Value::Number(n) => n.to_f64() as i64,
            Value::Bool(b) => i64::from(*b),
            Value::String(s) => parse_int_prefix(s),
            Value::Date(d) => d.seconds(),
            _ => 0,
        }
    }

    pub fn as_float(&self) -> f64 {
        match self {
            #[expect(clippy::cast_precision_loss, reason = "int to float widening")]
            Value::Int(n) => *n as f64,
            Value::Float(f) => *f,
            Value::Number(n) => n.to_f64(),
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::String(s) => parse_float_prefix(s),
            #[expect(clippy::cast_precision_loss, reason = "date seconds as float")]
            Value::Date(d) => d.millis as f64 / 1000.0,
            _ => 0.0,
        }
    }

    pub fn as_number(&self) -> Number {
        Number::new(self.as_float())
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Number(n) => n.to_f64() != 0.0,
            Value::String(s) => parse_float_prefix(s) != 0.0,
            Value::Date(d) => d.millis != 0,
            _ => false,
        }
    }

    /// String form of a scalar. Non-scalars yield an empty string.
    pub fn to_text(&self) -> String {
        match self {
            Value::String(s) => (**s).clone(),
            Value::Int(n) => n.to_string(),
            Value::Bool(b) => (if *b { "1" } else { "0" }).to_owned(),
            Value::Float(f) => format_float(*f),
            Value::Number(n) => format_float(n.to_f64()),
            Value::Date(d) => format_date(*d),
            _ => String::new(),
        }
    }

    pub fn as_date(&self) -> DateValue {
        match self {
            Value::Date(d) => *d,
            Value::String(s) => parse_date(s).unwrap_or(DateValue::EPOCH),
            Value::Number(n) => parse_date(&format_float(n.to_f64())).unwrap_or(DateValue::EPOCH),
            Value::Int(_) | Value::Float(_) | Value::Bool(_) => {
                DateValue::absolute_seconds(self.as_int())
            }
            _ => DateValue::EPOCH,
        }
    }

    /// Milliseconds for a timeout slot: relative dates give their duration,
    /// absolute dates their offset from the epoch, integers pass through.
    pub fn as_timeout_millis(&self) -> i64 {
        match self {
            Value::Date(d) => d.millis,
            other => other.as_int(),
        }
    }
}

fn numeric_prefix(s: &str, allow_fraction: bool) -> &str {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let mut seen_dot = false;
    let mut seen_exp = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {}
            b'.' if allow_fraction && !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if allow_fraction && !seen_exp && end > 0 => {
                seen_exp = true;
                if matches!(bytes.get(end + 1), Some(b'+' | b'-')) {
                    end += 1;
                }
            }
            _ => break,
        }
        end += 1;
    }
    &s[..end]
}

fn parse_int_prefix(s: &str) -> i64 {
    numeric_prefix(s, false).parse().unwrap_or(0)
}

fn parse_float_prefix(s: &str) -> f64 {
    let mut prefix = numeric_prefix(s, true);
    while !prefix.is_empty() {
        if let Ok(f) = prefix.parse() {
            return f;
        }
        prefix = &prefix[..prefix.len() - 1];
    }
    0.0
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

fn format_date(d: DateValue) -> String {
    if d.relative {
        let secs = d.millis / 1000;
        let ms = (d.millis % 1000).abs();
        return if ms == 0 {
            format!("PT{secs}S")
        } else {
            format!("PT{secs}.{ms:03}S")
        };
    }
    let days = d.millis.div_euclid(MILLIS_PER_DAY);
    let rem = d.millis.rem_euclid(MILLIS_PER_DAY);
    let (y, m, day) = civil_from_days(days);
    let secs = rem / 1000;
    format!(
        "{y:04}-{m:02}-{day:02} {:02}:{:02}:{:02}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    )
}

/// Parses `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (or with `T`), and `YYYYMMDD`.
fn parse_date(s: &str) -> Option<DateValue> {
    let s = s.trim();
    let (date, time) = match s.find([' ', 'T']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };

    let (y, m, d) = if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
        (
            date[..4].parse().ok()?,
            date[4..6].parse().ok()?,
            date[6..].parse().ok()?,
        )
    } else {
        let mut parts = date.splitn(3, '-');
        (
            parts.next()?.parse().ok()?,
            parts.next()?.parse().ok()?,
            parts.next()?.parse().ok()?,
        )
    };
    if !(1..=12).contains(&m) || !(1..=31).contains(&d) {
        return None;
    }

    let mut secs = 0i64;
    if let Some(time) = time {
        let mut parts = time.splitn(3, ':');
        let h: i64 = parts.next()?.parse().ok()?;
        let min: i64 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        let sec: i64 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        secs = h * 3600 + min * 60 + sec;
    }

    let days = days_from_civil(y, m, d);
    Some(DateValue {
        millis: days * MILLIS_PER_DAY + secs * 1000,
        relative: false,
    })
}

// Proleptic Gregorian day arithmetic relative to 1970-01-01.
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (m + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m, d)
}
