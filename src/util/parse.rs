//! Lenient numeric coercions matching the browser's `parseInt` / `parseFloat`.
//!
//! Both read the longest numeric prefix after leading whitespace and ignore whatever follows,
//! so `"42px"` is `42` and `"px42"` is not a number.

/// Parses a leading integer, honouring an optional sign and a `0x` hexadecimal prefix.
///
/// Values beyond the `i64` range saturate at its bounds.
pub fn parse_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = split_sign(trimmed);

    let (radix, body) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let end = body
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map_or(body.len(), |(idx, _)| idx);
    if end == 0 {
        return None;
    }

    let magnitude = body[..end]
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(i64::from(radix))
                .saturating_add(i64::from(digit))
        });
    Some(if negative {
        magnitude.saturating_neg()
    } else {
        magnitude
    })
}

/// Parses a leading decimal number, including exponents and `Infinity`.
pub fn parse_float(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let (negative, rest) = split_sign(trimmed);

    if rest.starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let bytes = rest.as_bytes();
    let mut end = count_digits(bytes, 0);
    let mut mantissa_digits = end;
    if bytes.get(end) == Some(&b'.') {
        let fraction = count_digits(bytes, end + 1);
        if fraction > 0 || mantissa_digits > 0 {
            mantissa_digits += fraction;
            end += 1 + fraction;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut cursor = end + 1;
        if matches!(bytes.get(cursor), Some(b'+') | Some(b'-')) {
            cursor += 1;
        }
        let exponent = count_digits(bytes, cursor);
        if exponent > 0 {
            end = cursor + exponent;
        }
    }

    let magnitude: f64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn split_sign(input: &str) -> (bool, &str) {
    if let Some(rest) = input.strip_prefix('-') {
        (true, rest)
    } else {
        (false, input.strip_prefix('+').unwrap_or(input))
    }
}

fn count_digits(bytes: &[u8], start: usize) -> usize {
    bytes
        .iter()
        .skip(start)
        .take_while(|b| b.is_ascii_digit())
        .count()
}
