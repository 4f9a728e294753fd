//! scanf-style field parsing for the text encoding.
//!
//! Text-mode GBX files store one field per CRLF line. Each parser skips
//! leading whitespace, consumes the longest valid prefix and ignores
//! anything after it, the way `sscanf` with `%u`, `%d`, `%x` does.

use crate::{Error, Result};

fn invalid(expected: &'static str, line: &[u8]) -> Error {
    Error::InvalidText {
        expected,
        text: String::from_utf8_lossy(line).into_owned(),
    }
}

fn skip_space(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    &line[start..]
}

fn digit_prefix(s: &[u8], radix: u32) -> usize {
    s.iter()
        .position(|&b| !(b as char).is_digit(radix))
        .unwrap_or(s.len())
}

/// Parse an unsigned decimal (`%u`, `%hu`, `%llu`) and check it fits in `max`.
pub fn scan_unsigned(line: &[u8], expected: &'static str, max: u64) -> Result<u64> {
    let s = skip_space(line);
    let s = s.strip_prefix(b"+").unwrap_or(s);
    let len = digit_prefix(s, 10);
    if len == 0 {
        return Err(invalid(expected, line));
    }
    std::str::from_utf8(&s[..len])
        .ok()
        .and_then(|digits| digits.parse::<u64>().ok())
        .filter(|&value| value <= max)
        .ok_or_else(|| invalid(expected, line))
}

/// Parse a signed decimal (`%d`).
pub fn scan_signed(line: &[u8]) -> Result<i32> {
    let s = skip_space(line);
    let sign_len = usize::from(matches!(s.first(), Some(b'-' | b'+')));
    let len = digit_prefix(&s[sign_len..], 10);
    if len == 0 {
        return Err(invalid("integer", line));
    }
    std::str::from_utf8(&s[..sign_len + len])
        .ok()
        .and_then(|digits| digits.parse::<i32>().ok())
        .ok_or_else(|| invalid("integer", line))
}

/// Parse a hexadecimal mask (`%x`), accepting an optional `0x` prefix.
pub fn scan_hex(line: &[u8]) -> Result<u32> {
    let s = skip_space(line);
    let s = s
        .strip_prefix(b"0x")
        .or_else(|| s.strip_prefix(b"0X"))
        .unwrap_or(s);
    let len = digit_prefix(s, 16);
    if len == 0 {
        return Err(invalid("hex mask", line));
    }
    std::str::from_utf8(&s[..len])
        .ok()
        .and_then(|digits| u32::from_str_radix(digits, 16).ok())
        .ok_or_else(|| invalid("hex mask", line))
}

/// Parse a real number: optional sign, digits, optional fraction and exponent.
pub fn scan_real(line: &[u8]) -> Result<f32> {
    let s = skip_space(line);
    let mut end = usize::from(matches!(s.first(), Some(b'-' | b'+')));

    let int_len = digit_prefix(&s[end..], 10);
    end += int_len;
    let mut frac_len = 0;
    if s.get(end) == Some(&b'.') {
        frac_len = digit_prefix(&s[end + 1..], 10);
        end += 1 + frac_len;
    }
    if int_len + frac_len == 0 {
        return Err(invalid("real", line));
    }

    if matches!(s.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(s.get(exp_end), Some(b'-' | b'+')) {
            exp_end += 1;
        }
        let exp_len = digit_prefix(&s[exp_end.min(s.len())..], 10);
        if exp_len > 0 {
            end = exp_end + exp_len;
        }
    }

    std::str::from_utf8(&s[..end])
        .ok()
        .and_then(|text| text.parse::<f32>().ok())
        .ok_or_else(|| invalid("real", line))
}
