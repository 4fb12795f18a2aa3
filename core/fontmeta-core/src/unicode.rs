//! `unicode-range` parsing.

use crate::error::{FontMetaError, Result};

/// Inclusive codepoint span, serialized as `[from, to]`.
pub type CodepointRange = [u32; 2];

/// Latin coverage assumed when the API did not send any `unicode-range`.
pub const DEFAULT_LATIN_RANGE: &[CodepointRange] = &[
    [0x0000, 0x00FF],
    [0x0131, 0x0131],
    [0x0152, 0x0153],
    [0x02BB, 0x02BC],
    [0x02C6, 0x02C6],
    [0x02DA, 0x02DA],
    [0x02DC, 0x02DC],
    [0x2000, 0x206F],
    [0x2074, 0x2074],
    [0x20AC, 0x20AC],
    [0x2122, 0x2122],
    [0x2191, 0x2191],
    [0x2193, 0x2193],
    [0x2212, 0x2212],
    [0x2215, 0x2215],
    [0xFEFF, 0xFEFF],
    [0xFFFD, 0xFFFD],
];

const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Parse a comma-delimited `unicode-range` value (e.g. `U+0000-00FF, U+0131, U+4??`).
pub fn parse_unicode_range(input: &str) -> Result<Vec<CodepointRange>> {
    let mut ranges = Vec::new();
    if input.trim().is_empty() {
        return Ok(ranges);
    }

    for part in input.split(',') {
        let token = part.trim();
        let body = token
            .strip_prefix("U+")
            .or_else(|| token.strip_prefix("u+"))
            .ok_or_else(|| FontMetaError::invalid(token, "unicode range must start with U+"))?;

        let range = if let Some((start, end)) = body.split_once('-') {
            let lo = parse_hex(start, token)?;
            let hi = parse_hex(end, token)?;
            if lo > hi {
                return Err(FontMetaError::invalid(token, "range start is after its end"));
            }
            [lo, hi]
        } else if body.contains('?') {
            let lo = parse_hex(&body.replace('?', "0"), token)?;
            let hi = parse_hex(&body.replace('?', "F"), token)?;
            [lo, hi]
        } else {
            let cp = parse_hex(body, token)?;
            [cp, cp]
        };
        ranges.push(range);
    }

    Ok(ranges)
}

fn parse_hex(digits: &str, token: &str) -> Result<u32> {
    if digits.is_empty() || digits.len() > 6 {
        return Err(FontMetaError::invalid(token, "expected 1-6 hex digits"));
    }
    let cp = u32::from_str_radix(digits, 16)
        .map_err(|_| FontMetaError::invalid(token, "invalid hex codepoint"))?;
    if cp > MAX_CODEPOINT {
        return Err(FontMetaError::invalid(token, "codepoint beyond U+10FFFF"));
    }
    Ok(cp)
}
