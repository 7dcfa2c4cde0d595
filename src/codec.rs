// codec.rs — base-62 fixed-point pose text.
//
// Every coordinate is two symbols: (v0 * 62 + v1) / 1000, i.e. millimetres in 0..=3.843.
// X and Z are stored shifted by +2 so a figure centred on the origin stays positive.
// A pose body is 46 joints (23 per figure, first figure first), x y z each.

use crate::error::DecodeError;
use crate::layout::RAW_LEN;
use crate::vector::Vec3;

pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const BASE: u32 = 62;
pub const SCALE: f32 = 1000.0;
/// Centring shift applied to X and Z.
pub const OFFSET: f32 = 2.0;
pub const JOINTS_PER_POSE: usize = RAW_LEN * 2;
pub const SYMBOLS_PER_POSE: usize = JOINTS_PER_POSE * 3 * 2;

/// Largest value one coordinate can hold: 61 * 62 + 61.
pub const MAX_UNITS: u32 = BASE * BASE - 1;

pub fn symbol_value(c: char) -> Option<u32> {
    match c {
        'a'..='z' => Some(c as u32 - 'a' as u32),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 26),
        '0'..='9' => Some(c as u32 - '0' as u32 + 52),
        _ => None,
    }
}

/// Both figures of one pose, raw layout.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPose {
    pub first: Vec<Vec3>,
    pub second: Vec<Vec3>,
}

/// Decodes one pose body. Whitespace anywhere is skipped; anything after the 46th joint
/// is ignored.
pub fn decode(text: &str) -> Result<RawPose, DecodeError> {
    let mut symbols = text.char_indices().filter(|(_, c)| !c.is_whitespace());
    let mut taken = 0usize;
    let mut next = || -> Result<u32, DecodeError> {
        let (offset, symbol) = symbols.next()
            .ok_or(DecodeError::Truncated { needed: SYMBOLS_PER_POSE, found: taken })?;
        taken += 1;
        symbol_value(symbol).ok_or(DecodeError::InvalidSymbol { symbol, offset })
    };
    let mut coord = || -> Result<f32, DecodeError> {
        let hi = next()?;
        let lo = next()?;
        Ok((hi * BASE + lo) as f32 / SCALE)
    };

    let mut joints = Vec::with_capacity(JOINTS_PER_POSE);
    for _ in 0..JOINTS_PER_POSE {
        let x = coord()? - OFFSET;
        let y = coord()?;
        let z = coord()? - OFFSET;
        joints.push(Vec3::new(x, y, z));
    }
    let second = joints.split_off(RAW_LEN);
    Ok(RawPose { first: joints, second })
}

/// Writes `value` (already offset-adjusted) as two symbols, clamped to the representable range.
fn push_coord(out: &mut String, value: f32) {
    let units = (value * SCALE).round().clamp(0.0, MAX_UNITS as f32) as u32;
    out.push(ALPHABET[(units / BASE) as usize] as char);
    out.push(ALPHABET[(units % BASE) as usize] as char);
}

/// Inverse of [`decode`] for two 23-joint figures. Coordinates outside the format's range
/// are clamped; precision is one millimetre.
pub fn encode(first: &[Vec3], second: &[Vec3]) -> String {
    let mut out = String::with_capacity(SYMBOLS_PER_POSE);
    for p in first.iter().chain(second) {
        push_coord(&mut out, p.x + OFFSET);
        push_coord(&mut out, p.y);
        push_coord(&mut out, p.z + OFFSET);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One joint's worth of symbols repeated for the whole pose.
    fn uniform(joint: &str) -> String { joint.repeat(JOINTS_PER_POSE) }

    #[test]
    fn alphabet_order() {
        assert_eq!(symbol_value('a'), Some(0));
        assert_eq!(symbol_value('z'), Some(25));
        assert_eq!(symbol_value('A'), Some(26));
        assert_eq!(symbol_value('Z'), Some(51));
        assert_eq!(symbol_value('0'), Some(52));
        assert_eq!(symbol_value('9'), Some(61));
        assert_eq!(symbol_value('-'), None);
        for (i, &c) in ALPHABET.iter().enumerate() {
            assert_eq!(symbol_value(c as char), Some(i as u32));
        }
    }

    #[test]
    fn extreme_symbol_pairs() {
        // x = "aa" (0.000), y = "99" (3.843), z = "99"
        let pose = decode(&uniform("aa9999")).unwrap();
        let j = pose.first[0];
        assert!((j.x - (0.0 - OFFSET)).abs() < 1e-6);
        assert!((j.y - 3.843).abs() < 1e-6);
        assert!((j.z - (3.843 - OFFSET)).abs() < 1e-6);
    }

    #[test]
    fn mixed_pair_value() {
        // "bc" = 1 * 62 + 2 = 64 units
        let pose = decode(&uniform("bcbcbc")).unwrap();
        assert!((pose.second[22].y - 0.064).abs() < 1e-6);
        assert!((pose.second[22].x - (0.064 - OFFSET)).abs() < 1e-6);
    }

    #[test]
    fn splits_figures() {
        let mut text = "aaaaaa".repeat(RAW_LEN);
        text.push_str(&"abaaaa".repeat(RAW_LEN));
        let pose = decode(&text).unwrap();
        assert_eq!(pose.first.len(), RAW_LEN);
        assert_eq!(pose.second.len(), RAW_LEN);
        assert_eq!(pose.first[5].x, -OFFSET);
        assert!((pose.second[5].x - (0.001 - OFFSET)).abs() < 1e-6);
    }

    #[test]
    fn whitespace_is_not_counted() {
        let spaced: String = uniform("aa9999").chars()
            .enumerate()
            .flat_map(|(i, c)| if i % 7 == 0 { vec![' ', '\t', c] } else { vec![c] })
            .collect();
        assert_eq!(decode(&spaced).unwrap(), decode(&uniform("aa9999")).unwrap());
    }

    #[test]
    fn truncated_input() {
        let text = uniform("aaaaaa");
        let short = &text[..text.len() - 3];
        assert_eq!(decode(short), Err(DecodeError::Truncated { needed: SYMBOLS_PER_POSE, found: SYMBOLS_PER_POSE - 3 }));
        assert_eq!(decode(""), Err(DecodeError::Truncated { needed: SYMBOLS_PER_POSE, found: 0 }));
    }

    #[test]
    fn invalid_symbol_reports_offset() {
        let mut text = uniform("aaaaaa");
        text.replace_range(10..11, "!");
        assert_eq!(decode(&text), Err(DecodeError::InvalidSymbol { symbol: '!', offset: 10 }));
    }

    #[test]
    fn trailing_input_ignored() {
        let mut text = uniform("bbbbbb");
        text.push_str("zz!!");
        assert!(decode(&text).is_ok());
    }

    #[test]
    fn encode_then_decode_within_a_millimetre() {
        let first: Vec<Vec3> = (0..RAW_LEN).map(|i| Vec3::new(-0.5 + i as f32 * 0.01, i as f32 * 0.1, 0.25)).collect();
        let second: Vec<Vec3> = first.iter().map(|p| Vec3::new(-p.x, p.y, -p.z)).collect();
        let text = encode(&first, &second);
        assert_eq!(text.len(), SYMBOLS_PER_POSE);
        let back = decode(&text).unwrap();
        for (a, b) in first.iter().chain(&second).zip(back.first.iter().chain(&back.second)) {
            assert!((*a - *b).length() < 2e-3, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn encode_clamps_out_of_range() {
        let far = vec![Vec3::new(10.0, -1.0, -10.0); RAW_LEN];
        let back = decode(&encode(&far, &far)).unwrap();
        assert!((back.first[0].x - (3.843 - OFFSET)).abs() < 1e-6);
        assert_eq!(back.first[0].y, 0.0);
        assert_eq!(back.first[0].z, -OFFSET);
    }
}
