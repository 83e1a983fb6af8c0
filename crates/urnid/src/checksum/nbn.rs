use crate::checksum::ChecksumError;

const NO_VALUE: u8 = 255;

/// Character values of the URN:NBN check digit algorithm, as published by the
/// Deutsche Nationalbibliothek.
const VALUES: [(u8, u8); 42] = [
    (b'0', 1),
    (b'1', 2),
    (b'2', 3),
    (b'3', 4),
    (b'4', 5),
    (b'5', 6),
    (b'6', 7),
    (b'7', 8),
    (b'8', 9),
    (b'9', 41),
    (b'A', 18),
    (b'B', 14),
    (b'C', 19),
    (b'D', 15),
    (b'E', 16),
    (b'F', 21),
    (b'G', 22),
    (b'H', 23),
    (b'I', 24),
    (b'J', 25),
    (b'K', 42),
    (b'L', 26),
    (b'M', 27),
    (b'N', 13),
    (b'O', 28),
    (b'P', 29),
    (b'Q', 31),
    (b'R', 12),
    (b'S', 32),
    (b'T', 33),
    (b'U', 11),
    (b'V', 34),
    (b'W', 35),
    (b'X', 36),
    (b'Y', 37),
    (b'Z', 38),
    (b'+', 49),
    (b':', 17),
    (b'-', 39),
    (b'/', 45),
    (b'_', 43),
    (b'.', 47),
];

/// Lookup table indexed by (upper-case) ASCII byte.
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0;
    while i < VALUES.len() {
        let (c, v) = VALUES[i];
        lut[c as usize] = v;
        i += 1;
    }
    lut
};

/// Computes the URN:NBN check digit of `input`.
///
/// The input is upper-cased, every character is mapped to its one- or
/// two-digit value, and the resulting digit sequence is weighted by position
/// (starting at 1). The weighted sum divided by the last digit, modulo 10, is
/// the check digit.
///
/// # Errors
///
/// - [`ChecksumError::EmptyInput`] for an empty string
/// - [`ChecksumError::UnsupportedCharacter`] for a character outside the
///   table
/// - [`ChecksumError::ZeroDivisor`] if the expanded sequence ends in `0`. No
///   table value ends in zero, so mapped input never reaches this.
///
/// # Example
///
/// ```
/// assert_eq!(urnid::check_digit("urn:nbn:de:bvb:19-146642"), Ok(8));
/// ```
pub fn check_digit(input: &str) -> Result<u8, ChecksumError> {
    if input.is_empty() {
        return Err(ChecksumError::EmptyInput);
    }

    let mut sum: u64 = 0;
    let mut position: u64 = 0;
    let mut last: u64 = 0;
    let mut push = |digit: u8| {
        position += 1;
        last = u64::from(digit);
        sum += last * position;
    };

    for (index, character) in input.chars().enumerate() {
        let value = if character.is_ascii() {
            LOOKUP[character.to_ascii_uppercase() as usize]
        } else {
            NO_VALUE
        };
        if value == NO_VALUE {
            return Err(ChecksumError::UnsupportedCharacter { character, index });
        }
        if value < 10 {
            push(value);
        } else {
            push(value / 10);
            push(value % 10);
        }
    }

    let quotient = sum.checked_div(last).ok_or(ChecksumError::ZeroDivisor)?;
    Ok((quotient % 10) as u8)
}

/// Returns `input` followed by its check digit.
///
/// # Errors
///
/// See [`check_digit`].
pub fn append_check_digit(input: &str) -> Result<String, ChecksumError> {
    let digit = check_digit(input)?;
    let mut out = String::with_capacity(input.len() + 1);
    out.push_str(input);
    out.push(char::from(b'0' + digit));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_reference_values() {
        assert_eq!(check_digit("urn:nbn:de:bvb:19-146642"), Ok(8));
        assert_eq!(check_digit("URN-NBN-DE-1"), Ok(2));
        assert_eq!(check_digit("urn:nbn:de:gbv:NN-42"), Ok(5));
        assert_eq!(check_digit("urn:nbn:de:gbv:089-332175294"), Ok(5));
    }

    #[test]
    fn single_characters() {
        // 'A' expands to 1, 8: (1*1 + 8*2) / 8 = 2
        assert_eq!(check_digit("a"), Ok(2));
        // '9' expands to 4, 1: (4*1 + 1*2) / 1 = 6
        assert_eq!(check_digit("9"), Ok(6));
        // '0' maps to 1: 1 / 1 = 1
        assert_eq!(check_digit("0"), Ok(1));
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(
            check_digit("urn:nbn:de:gbv:nn-17"),
            check_digit("URN:NBN:DE:GBV:NN-17")
        );
    }

    #[test]
    fn deterministic_over_whole_alphabet() {
        let all = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_.+:-/";
        for end in 1..=all.len() {
            let s = &all[..end];
            let first = check_digit(s).unwrap();
            assert!(first <= 9);
            assert_eq!(check_digit(s).unwrap(), first);
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(check_digit(""), Err(ChecksumError::EmptyInput));
    }

    #[test]
    fn unsupported_characters_are_rejected() {
        assert_eq!(
            check_digit("urn:nbn:de:gbv NN"),
            Err(ChecksumError::UnsupportedCharacter {
                character: ' ',
                index: 14
            })
        );
        assert!(matches!(
            check_digit("ürn"),
            Err(ChecksumError::UnsupportedCharacter { character: 'ü', .. })
        ));
        assert!(check_digit("urn#1").is_err());
    }

    #[test]
    fn no_table_value_ends_in_zero() {
        assert!(VALUES.iter().all(|(_, v)| v % 10 != 0));
    }

    #[test]
    fn append_keeps_prefix() {
        assert_eq!(
            append_check_digit("urn:nbn:de:bvb:19-146642").unwrap(),
            "urn:nbn:de:bvb:19-1466428"
        );
        assert_eq!(
            append_check_digit("").unwrap_err(),
            ChecksumError::EmptyInput
        );
    }
}
