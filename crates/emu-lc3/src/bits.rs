//! Bit-field arithmetic and formatting helpers.

/// Sign-extend the low `bits` bits of `value` to a full 16-bit word.
///
/// The field is treated as two's complement: its top bit is replicated into
/// all higher bit positions. Bits of `value` above the field are ignored.
///
/// # Panics
///
/// Panics in debug builds if `bits` is not in `1..=16`.
#[must_use]
pub fn sign_extend(value: u16, bits: u32) -> u16 {
    debug_assert!((1..=16).contains(&bits), "field width {bits} out of range");
    let shift = 16 - bits;
    (((value << shift) as i16) >> shift) as u16
}

/// Format a word as `0x`-prefixed uppercase hex, zero-padded to four digits.
#[must_use]
pub fn hex4(value: u16) -> String {
    format!("0x{value:04X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_fields_extend_high_for_all_widths() {
        for bits in 1..=15 {
            let field = 1u16 << (bits - 1); // sign bit alone
            let extended = sign_extend(field, bits);
            assert!(
                extended >= 0x8000,
                "width {bits}: {} should widen negative",
                hex4(extended)
            );
        }
    }

    #[test]
    fn positive_fields_keep_their_magnitude() {
        for bits in 2..=15 {
            let field = (1u16 << (bits - 1)) - 1; // largest positive value
            assert_eq!(sign_extend(field, bits), field, "width {bits}");
        }
        assert_eq!(sign_extend(0, 1), 0);
    }

    #[test]
    fn known_values() {
        assert_eq!(sign_extend(0x1F, 5), 0xFFFF); // -1 in 5 bits
        assert_eq!(sign_extend(0x10, 5), 0xFFF0); // -16 in 5 bits
        assert_eq!(sign_extend(0x0F, 5), 0x000F); // +15 in 5 bits
        assert_eq!(sign_extend(0x1FE, 9), 0xFFFE); // -2 in 9 bits
        assert_eq!(sign_extend(0x7FF, 11), 0xFFFF); // -1 in 11 bits
        assert_eq!(sign_extend(0xFFFF, 16), 0xFFFF);
    }

    #[test]
    fn bits_above_the_field_are_ignored() {
        assert_eq!(sign_extend(0xFFE0 | 0x01, 5), 0x0001);
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(hex4(0x2F), "0x002F");
        assert_eq!(hex4(0xFE00), "0xFE00");
    }
}
