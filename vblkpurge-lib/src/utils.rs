//! Small parsing and formatting helpers shared by the other modules.

use std::path::Path;

pub struct Utils;
impl Utils {
    /// Parse a block state literal such as `0x01`, `0X4` or `08`.
    ///
    /// Leading zeros are ignored; the remaining digits must fit in a byte.
    pub fn hex_to_u8(s: &str) -> Result<u8, String> {
        let s = s.trim();

        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if digits.is_empty() {
            return Err("missing hex digits".to_string());
        }
        let significant = digits.trim_start_matches('0');
        let digits = if significant.is_empty() { "0" } else { significant };
        if digits.len() > 2 {
            return Err(format!("`{}` does not fit in a byte", s));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("`{}` is not a hex literal", s));
        }

        u8::from_str_radix(digits, 16).map_err(|e| e.to_string())
    }

    /// Join the given lines with ` | ` and cut the result to `max` characters.
    pub fn join_lines<'a, I>(lines: I, max: Option<usize>) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let joined = lines.into_iter().collect::<Vec<_>>().join(" | ");
        match max {
            Some(max) => joined.chars().take(max).collect(),
            None => joined,
        }
    }

    /// File name of `path` without its extension, or an empty string.
    pub(crate) fn file_stem(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::Utils;

    #[test]
    fn hex_literals() {
        assert_eq!(Utils::hex_to_u8("0x01"), Ok(0x01));
        assert_eq!(Utils::hex_to_u8("0X4"), Ok(0x04));
        assert_eq!(Utils::hex_to_u8(" 08 "), Ok(0x08));
        assert_eq!(Utils::hex_to_u8("0xff"), Ok(0xFF));
        assert_eq!(Utils::hex_to_u8("0x001"), Ok(0x01));
        assert_eq!(Utils::hex_to_u8("0x0000"), Ok(0x00));
        assert_eq!(Utils::hex_to_u8("00fe"), Ok(0xFE));
    }

    #[test]
    fn bad_hex_literals() {
        assert!(Utils::hex_to_u8("").is_err());
        assert!(Utils::hex_to_u8("0x").is_err());
        assert!(Utils::hex_to_u8("0x100").is_err());
        assert!(Utils::hex_to_u8("0x0100").is_err());
        assert!(Utils::hex_to_u8("0xzz").is_err());
        assert!(Utils::hex_to_u8("+1").is_err());
    }

    #[test]
    fn join_truncates_by_chars() {
        let joined = Utils::join_lines(["abc", "def"], None);
        assert_eq!(joined, "abc | def");
        assert_eq!(Utils::join_lines(["abc", "def"], Some(5)), "abc |");
    }
}
