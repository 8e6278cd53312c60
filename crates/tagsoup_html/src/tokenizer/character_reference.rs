use crate::tokenizer::{Scanner, CHAR_REPLACEMENT};
use tagsoup_shared::byte_stream::Character::Ch;

/// Longest entity name we will look for
const MAX_ENTITY_LENGTH: usize = 8;

/// Named character references. Only the commonly used subset is known; anything else is
/// left in the text as written.
static NAMED_CHARS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "amp" => "&",
    "lt" => "<",
    "gt" => ">",
    "quot" => "\"",
    "apos" => "'",
    "nbsp" => "\u{00A0}",
    "iexcl" => "\u{00A1}",
    "cent" => "\u{00A2}",
    "pound" => "\u{00A3}",
    "curren" => "\u{00A4}",
    "yen" => "\u{00A5}",
    "brvbar" => "\u{00A6}",
    "sect" => "\u{00A7}",
    "uml" => "\u{00A8}",
    "copy" => "\u{00A9}",
    "ordf" => "\u{00AA}",
    "laquo" => "\u{00AB}",
    "not" => "\u{00AC}",
    "shy" => "\u{00AD}",
    "reg" => "\u{00AE}",
    "macr" => "\u{00AF}",
    "deg" => "\u{00B0}",
    "plusmn" => "\u{00B1}",
    "sup2" => "\u{00B2}",
    "sup3" => "\u{00B3}",
    "acute" => "\u{00B4}",
    "micro" => "\u{00B5}",
    "para" => "\u{00B6}",
    "middot" => "\u{00B7}",
    "cedil" => "\u{00B8}",
    "sup1" => "\u{00B9}",
    "ordm" => "\u{00BA}",
    "raquo" => "\u{00BB}",
    "frac14" => "\u{00BC}",
    "frac12" => "\u{00BD}",
    "frac34" => "\u{00BE}",
    "iquest" => "\u{00BF}",
    "Agrave" => "\u{00C0}",
    "Aacute" => "\u{00C1}",
    "Auml" => "\u{00C4}",
    "Aring" => "\u{00C5}",
    "Ccedil" => "\u{00C7}",
    "Eacute" => "\u{00C9}",
    "Ntilde" => "\u{00D1}",
    "Ouml" => "\u{00D6}",
    "times" => "\u{00D7}",
    "Uuml" => "\u{00DC}",
    "szlig" => "\u{00DF}",
    "agrave" => "\u{00E0}",
    "aacute" => "\u{00E1}",
    "acirc" => "\u{00E2}",
    "auml" => "\u{00E4}",
    "aring" => "\u{00E5}",
    "ccedil" => "\u{00E7}",
    "egrave" => "\u{00E8}",
    "eacute" => "\u{00E9}",
    "ecirc" => "\u{00EA}",
    "euml" => "\u{00EB}",
    "iacute" => "\u{00ED}",
    "ntilde" => "\u{00F1}",
    "oacute" => "\u{00F3}",
    "ouml" => "\u{00F6}",
    "divide" => "\u{00F7}",
    "oslash" => "\u{00F8}",
    "uacute" => "\u{00FA}",
    "uuml" => "\u{00FC}",
    "yuml" => "\u{00FF}",
    "ndash" => "\u{2013}",
    "mdash" => "\u{2014}",
    "lsquo" => "\u{2018}",
    "rsquo" => "\u{2019}",
    "sbquo" => "\u{201A}",
    "ldquo" => "\u{201C}",
    "rdquo" => "\u{201D}",
    "bdquo" => "\u{201E}",
    "dagger" => "\u{2020}",
    "Dagger" => "\u{2021}",
    "bull" => "\u{2022}",
    "hellip" => "\u{2026}",
    "permil" => "\u{2030}",
    "lsaquo" => "\u{2039}",
    "rsaquo" => "\u{203A}",
    "euro" => "\u{20AC}",
    "trade" => "\u{2122}",
    "larr" => "\u{2190}",
    "uarr" => "\u{2191}",
    "rarr" => "\u{2192}",
    "darr" => "\u{2193}",
    "harr" => "\u{2194}",
    "hearts" => "\u{2665}",
};

/// Entities that browsers also accept without the trailing semicolon
static LEGACY_NAMES: &[&str] = &["amp", "lt", "gt", "quot", "nbsp", "copy", "reg"];

/// Windows-1252 code points that numeric references in the C1 range map to
static C1_REPLACEMENTS: phf::Map<u32, char> = phf::phf_map! {
    0x80u32 => '\u{20AC}',
    0x82u32 => '\u{201A}',
    0x83u32 => '\u{0192}',
    0x84u32 => '\u{201E}',
    0x85u32 => '\u{2026}',
    0x86u32 => '\u{2020}',
    0x87u32 => '\u{2021}',
    0x88u32 => '\u{02C6}',
    0x89u32 => '\u{2030}',
    0x8Au32 => '\u{0160}',
    0x8Bu32 => '\u{2039}',
    0x8Cu32 => '\u{0152}',
    0x8Eu32 => '\u{017D}',
    0x91u32 => '\u{2018}',
    0x92u32 => '\u{2019}',
    0x93u32 => '\u{201C}',
    0x94u32 => '\u{201D}',
    0x95u32 => '\u{2022}',
    0x96u32 => '\u{2013}',
    0x97u32 => '\u{2014}',
    0x98u32 => '\u{02DC}',
    0x99u32 => '\u{2122}',
    0x9Au32 => '\u{0161}',
    0x9Bu32 => '\u{203A}',
    0x9Cu32 => '\u{0153}',
    0x9Eu32 => '\u{017E}',
    0x9Fu32 => '\u{0178}',
};

impl Scanner {
    /// Consumes a character reference starting at the current `&` and returns its replacement
    /// text. References that cannot be resolved are returned as written.
    pub(crate) fn consume_character_reference(&mut self, as_attribute: bool) -> String {
        // the ampersand itself
        self.stream.read_and_next();

        if self.stream.read() == Ch('#') {
            return self.consume_numeric_reference();
        }

        let mut name = String::new();
        while name.len() < MAX_ENTITY_LENGTH {
            match self.stream.look_ahead(name.len()) {
                Ch(c) if c.is_ascii_alphanumeric() => name.push(c),
                _ => break,
            }
        }

        let Some(replacement) = NAMED_CHARS.get(name.as_str()) else {
            return "&".to_string();
        };

        let terminated = self.stream.look_ahead(name.len()) == Ch(';');
        if !terminated {
            if !LEGACY_NAMES.contains(&name.as_str()) {
                return "&".to_string();
            }
            // "&amp=" in an attribute value is kept as is (query strings)
            if as_attribute && self.stream.look_ahead(name.len()) == Ch('=') {
                return "&".to_string();
            }
        }

        self.stream.next_n(name.len());
        if terminated {
            self.stream.read_and_next();
        }
        replacement.to_string()
    }

    fn consume_numeric_reference(&mut self) -> String {
        let hex = matches!(self.stream.look_ahead(1), Ch('x' | 'X'));
        let prefix_len = if hex { 2 } else { 1 };
        let radix = if hex { 16 } else { 10 };

        let mut digits = 0;
        let mut code: Option<u32> = Some(0);
        while let Ch(c) = self.stream.look_ahead(prefix_len + digits) {
            let Some(value) = c.to_digit(radix) else {
                break;
            };
            code = code
                .and_then(|v| v.checked_mul(radix))
                .and_then(|v| v.checked_add(value));
            digits += 1;
        }

        if digits == 0 {
            return "&".to_string();
        }

        self.stream.next_n(prefix_len + digits);
        if self.stream.read() == Ch(';') {
            self.stream.read_and_next();
        }

        let c = match code {
            Some(0) | None => CHAR_REPLACEMENT,
            Some(code) => match C1_REPLACEMENTS.get(&code) {
                Some(c) => *c,
                None => char::from_u32(code).unwrap_or(CHAR_REPLACEMENT),
            },
        };
        c.to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::tokenizer::{Scanner, ScannerOptions};
    use test_case::test_case;

    fn decode(input: &str, as_attribute: bool) -> (String, String) {
        let mut scanner = Scanner::with_input(input, ScannerOptions::default());
        let value = scanner.consume_character_reference(as_attribute);
        let rest = scanner.stream.peek_str(64);
        (value, rest)
    }

    #[test_case("&amp;x", "&", "x")]
    #[test_case("&lt;", "<", "")]
    #[test_case("&nbsp x", "\u{a0}", " x")]
    #[test_case("&copy;2024", "\u{a9}", "2024")]
    #[test_case("&hellip;", "\u{2026}", "")]
    #[test_case("&hellip", "&", "hellip")]
    #[test_case("&unknown;", "&", "unknown;")]
    #[test_case("& x", "&", " x")]
    #[test_case("&#65;", "A", "")]
    #[test_case("&#x41;b", "A", "b")]
    #[test_case("&#X6a", "j", "")]
    #[test_case("&#0;", "\u{FFFD}", "")]
    #[test_case("&#x110000;", "\u{FFFD}", "")]
    #[test_case("&#xD800;", "\u{FFFD}", "")]
    #[test_case("&#99999999999999;", "\u{FFFD}", "")]
    #[test_case("&#150;", "\u{2013}", "")]
    #[test_case("&#;", "&", "#;")]
    fn text_references(input: &str, expected: &str, rest: &str) {
        assert_eq!(decode(input, false), (expected.to_string(), rest.to_string()));
    }

    #[test]
    fn attribute_query_strings() {
        assert_eq!(decode("&amp=1", true), ("&".to_string(), "amp=1".to_string()));
        assert_eq!(decode("&amp=1", false), ("&".to_string(), "=1".to_string()));
    }
}
