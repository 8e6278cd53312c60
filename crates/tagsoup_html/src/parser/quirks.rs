#[derive(PartialEq, Debug, Copy, Clone)]
pub enum QuirksMode {
    Quirks,
    LimitedQuirks,
    NoQuirks,
}

/// Returns the quirks mode a doctype puts the page in
pub fn identify_quirks_mode(
    name: &str,
    pub_identifier: Option<&str>,
    sys_identifier: Option<&str>,
) -> QuirksMode {
    if !name.eq_ignore_ascii_case("html") {
        return QuirksMode::Quirks;
    }

    if let Some(value) = pub_identifier {
        let pub_id = value.to_lowercase();
        let starts_with_any = |list: &[&str]| list.iter().any(|prefix| pub_id.starts_with(prefix));

        if QUIRKS_PUB_IDENTIFIER_EQ.contains(&pub_id.as_str())
            || starts_with_any(QUIRKS_PUB_IDENTIFIER_PREFIX)
        {
            return QuirksMode::Quirks;
        }

        match sys_identifier {
            Some(_) if starts_with_any(LIMITED_QUIRKS_PUB_IDENTIFIER_PREFIX_NOT_MISSING_SYS) => {
                return QuirksMode::LimitedQuirks;
            }
            None if starts_with_any(QUIRKS_PUB_IDENTIFIER_PREFIX_MISSING_SYS) => {
                return QuirksMode::Quirks;
            }
            _ => {}
        }

        if starts_with_any(LIMITED_QUIRKS_PUB_IDENTIFIER_PREFIX) {
            return QuirksMode::LimitedQuirks;
        }
    }

    if let Some(value) = sys_identifier {
        if QUIRKS_SYS_IDENTIFIER_EQ.contains(&value.to_lowercase().as_str()) {
            return QuirksMode::Quirks;
        }
    }

    QuirksMode::NoQuirks
}

static QUIRKS_PUB_IDENTIFIER_EQ: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

static QUIRKS_PUB_IDENTIFIER_PREFIX: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

static QUIRKS_PUB_IDENTIFIER_PREFIX_MISSING_SYS: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

static QUIRKS_SYS_IDENTIFIER_EQ: &[&str] =
    &["http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"];

static LIMITED_QUIRKS_PUB_IDENTIFIER_PREFIX: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

static LIMITED_QUIRKS_PUB_IDENTIFIER_PREFIX_NOT_MISSING_SYS: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("html", None, None, QuirksMode::NoQuirks)]
    #[test_case("HTML", None, None, QuirksMode::NoQuirks)]
    #[test_case("foo", None, None, QuirksMode::Quirks)]
    #[test_case("html", Some("-//W3O//DTD W3 HTML Strict 3.0//EN//"), None, QuirksMode::Quirks)]
    #[test_case("html", Some("-//IETF//DTD HTML 2.0//"), None, QuirksMode::Quirks)]
    #[test_case("html", Some("-//W3C//DTD HTML 4.01 Transitional//EN"), None, QuirksMode::Quirks)]
    #[test_case(
        "html",
        Some("-//W3C//DTD HTML 4.01 Transitional//EN"),
        Some("http://www.w3.org/TR/html4/loose.dtd"),
        QuirksMode::LimitedQuirks
    )]
    #[test_case("html", Some("-//W3C//DTD XHTML 1.0 Transitional//EN"), None, QuirksMode::LimitedQuirks)]
    #[test_case(
        "html",
        Some("-//W3C//DTD XHTML 1.0 Strict//EN"),
        Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"),
        QuirksMode::NoQuirks
    )]
    #[test_case(
        "html",
        None,
        Some("http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"),
        QuirksMode::Quirks
    )]
    fn quirks_mode(name: &str, public: Option<&str>, system: Option<&str>, expected: QuirksMode) {
        assert_eq!(identify_quirks_mode(name, public, system), expected);
    }
}
