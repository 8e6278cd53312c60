pub mod character_reference;
pub mod token;

use crate::conditional_comment::evaluate;
use crate::page::Page;
use crate::parser::error_logger::{ErrorLogger, ParserError};
use crate::tokenizer::token::Token;
use log::debug;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tagsoup_config::{BrowserFeature, BrowserVersion};
use tagsoup_shared::byte_stream::Character::{Ch, StreamEnd};
use tagsoup_shared::byte_stream::{CharStream, Location};

pub const CHAR_REPLACEMENT: char = '\u{FFFD}';

/// Number of characters inspected after `<!--` when looking for a conditional comment
const CONDITIONAL_LOOKAHEAD: usize = 30;

/// Elements whose content is not markup
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes",
];

/// Raw text elements in which character references are still decoded
const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

/// Switches that change how markup is split into tokens
#[derive(Clone, Debug, Default)]
pub struct ScannerOptions {
    /// Honor `<x/>` on every element
    pub allow_self_closing: bool,
    /// Do not honor `<iframe/>`
    pub ignore_self_closing_iframe: bool,
    /// Lower case attribute names
    pub lower_case_attributes: bool,
    /// `<noscript>` content is raw text when scripting is enabled
    pub script_enabled: bool,
    /// Browser used to evaluate conditional comments. None when they are plain comments.
    pub conditional_comments: Option<BrowserVersion>,
}

impl ScannerOptions {
    /// Options for parsing into the given page
    pub fn for_page(page: &Page, fragment: bool) -> Self {
        Self {
            allow_self_closing: fragment || page.is_xhtml(),
            ignore_self_closing_iframe: page.has_feature(BrowserFeature::HtmliframeIgnoreSelfclosing),
            lower_case_attributes: page.has_feature(BrowserFeature::HtmlAttributeLowerCase),
            script_enabled: page.options.javascript_enabled,
            conditional_comments: page
                .has_feature(BrowserFeature::HtmlConditionalComments)
                .then(|| page.browser.clone()),
        }
    }
}

/// Splits markup into tokens. The scanner knows nothing about document structure; balancing
/// the tags is done by the tag balancer.
pub struct Scanner {
    pub(crate) stream: CharStream,
    options: ScannerOptions,
    error_logger: Rc<RefCell<ErrorLogger>>,
    /// Tokens that are found but not yet returned
    pending: VecDeque<Token>,
    /// Set after the start tag of a raw text element
    raw_text: Option<String>,
}

impl Scanner {
    pub fn new(
        stream: CharStream,
        options: ScannerOptions,
        error_logger: Rc<RefCell<ErrorLogger>>,
    ) -> Self {
        Self {
            stream,
            options,
            error_logger,
            pending: VecDeque::new(),
            raw_text: None,
        }
    }

    /// Creates a scanner with its own error logger for the given markup
    pub fn with_input(input: &str, options: ScannerOptions) -> Self {
        let mut stream = CharStream::new(None);
        stream.read_from_str(input);
        Self::new(stream, options, Rc::new(RefCell::new(ErrorLogger::new())))
    }

    /// Returns the next token. Once the input is exhausted, every call returns `Token::Eof`.
    pub fn next_token(&mut self) -> Token {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return token;
            }

            if let Some(tag) = self.raw_text.take() {
                if let Some(token) = self.scan_raw_text(&tag) {
                    return token;
                }
                continue;
            }

            let location = self.stream.location();
            match self.stream.read() {
                StreamEnd => return Token::Eof { location },
                Ch('<') => {
                    if let Some(token) = self.scan_markup(location) {
                        return token;
                    }
                }
                Ch(_) => return self.scan_text(location),
            }
        }
    }

    fn parse_error(&self, kind: ParserError, message: &str, location: Location) {
        self.error_logger
            .borrow_mut()
            .add_error(location, kind, message);
    }

    fn scan_text(&mut self, location: Location) -> Token {
        let mut text = String::new();
        loop {
            match self.stream.read() {
                StreamEnd | Ch('<') => break,
                Ch('&') => {
                    let value = self.consume_character_reference(false);
                    text.push_str(&value);
                }
                Ch(c) => {
                    text.push(c);
                    self.stream.read_and_next();
                }
            }
        }
        Token::Text { text, location }
    }

    /// Reads until (and including) the given terminator. Returns the text before the
    /// terminator and whether the terminator was found before the end of the stream.
    fn read_until(&mut self, terminator: &str) -> (String, bool) {
        let mut content = String::new();
        loop {
            if self.stream.consume_if(terminator, false) {
                return (content, true);
            }
            match self.stream.read_and_next() {
                Ch(c) => content.push(c),
                StreamEnd => return (content, false),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.stream.read().is_whitespace() {
            self.stream.read_and_next();
        }
    }

    fn scan_markup(&mut self, location: Location) -> Option<Token> {
        if self.stream.consume_if("<!--", false) {
            return self.scan_comment(location);
        }

        if self.stream.consume_if("<![CDATA[", false) {
            let (content, terminated) = self.read_until("]]>");
            if !terminated {
                self.parse_error(ParserError::EofInComment, "eof in CDATA section", location.clone());
            }
            return Some(Token::Comment {
                comment: format!("[CDATA[{content}]]"),
                location,
            });
        }

        // closing marker of a conditional comment that evaluated to true
        if self.stream.consume_if("<![endif]-->", true) {
            return None;
        }

        if self.stream.consume_if("<!", false) {
            if self.options.conditional_comments.is_some() && self.stream.starts_with("[if ", false) {
                return self.scan_downlevel_revealed(location);
            }
            if self.stream.consume_if("doctype", true) {
                return Some(self.scan_doctype(location));
            }
            // bogus markup (ie: <![endif]>)
            self.read_until(">");
            return None;
        }

        if self.stream.consume_if("<?", false) {
            self.read_until(">");
            return None;
        }

        if self.stream.starts_with("</", false) {
            return match self.stream.look_ahead(2) {
                c if c.is_ascii_alphabetic() => {
                    self.stream.next_n(2);
                    Some(self.scan_end_tag(location))
                }
                Ch('>') => {
                    self.stream.next_n(3);
                    None
                }
                StreamEnd => {
                    self.stream.next_n(2);
                    Some(Token::Text {
                        text: "</".into(),
                        location,
                    })
                }
                Ch(_) => {
                    self.read_until(">");
                    None
                }
            };
        }

        if self.stream.look_ahead(1).is_ascii_alphabetic() {
            self.stream.read_and_next();
            return Some(self.scan_start_tag(location));
        }

        // a literal "<"
        self.stream.read_and_next();
        Some(Token::Text {
            text: "<".into(),
            location,
        })
    }

    /// Returns the condition of an upcoming `[if condition]>` marker
    fn upcoming_condition(&self) -> Option<String> {
        let lookahead = self.stream.peek_str(CONDITIONAL_LOOKAHEAD);
        let rest = lookahead.strip_prefix("[if ")?;
        let end = rest.find("]>")?;
        Some(rest[..end].to_string())
    }

    /// Scans a comment, the `<!--` is already consumed
    fn scan_comment(&mut self, location: Location) -> Option<Token> {
        if let Some(browser) = self.options.conditional_comments.clone() {
            if let Some(condition) = self.upcoming_condition() {
                return self.scan_conditional_comment(&condition, &browser, location);
            }
        }

        let (comment, terminated) = self.read_until("-->");
        if !terminated {
            self.parse_error(ParserError::EofInComment, "eof in comment", location.clone());
        }
        Some(Token::Comment { comment, location })
    }

    fn scan_conditional_comment(
        &mut self,
        condition: &str,
        browser: &BrowserVersion,
        location: Location,
    ) -> Option<Token> {
        match evaluate(condition, browser) {
            Ok(true) => {
                debug!("conditional comment [if {condition}] is true");
                // "[if " + condition + "]>"
                self.stream.next_n(condition.chars().count() + 6);
                if !self.stream.consume_if("<!-->", false) {
                    self.stream.consume_if("-->", false);
                }
                None
            }
            Ok(false) => {
                debug!("conditional comment [if {condition}] is false");
                self.read_until("-->");
                None
            }
            Err(err) => {
                self.parse_error(
                    ParserError::InvalidConditionalComment,
                    &err.to_string(),
                    location.clone(),
                );
                let (content, _) = self.read_until("-->");
                Some(Token::Text {
                    text: format!("<!--{content}-->"),
                    location,
                })
            }
        }
    }

    /// Scans `<![if condition]>`, the `<!` is already consumed
    fn scan_downlevel_revealed(&mut self, location: Location) -> Option<Token> {
        let browser = self.options.conditional_comments.clone()?;
        let Some(condition) = self.upcoming_condition() else {
            self.read_until(">");
            return None;
        };

        match evaluate(&condition, &browser) {
            Ok(true) => {
                self.stream.next_n(condition.chars().count() + 6);
                None
            }
            Ok(false) => {
                let (comment, _) = self.read_until("<![endif]>");
                Some(Token::Comment { comment, location })
            }
            Err(err) => {
                self.parse_error(
                    ParserError::InvalidConditionalComment,
                    &err.to_string(),
                    location,
                );
                self.read_until(">");
                None
            }
        }
    }

    fn scan_quoted(&mut self) -> Option<String> {
        let quote = match self.stream.read() {
            Ch(c @ ('"' | '\'')) => c,
            _ => return None,
        };
        self.stream.read_and_next();

        let mut value = String::new();
        loop {
            match self.stream.read() {
                Ch(c) if c == quote => {
                    self.stream.read_and_next();
                    break;
                }
                Ch('>') | StreamEnd => break,
                Ch(c) => {
                    value.push(c);
                    self.stream.read_and_next();
                }
            }
        }
        Some(value)
    }

    /// Scans a doctype, `<!doctype` is already consumed
    fn scan_doctype(&mut self, location: Location) -> Token {
        self.skip_whitespace();

        let mut name = String::new();
        while let Ch(c) = self.stream.read() {
            if c.is_whitespace() || c == '>' {
                break;
            }
            name.push(c);
            self.stream.read_and_next();
        }

        let mut pub_identifier = None;
        let mut sys_identifier = None;

        self.skip_whitespace();
        if self.stream.consume_if("public", true) {
            self.skip_whitespace();
            pub_identifier = self.scan_quoted();
            self.skip_whitespace();
            sys_identifier = self.scan_quoted();
        } else if self.stream.consume_if("system", true) {
            self.skip_whitespace();
            sys_identifier = self.scan_quoted();
        }

        let (_, terminated) = self.read_until(">");
        if !terminated {
            self.parse_error(ParserError::EofInDoctype, "eof in doctype", location.clone());
        }

        Token::DocType {
            name,
            pub_identifier,
            sys_identifier,
            location,
        }
    }

    fn scan_tag_name(&mut self) -> String {
        let mut name = String::new();
        while let Ch(c) = self.stream.read() {
            if c.is_whitespace() || c == '/' || c == '>' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.stream.read_and_next();
        }
        name
    }

    /// Scans an end tag, `</` is already consumed
    fn scan_end_tag(&mut self, location: Location) -> Token {
        let name = self.scan_tag_name();
        let (_, terminated) = self.read_until(">");
        if !terminated {
            self.parse_error(ParserError::EofInTag, "eof in end tag", location.clone());
        }
        Token::EndTag { name, location }
    }

    fn scan_attribute_value(&mut self) -> String {
        let mut value = String::new();
        let quote = match self.stream.read() {
            Ch(c @ ('"' | '\'')) => {
                self.stream.read_and_next();
                Some(c)
            }
            _ => None,
        };

        loop {
            match self.stream.read() {
                StreamEnd => break,
                Ch(c) if Some(c) == quote => {
                    self.stream.read_and_next();
                    break;
                }
                Ch(c) if quote.is_none() && (c.is_whitespace() || c == '>') => break,
                Ch('&') => {
                    let decoded = self.consume_character_reference(true);
                    value.push_str(&decoded);
                }
                Ch(c) => {
                    value.push(c);
                    self.stream.read_and_next();
                }
            }
        }
        value
    }

    /// Scans a start tag, `<` is already consumed
    fn scan_start_tag(&mut self, location: Location) -> Token {
        let name = self.scan_tag_name();
        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut is_self_closing = false;

        loop {
            self.skip_whitespace();
            match self.stream.read() {
                StreamEnd => {
                    self.parse_error(ParserError::EofInTag, "eof in start tag", location.clone());
                    break;
                }
                Ch('>') => {
                    self.stream.read_and_next();
                    break;
                }
                Ch('/') => {
                    self.stream.read_and_next();
                    if self.stream.read() == Ch('>') {
                        self.stream.read_and_next();
                        is_self_closing = true;
                        break;
                    }
                }
                Ch(_) => {
                    let mut attr_name = String::new();
                    while let Ch(c) = self.stream.read() {
                        if c.is_whitespace() || c == '=' || c == '>' || c == '/' {
                            break;
                        }
                        attr_name.push(c);
                        self.stream.read_and_next();
                    }
                    if attr_name.is_empty() {
                        // a stray "=" without a name
                        self.stream.read_and_next();
                        continue;
                    }
                    if self.options.lower_case_attributes {
                        attr_name = attr_name.to_ascii_lowercase();
                    }

                    self.skip_whitespace();
                    let value = if self.stream.read() == Ch('=') {
                        self.stream.read_and_next();
                        self.skip_whitespace();
                        self.scan_attribute_value()
                    } else {
                        String::new()
                    };

                    if !attributes.iter().any(|(n, _)| n.eq_ignore_ascii_case(&attr_name)) {
                        attributes.push((attr_name, value));
                    }
                }
            }
        }

        let is_self_closing = is_self_closing
            && (self.options.allow_self_closing
                || (name == "iframe" && !self.options.ignore_self_closing_iframe));

        if !is_self_closing && self.is_raw_text_element(&name) {
            self.raw_text = Some(name.clone());
        }

        Token::StartTag {
            name,
            attributes,
            is_self_closing,
            location,
        }
    }

    fn is_raw_text_element(&self, name: &str) -> bool {
        RAW_TEXT_ELEMENTS.contains(&name) || (name == "noscript" && self.options.script_enabled)
    }

    /// Returns true when the stream is at the end tag of the given raw text element
    fn at_raw_text_end(&self, tag: &str) -> bool {
        if !self.stream.starts_with("</", false) {
            return false;
        }
        let mut offset = 2;
        for expected in tag.chars() {
            match self.stream.look_ahead(offset) {
                Ch(c) if c.eq_ignore_ascii_case(&expected) => offset += 1,
                _ => return false,
            }
        }
        matches!(self.stream.look_ahead(offset), StreamEnd | Ch('>' | '/'))
            || self.stream.look_ahead(offset).is_whitespace()
    }

    fn scan_raw_text(&mut self, tag: &str) -> Option<Token> {
        let location = self.stream.location();
        let decode = ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&tag);

        let mut text = String::new();
        loop {
            if self.at_raw_text_end(tag) {
                break;
            }
            match self.stream.read() {
                StreamEnd => break,
                Ch('&') if decode => {
                    let value = self.consume_character_reference(false);
                    text.push_str(&value);
                }
                Ch(c) => {
                    text.push(c);
                    self.stream.read_and_next();
                }
            }
        }

        if text.is_empty() {
            return None;
        }
        Some(Token::Text { text, location })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str, options: ScannerOptions) -> Vec<Token> {
        let mut scanner = Scanner::with_input(input, options);
        let mut result = Vec::new();
        loop {
            let token = scanner.next_token();
            if token.is_eof() {
                break;
            }
            result.push(token);
        }
        result
    }

    fn describe(tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .map(|t| match t {
                Token::DocType {
                    name,
                    pub_identifier,
                    sys_identifier,
                    ..
                } => format!("doctype:{name}:{pub_identifier:?}:{sys_identifier:?}"),
                Token::StartTag {
                    name,
                    attributes,
                    is_self_closing,
                    ..
                } => {
                    let attrs: Vec<String> =
                        attributes.iter().map(|(k, v)| format!("{k}={v}")).collect();
                    format!("<{name}{}{}>", if attrs.is_empty() { String::new() } else { format!(" {}", attrs.join(" ")) }, if *is_self_closing { "/" } else { "" })
                }
                Token::EndTag { name, .. } => format!("</{name}>"),
                Token::Comment { comment, .. } => format!("#comment:{comment}"),
                Token::Text { text, .. } => format!("#text:{text}"),
                Token::Eof { .. } => "eof".into(),
            })
            .collect()
    }

    fn ie8() -> ScannerOptions {
        ScannerOptions {
            conditional_comments: Some(BrowserVersion::new("IE8", "IE", 8.0, true)),
            script_enabled: true,
            ..ScannerOptions::default()
        }
    }

    #[test]
    fn tags_and_attributes() {
        let result = tokens(
            r#"<DIV Class="a" id=b checked data-x='1 &amp; 2' class="dup">x &lt; y</div>"#,
            ScannerOptions::default(),
        );
        assert_eq!(
            describe(&result),
            vec![
                "<div Class=a id=b checked= data-x=1 & 2>",
                "#text:x < y",
                "</div>"
            ]
        );
    }

    #[test]
    fn lower_case_attributes() {
        let options = ScannerOptions {
            lower_case_attributes: true,
            ..ScannerOptions::default()
        };
        let result = tokens(r#"<p onClick="x()">"#, options);
        assert_eq!(describe(&result), vec!["<p onclick=x()>"]);
    }

    #[test]
    fn raw_text_elements() {
        let result = tokens(
            "<script>if (a < b && c) { x = '</p>'; }</script><title>a &amp; b</title>",
            ScannerOptions::default(),
        );
        assert_eq!(
            describe(&result),
            vec![
                "<script>",
                "#text:if (a < b && c) { x = '</p>'; }",
                "</script>",
                "<title>",
                "#text:a & b",
                "</title>"
            ]
        );
    }

    #[test]
    fn noscript_follows_scripting() {
        let markup = "<noscript><p>x</p></noscript>";
        let enabled = ScannerOptions {
            script_enabled: true,
            ..ScannerOptions::default()
        };
        assert_eq!(tokens(markup, enabled).len(), 3);
        assert_eq!(tokens(markup, ScannerOptions::default()).len(), 5);
    }

    #[test]
    fn comments_cdata_and_bogus_markup() {
        let result = tokens(
            "<!-- c --><![CDATA[x<y]]><?php echo ?><!bogus></><a",
            ScannerOptions::default(),
        );
        assert_eq!(
            describe(&result),
            vec!["#comment: c ", "#comment:[CDATA[x<y]]", "<a>"]
        );
    }

    #[test]
    fn literal_less_than() {
        let result = tokens("a < b", ScannerOptions::default());
        assert_eq!(describe(&result), vec!["#text:a ", "#text:<", "#text: b"]);
    }

    #[test]
    fn doctype() {
        let result = tokens(
            r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
            ScannerOptions::default(),
        );
        assert_eq!(
            describe(&result),
            vec![r#"doctype:HTML:Some("-//W3C//DTD HTML 4.01//EN"):Some("http://www.w3.org/TR/html4/strict.dtd")"#]
        );

        let result = tokens("<!doctype html>", ScannerOptions::default());
        assert_eq!(describe(&result), vec!["doctype:html:None:None"]);
    }

    #[test]
    fn self_closing() {
        let markup = "<br/><div/><iframe/>";
        assert_eq!(
            describe(&tokens(markup, ScannerOptions::default())),
            vec!["<br>", "<div>", "<iframe/>"]
        );

        let xhtml = ScannerOptions {
            allow_self_closing: true,
            ignore_self_closing_iframe: true,
            ..ScannerOptions::default()
        };
        assert_eq!(
            describe(&tokens(markup, xhtml)),
            vec!["<br/>", "<div/>", "<iframe/>"]
        );
    }

    #[test]
    fn conditional_comment_true() {
        let result = tokens("<!--[if lt IE 9]>X<![endif]-->", ie8());
        assert_eq!(describe(&result), vec!["#text:X"]);

        let result = tokens("<!--[if IE 8]><!-->Y<!--<![endif]-->", ie8());
        assert_eq!(describe(&result), vec!["#text:Y", "#comment:<![endif]"]);
    }

    #[test]
    fn conditional_comment_false() {
        let result = tokens("<p><!--[if IE 6]>X<![endif]--></p>", ie8());
        assert_eq!(describe(&result), vec!["<p>", "</p>"]);
    }

    #[test]
    fn conditional_comment_invalid() {
        let result = tokens("<!--[if gte IE]>hello<![endif]-->", ie8());
        assert_eq!(
            describe(&result),
            vec!["#text:<!--[if gte IE]>hello<![endif]-->"]
        );
    }

    #[test]
    fn conditional_comments_disabled() {
        let result = tokens("<!--[if lt IE 9]>X<![endif]-->", ScannerOptions::default());
        assert_eq!(describe(&result), vec!["#comment:[if lt IE 9]>X<![endif]"]);
    }

    #[test]
    fn downlevel_revealed() {
        let result = tokens("<![if gte IE 8]><b>8+</b><![endif]>", ie8());
        assert_eq!(describe(&result), vec!["<b>", "#text:8+", "</b>"]);

        let result = tokens("<![if lt IE 8]><b>old</b><![endif]>", ie8());
        assert_eq!(
            describe(&result),
            vec!["#comment:[if lt IE 8]><b>old</b>"]
        );
    }

    #[test]
    fn eof_errors() {
        let mut scanner = Scanner::with_input("<!-- open", ScannerOptions::default());
        assert!(matches!(scanner.next_token(), Token::Comment { .. }));
        assert!(scanner.next_token().is_eof());
        let errors = scanner.error_logger.borrow().get_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key, "eof-in-comment");
    }
}
