use crate::errors::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Boolean quirk switches a simulated browser can carry. They are consulted throughout parsing
/// and never change during a single parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BrowserFeature {
    /// The scanner understands `<!--[if IE]>` style conditional comments
    HtmlConditionalComments,
    /// Whitespace-only text in certain positions is dropped instead of becoming a text node
    HtmlParserRemoveEmptyContent,
    /// Elements inside a second (inner) `<head>` are discarded
    IgnoreContentsOfInnerHead,
    /// `<![CDATA[...]]>` in HTML content is kept as a comment node
    HtmlCdataAsComment,
    /// The doctype shows up as a comment node in the tree
    DoctypeIsComment,
    /// `<meta http-equiv="X-UA-Compatible">` forces the document mode
    MetaXUaCompatible,
    /// The script engine knows `__defineGetter__`
    JsDefineGetter,
    /// Bodies of frames are only created once the whole page has loaded
    PageWaitLoadBeforeBody,
    /// SVG elements get their own element factory
    Svg,
    /// Attribute names are lower-cased by the scanner
    HtmlAttributeLowerCase,
    /// `<iframe/>` is not treated as self-closing
    HtmliframeIgnoreSelfclosing,
}

impl BrowserFeature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HtmlConditionalComments => "HTML_CONDITIONAL_COMMENTS",
            Self::HtmlParserRemoveEmptyContent => "HTMLPARSER_REMOVE_EMPTY_CONTENT",
            Self::IgnoreContentsOfInnerHead => "IGNORE_CONTENTS_OF_INNER_HEAD",
            Self::HtmlCdataAsComment => "HTML_CDATA_AS_COMMENT",
            Self::DoctypeIsComment => "DOCTYPE_IS_COMMENT",
            Self::MetaXUaCompatible => "META_X_UA_COMPATIBLE",
            Self::JsDefineGetter => "JS_DEFINE_GETTER",
            Self::PageWaitLoadBeforeBody => "PAGE_WAIT_LOAD_BEFORE_BODY",
            Self::Svg => "SVG",
            Self::HtmlAttributeLowerCase => "HTML_ATTRIBUTE_LOWER_CASE",
            Self::HtmliframeIgnoreSelfclosing => "HTMLIFRAME_IGNORE_SELFCLOSING",
        }
    }
}

impl Display for BrowserFeature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BrowserFeature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let feature = match s {
            "HTML_CONDITIONAL_COMMENTS" => Self::HtmlConditionalComments,
            "HTMLPARSER_REMOVE_EMPTY_CONTENT" => Self::HtmlParserRemoveEmptyContent,
            "IGNORE_CONTENTS_OF_INNER_HEAD" => Self::IgnoreContentsOfInnerHead,
            "HTML_CDATA_AS_COMMENT" => Self::HtmlCdataAsComment,
            "DOCTYPE_IS_COMMENT" => Self::DoctypeIsComment,
            "META_X_UA_COMPATIBLE" => Self::MetaXUaCompatible,
            "JS_DEFINE_GETTER" => Self::JsDefineGetter,
            "PAGE_WAIT_LOAD_BEFORE_BODY" => Self::PageWaitLoadBeforeBody,
            "SVG" => Self::Svg,
            "HTML_ATTRIBUTE_LOWER_CASE" => Self::HtmlAttributeLowerCase,
            "HTMLIFRAME_IGNORE_SELFCLOSING" => Self::HtmliframeIgnoreSelfclosing,
            _ => return Err(Error::Config(format!("unknown browser feature: {s}"))),
        };

        Ok(feature)
    }
}
