//! Element factory registry
//!
//! Maps a tag name (plus namespace) onto a factory that creates the correctly typed element.
//! The registry is built once and never mutated afterwards. Unknown tags are never an error:
//! they resolve to the [`UnknownElementFactory`].

use crate::node::data::element::ElementData;
use crate::node::{HTML_NAMESPACE, SVG_NAMESPACE};
use lazy_static::lazy_static;
use std::collections::HashMap;
use tagsoup_config::{BrowserFeature, BrowserVersion};
use tagsoup_shared::byte_stream::Location;

/// Type of an `<input>` element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputType {
    Text,
    Password,
    Checkbox,
    Radio,
    Submit,
    Reset,
    Button,
    Hidden,
    Image,
    File,
}

impl InputType {
    /// Unknown or missing types fall back to a text field
    fn from_attribute(value: Option<&String>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("password") => Self::Password,
            Some("checkbox") => Self::Checkbox,
            Some("radio") => Self::Radio,
            Some("submit") => Self::Submit,
            Some("reset") => Self::Reset,
            Some("button") => Self::Button,
            Some("hidden") => Self::Hidden,
            Some("image") => Self::Image,
            Some("file") => Self::File,
            _ => Self::Text,
        }
    }
}

/// Variant of an element node. Only the kinds the tree construction cares about get their own
/// variant; everything else is `Phrasing` or `Generic`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Html,
    Head,
    Body,
    FrameSet,
    Frame,
    IFrame,
    Title,
    Meta,
    Base,
    Link,
    Script,
    Style,
    NoScript,
    Form,
    Input(InputType),
    Button,
    Select,
    OptGroup,
    Option,
    TextArea,
    IsIndex,
    KeyGen,
    Label,
    FieldSet,
    Table,
    TableSection,
    TableRow,
    TableCell,
    Caption,
    ColGroup,
    Col,
    Anchor,
    Span,
    Font,
    Div,
    Paragraph,
    Heading,
    List,
    ListItem,
    Break,
    Image,
    /// Other inline (phrasing) elements: b, i, em, strong, ...
    Phrasing,
    /// Other known HTML elements
    Generic,
    Svg,
    Unknown,
}

impl ElementKind {
    /// Form fields that take part in form submission
    pub fn is_submittable(&self) -> bool {
        matches!(
            self,
            Self::Input(_)
                | Self::Button
                | Self::Select
                | Self::TextArea
                | Self::IsIndex
                | Self::KeyGen
        )
    }
}

static SUPPORTED_TAGS: phf::Map<&'static str, ElementKind> = phf::phf_map! {
    "a" => ElementKind::Anchor,
    "abbr" => ElementKind::Phrasing,
    "acronym" => ElementKind::Phrasing,
    "address" => ElementKind::Generic,
    "applet" => ElementKind::Generic,
    "area" => ElementKind::Generic,
    "article" => ElementKind::Generic,
    "aside" => ElementKind::Generic,
    "audio" => ElementKind::Generic,
    "b" => ElementKind::Phrasing,
    "base" => ElementKind::Base,
    "basefont" => ElementKind::Phrasing,
    "bdo" => ElementKind::Phrasing,
    "big" => ElementKind::Phrasing,
    "blink" => ElementKind::Phrasing,
    "blockquote" => ElementKind::Generic,
    "body" => ElementKind::Body,
    "br" => ElementKind::Break,
    "button" => ElementKind::Button,
    "canvas" => ElementKind::Generic,
    "caption" => ElementKind::Caption,
    "center" => ElementKind::Generic,
    "cite" => ElementKind::Phrasing,
    "code" => ElementKind::Phrasing,
    "col" => ElementKind::Col,
    "colgroup" => ElementKind::ColGroup,
    "dd" => ElementKind::ListItem,
    "del" => ElementKind::Phrasing,
    "dfn" => ElementKind::Phrasing,
    "dir" => ElementKind::List,
    "div" => ElementKind::Div,
    "dl" => ElementKind::List,
    "dt" => ElementKind::ListItem,
    "em" => ElementKind::Phrasing,
    "embed" => ElementKind::Generic,
    "fieldset" => ElementKind::FieldSet,
    "figure" => ElementKind::Generic,
    "font" => ElementKind::Font,
    "footer" => ElementKind::Generic,
    "form" => ElementKind::Form,
    "frame" => ElementKind::Frame,
    "frameset" => ElementKind::FrameSet,
    "h1" => ElementKind::Heading,
    "h2" => ElementKind::Heading,
    "h3" => ElementKind::Heading,
    "h4" => ElementKind::Heading,
    "h5" => ElementKind::Heading,
    "h6" => ElementKind::Heading,
    "head" => ElementKind::Head,
    "header" => ElementKind::Generic,
    "hr" => ElementKind::Generic,
    "html" => ElementKind::Html,
    "i" => ElementKind::Phrasing,
    "iframe" => ElementKind::IFrame,
    "img" => ElementKind::Image,
    "input" => ElementKind::Input(InputType::Text),
    "ins" => ElementKind::Phrasing,
    "isindex" => ElementKind::IsIndex,
    "kbd" => ElementKind::Phrasing,
    "keygen" => ElementKind::KeyGen,
    "label" => ElementKind::Label,
    "legend" => ElementKind::Generic,
    "li" => ElementKind::ListItem,
    "link" => ElementKind::Link,
    "listing" => ElementKind::Generic,
    "map" => ElementKind::Phrasing,
    "marquee" => ElementKind::Generic,
    "menu" => ElementKind::List,
    "meta" => ElementKind::Meta,
    "nav" => ElementKind::Generic,
    "nobr" => ElementKind::Phrasing,
    "noembed" => ElementKind::Generic,
    "noframes" => ElementKind::Generic,
    "noscript" => ElementKind::NoScript,
    "object" => ElementKind::Generic,
    "ol" => ElementKind::List,
    "optgroup" => ElementKind::OptGroup,
    "option" => ElementKind::Option,
    "p" => ElementKind::Paragraph,
    "param" => ElementKind::Generic,
    "plaintext" => ElementKind::Generic,
    "pre" => ElementKind::Generic,
    "q" => ElementKind::Phrasing,
    "s" => ElementKind::Phrasing,
    "samp" => ElementKind::Phrasing,
    "script" => ElementKind::Script,
    "section" => ElementKind::Generic,
    "select" => ElementKind::Select,
    "small" => ElementKind::Phrasing,
    "source" => ElementKind::Generic,
    "span" => ElementKind::Span,
    "strike" => ElementKind::Phrasing,
    "strong" => ElementKind::Phrasing,
    "style" => ElementKind::Style,
    "sub" => ElementKind::Phrasing,
    "sup" => ElementKind::Phrasing,
    "table" => ElementKind::Table,
    "tbody" => ElementKind::TableSection,
    "td" => ElementKind::TableCell,
    "textarea" => ElementKind::TextArea,
    "tfoot" => ElementKind::TableSection,
    "th" => ElementKind::TableCell,
    "thead" => ElementKind::TableSection,
    "title" => ElementKind::Title,
    "tr" => ElementKind::TableRow,
    "tt" => ElementKind::Phrasing,
    "u" => ElementKind::Phrasing,
    "ul" => ElementKind::List,
    "var" => ElementKind::Phrasing,
    "video" => ElementKind::Generic,
    "wbr" => ElementKind::Generic,
    "xmp" => ElementKind::Generic,
};

/// Creates element nodes for a tag
pub trait ElementFactory: Sync {
    fn create_element(
        &self,
        qualified_name: &str,
        namespace: Option<&str>,
        attributes: HashMap<String, String>,
        location: Location,
    ) -> ElementData;
}

/// Factory for all registered HTML tags
pub struct DefaultElementFactory;

impl ElementFactory for DefaultElementFactory {
    fn create_element(
        &self,
        qualified_name: &str,
        namespace: Option<&str>,
        attributes: HashMap<String, String>,
        location: Location,
    ) -> ElementData {
        let local = local_part(qualified_name).to_ascii_lowercase();
        let kind = SUPPORTED_TAGS
            .get(local.as_str())
            .copied()
            .unwrap_or(ElementKind::Unknown);

        ElementData::new(kind, qualified_name, namespace, attributes, location)
    }
}

/// Factory for `<input>`, which picks the input type from the attributes
pub struct InputElementFactory;

impl ElementFactory for InputElementFactory {
    fn create_element(
        &self,
        qualified_name: &str,
        namespace: Option<&str>,
        attributes: HashMap<String, String>,
        location: Location,
    ) -> ElementData {
        let kind = ElementKind::Input(InputType::from_attribute(attributes.get("type")));
        ElementData::new(kind, qualified_name, namespace, attributes, location)
    }
}

/// Factory for elements in the SVG namespace
pub struct SvgElementFactory;

impl ElementFactory for SvgElementFactory {
    fn create_element(
        &self,
        qualified_name: &str,
        namespace: Option<&str>,
        attributes: HashMap<String, String>,
        location: Location,
    ) -> ElementData {
        ElementData::new(
            ElementKind::Svg,
            qualified_name,
            namespace,
            attributes,
            location,
        )
    }
}

/// Fallback for any tag that is not registered
pub struct UnknownElementFactory;

impl ElementFactory for UnknownElementFactory {
    fn create_element(
        &self,
        qualified_name: &str,
        namespace: Option<&str>,
        attributes: HashMap<String, String>,
        location: Location,
    ) -> ElementData {
        ElementData::new(
            ElementKind::Unknown,
            qualified_name,
            namespace,
            attributes,
            location,
        )
    }
}

static DEFAULT_FACTORY: DefaultElementFactory = DefaultElementFactory;
static INPUT_FACTORY: InputElementFactory = InputElementFactory;
static SVG_FACTORY: SvgElementFactory = SvgElementFactory;
static UNKNOWN_FACTORY: UnknownElementFactory = UnknownElementFactory;

lazy_static! {
    static ref ELEMENT_FACTORIES: HashMap<&'static str, &'static dyn ElementFactory> = {
        let mut factories: HashMap<&'static str, &'static dyn ElementFactory> = HashMap::new();
        for tag in SUPPORTED_TAGS.keys() {
            let factory: &'static dyn ElementFactory = if *tag == "input" {
                &INPUT_FACTORY
            } else {
                &DEFAULT_FACTORY
            };
            factories.insert(*tag, factory);
        }
        factories
    };
}

fn local_part(qualified_name: &str) -> &str {
    match qualified_name.split_once(':') {
        Some((_, local)) => local,
        None => qualified_name,
    }
}

/// Returns true when the tag has a registered factory
pub fn is_supported_tag(tag_name: &str) -> bool {
    ELEMENT_FACTORIES.contains_key(tag_name)
}

/// Returns the factory for the given tag name, or the unknown element factory
pub fn get_factory(tag_name: &str) -> &'static dyn ElementFactory {
    match ELEMENT_FACTORIES.get(tag_name) {
        Some(factory) => *factory,
        None => &UNKNOWN_FACTORY,
    }
}

/// Returns the factory for a namespaced element. SVG elements get their own factory when the
/// browser supports it; any other prefix is stripped before the plain tag lookup.
pub fn get_element_factory(
    browser: &BrowserVersion,
    namespace: Option<&str>,
    qualified_name: &str,
) -> &'static dyn ElementFactory {
    if namespace == Some(SVG_NAMESPACE) && browser.has_feature(BrowserFeature::Svg) {
        return &SVG_FACTORY;
    }

    let namespace = namespace.unwrap_or_default();
    if namespace.is_empty() || !qualified_name.contains(':') || namespace == HTML_NAMESPACE {
        let tag_name = match qualified_name.split_once(':') {
            Some((_, local)) => local.to_string(),
            None => qualified_name.to_ascii_lowercase(),
        };
        if let Some(factory) = ELEMENT_FACTORIES.get(tag_name.as_str()) {
            return *factory;
        }
    }

    &UNKNOWN_FACTORY
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn create(browser: &BrowserVersion, namespace: Option<&str>, name: &str) -> ElementData {
        get_element_factory(browser, namespace, name).create_element(
            name,
            namespace,
            HashMap::new(),
            Location::default(),
        )
    }

    #[test_case("div", ElementKind::Div)]
    #[test_case("TABLE", ElementKind::Table)]
    #[test_case("tbody", ElementKind::TableSection)]
    #[test_case("td", ElementKind::TableCell)]
    #[test_case("input", ElementKind::Input(InputType::Text))]
    #[test_case("blurp", ElementKind::Unknown)]
    #[test_case("html:form", ElementKind::Form)]
    fn lookup_kinds(name: &str, kind: ElementKind) {
        let browser = tagsoup_config::default_browser();
        assert_eq!(create(&browser, None, name).kind, kind);
    }

    #[test]
    fn svg_is_feature_gated() {
        let browser = tagsoup_config::default_browser();
        assert_eq!(create(&browser, Some(SVG_NAMESPACE), "svg").kind, ElementKind::Svg);

        let browser = browser.without_feature(BrowserFeature::Svg);
        assert_eq!(create(&browser, Some(SVG_NAMESPACE), "svg").kind, ElementKind::Unknown);
    }

    #[test]
    fn foreign_prefixes_are_unknown() {
        let browser = tagsoup_config::default_browser();
        let element = create(&browser, Some("urn:other"), "o:p");
        assert_eq!(element.kind, ElementKind::Unknown);
        assert_eq!(element.name, "o:p");

        let element = create(&browser, Some(HTML_NAMESPACE), "h:p");
        assert_eq!(element.kind, ElementKind::Paragraph);
    }

    #[test]
    fn input_factory_reads_type() {
        let mut attributes = HashMap::new();
        attributes.insert("type".to_string(), " CheckBox ".to_string());

        let element = get_factory("input").create_element(
            "input",
            None,
            attributes,
            Location::default(),
        );
        assert_eq!(element.kind, ElementKind::Input(InputType::Checkbox));
        assert!(element.kind.is_submittable());
    }

    #[test]
    fn unknown_tags_never_fail() {
        assert!(!is_supported_tag("my-widget"));
        let element = get_factory("my-widget").create_element(
            "my-widget",
            None,
            HashMap::new(),
            Location::default(),
        );
        assert_eq!(element.kind, ElementKind::Unknown);
        assert!(is_supported_tag("keygen"));
        assert!(ElementKind::KeyGen.is_submittable());
        assert!(!ElementKind::Form.is_submittable());
    }
}
