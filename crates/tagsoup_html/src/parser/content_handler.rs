use tagsoup_shared::byte_stream::Location;

/// Receives the balanced event stream produced by the tag balancer. Every start element is
/// matched by exactly one end element. `synthesized` is set when the tag was inferred by error
/// recovery instead of being present in the markup; it is only valid for the current call.
pub trait ContentHandler {
    fn start_document(&mut self) {}

    fn doctype(
        &mut self,
        name: &str,
        pub_identifier: Option<&str>,
        sys_identifier: Option<&str>,
        location: Location,
    );

    fn start_element(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        attributes: &[(String, String)],
        location: Location,
        synthesized: bool,
    );

    fn end_element(&mut self, name: &str, location: Location, synthesized: bool);

    fn characters(&mut self, text: &str, location: Location);

    fn comment(&mut self, text: &str, location: Location);

    /// A start tag was dropped because the element it would create already exists (a second
    /// `<body>`) or has no valid place (a stray `<td>` outside any table)
    fn ignored_start_element(
        &mut self,
        name: &str,
        attributes: &[(String, String)],
        location: Location,
    );

    /// An end tag was dropped because no matching element is open
    fn ignored_end_element(&mut self, name: &str, location: Location);

    fn end_document(&mut self, location: Location);
}
