/// Receives warnings and errors found while parsing malformed markup. Registering a listener
/// on a page is optional; without one, diagnostics are only kept in the parse result.
pub trait HtmlParserListener {
    #[allow(clippy::too_many_arguments)]
    fn error(
        &self,
        message: &str,
        url: &str,
        html: Option<&str>,
        line: usize,
        column: usize,
        key: &str,
    );

    #[allow(clippy::too_many_arguments)]
    fn warning(
        &self,
        message: &str,
        url: &str,
        html: Option<&str>,
        line: usize,
        column: usize,
        key: &str,
    );
}

/// Listener that forwards every diagnostic to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogListener;

impl HtmlParserListener for LogListener {
    fn error(
        &self,
        message: &str,
        url: &str,
        _html: Option<&str>,
        line: usize,
        column: usize,
        key: &str,
    ) {
        log::error!("{url} ({line}:{column}) [{key}] {message}");
    }

    fn warning(
        &self,
        message: &str,
        url: &str,
        _html: Option<&str>,
        line: usize,
        column: usize,
        key: &str,
    ) {
        log::warn!("{url} ({line}:{column}) [{key}] {message}");
    }
}
