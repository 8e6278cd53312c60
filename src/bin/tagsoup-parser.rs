use anyhow::{anyhow, bail, Result};
use clap::Parser;
use log::debug;
use simple_logger::SimpleLogger;
use std::fs::File;
use std::path::PathBuf;
use std::rc::Rc;
use tagsoup::config::{self, ParserOptions, DEFAULT_BROWSER};
use tagsoup::html::parser::listener::LogListener;
use tagsoup::{parse_fragment_into, parse_html, parse_html_str, Page, PageHandle};
use url::Url;

#[derive(Debug, Parser)]
#[clap(name = "tagsoup-parser", version = "0.1.0", author = "Tagsoup")]
struct Cli {
    /// The file to parse
    file: PathBuf,

    /// Browser to simulate
    #[clap(short = 'b', long = "browser", default_value = DEFAULT_BROWSER)]
    browser: String,

    /// Parse the file as a fragment inside an empty body
    #[clap(short = 'f', long = "fragment")]
    fragment: bool,

    /// Treat the file as XHTML
    #[clap(long = "xhtml")]
    xhtml: bool,

    /// Do not run scripts (noscript content is parsed as markup)
    #[clap(long = "no-js")]
    no_js: bool,

    /// Enable debug logging
    #[clap(short = 'd', long = "debug")]
    debug: bool,

    /// Don't display the tree
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    if args.debug {
        SimpleLogger::new().init()?;
    }

    let Some(browser) = config::browser(&args.browser) else {
        let known: Vec<_> = config::registry()
            .browsers()
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        bail!("unknown browser {} (known: {})", args.browser, known.join(", "));
    };

    let path = args.file.canonicalize()?;
    let url = Url::from_file_path(&path).map_err(|_| anyhow!("invalid path {}", path.display()))?;

    let options = ParserOptions {
        xhtml: args.xhtml,
        javascript_enabled: !args.no_js,
        report_errors: args.debug,
    };
    let page = Page::new(url, browser.clone())
        .with_options(options)
        .with_listener(Rc::new(LogListener));
    let page = PageHandle::create(page);

    debug!("parsing {} as {}", path.display(), browser.name);
    let errors = if args.fragment {
        parse_html_str(&page, "")?;
        let body = page
            .get()
            .document
            .body()
            .ok_or_else(|| anyhow!("no body to parse the fragment into"))?;
        let source = std::fs::read_to_string(&path)?;
        parse_fragment_into(&page, body, &source)?
    } else {
        parse_html(&page, File::open(&path)?)?
    };

    if !args.quiet {
        println!("{}", page.get().document);
    }

    for e in errors {
        println!(
            "Parse Error: {}:{} [{}] {}",
            e.location.line, e.location.column, e.key, e.message
        );
    }

    Ok(())
}
