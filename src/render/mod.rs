//! Renderer module: the output sink trait, format dispatch, and the
//! [`Output`] coordinator that sits between the markup interpreter and a
//! sink.

pub mod html;
pub mod json;
pub mod markdown;

use anyhow::{anyhow, Result};

/// What a headline introduces. Introductions and classes start a new page;
/// functions are headlines within their class's page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Headline {
    Intro { name: String },
    Class { name: String },
    Function(FunctionRef),
}

/// A link target for a member function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    /// Qualified name, `Class::member`.
    pub name: String,
    pub class: String,
}

impl FunctionRef {
    pub fn anchor(&self) -> String {
        anchor(&self.name)
    }

    /// The part of the name after the last `::`.
    pub fn member(&self) -> &str {
        self.name
            .rfind("::")
            .map(|i| &self.name[i + 2..])
            .unwrap_or(&self.name)
    }
}

/// The anchor of a function within its class page: the member name, or
/// `destructor` for destructors.
pub fn anchor(name: &str) -> String {
    let member = name.rfind("::").map(|i| &name[i + 2..]).unwrap_or(name);
    if member.starts_with('~') {
        "destructor".to_string()
    } else {
        member.to_string()
    }
}

/// Base name of the page documenting `name` (an introduction or class).
pub fn page_name(name: &str) -> String {
    name.to_lowercase()
}

/// A finished output page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// File name, including the renderer's extension.
    pub name: String,
    pub content: String,
}

/// Receives resolved documentation events.
///
/// A sink sees a well-formed stream: every headline and every paragraph is
/// closed by exactly one `end_paragraph` before the next headline, and no
/// text arrives with doubled whitespace. Use [`Output`] to produce such a
/// stream.
pub trait Sink {
    fn start_headline(&mut self, headline: &Headline);
    /// Ends the open headline or paragraph.
    fn end_paragraph(&mut self);
    fn add_text(&mut self, text: &str);
    fn add_link(&mut self, url: &str, title: &str);
    fn add_argument(&mut self, text: &str);
    /// Adds `text` linking to the page of `class`.
    fn add_class(&mut self, text: &str, class: &str);
    /// Adds `text` linking to the anchor of `function`.
    fn add_function(&mut self, text: &str, function: &FunctionRef);
    fn add_code_block(&mut self, text: &str);
    fn add_warning(&mut self, text: &str);
    fn add_note(&mut self, text: &str);
    fn add_section(&mut self, level: u8, text: &str);
    /// Closes the last page and returns every page produced so far.
    fn finish(&mut self) -> Vec<Page>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name. `owner` and `owner_home`
/// feed the page footer of formats that have one.
pub fn create_renderer(format: &str, owner: &str, owner_home: &str) -> Result<Box<dyn Sink>> {
    match format {
        "html" => Ok(Box::new(html::HtmlRenderer::new(owner, owner_home))),
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer::new(owner, owner_home))),
        "json" => Ok(Box::new(json::JsonRenderer::default())),
        _ => Err(anyhow!(
            "unknown format: {}. Use html, markdown, or json",
            format
        )),
    }
}

// -- Output coordinator ---------------------------------------------------

/// Wraps a [`Sink`], collapsing soft spaces and keeping headlines and
/// paragraphs balanced.
pub struct Output<'a> {
    sink: &'a mut dyn Sink,
    need_space: bool,
    // a headline or paragraph is open in the sink
    open: bool,
    // nothing has been emitted since the headline or paragraph opened
    fresh: bool,
    trailing_space: bool,
}

impl<'a> Output<'a> {
    pub fn new(sink: &'a mut dyn Sink) -> Self {
        Self {
            sink,
            need_space: false,
            open: false,
            fresh: true,
            trailing_space: false,
        }
    }

    /// Closes whatever is open and starts a headline. The headline runs
    /// until the next [`end_paragraph`](Self::end_paragraph).
    pub fn start_headline(&mut self, headline: Headline) {
        self.end_paragraph();
        self.sink.start_headline(&headline);
        self.open = true;
        self.fresh = true;
    }

    pub fn end_paragraph(&mut self) {
        self.need_space = false;
        if self.open {
            self.sink.end_paragraph();
            self.open = false;
        }
        self.fresh = true;
        self.trailing_space = false;
    }

    /// Requests a single space before the next piece of inline content.
    /// Ignored at the start of a paragraph.
    pub fn add_space(&mut self) {
        if !self.fresh {
            self.need_space = true;
        }
    }

    pub fn add_text(&mut self, text: &str) {
        let text = if self.fresh || self.trailing_space {
            text.trim_start_matches(' ')
        } else {
            text
        };
        if text.is_empty() {
            return;
        }
        self.space_before(text);
        self.sink.add_text(text);
        self.emitted(text);
    }

    pub fn add_link(&mut self, url: &str, title: &str) {
        self.space_before(title);
        self.sink.add_link(url, title);
        self.emitted(title);
    }

    pub fn add_argument(&mut self, text: &str) {
        self.space_before(text);
        self.sink.add_argument(text);
        self.emitted(text);
    }

    pub fn add_class(&mut self, text: &str, class: &str) {
        self.space_before(text);
        self.sink.add_class(text, class);
        self.emitted(text);
    }

    pub fn add_function(&mut self, text: &str, function: &FunctionRef) {
        self.space_before(text);
        self.sink.add_function(text, function);
        self.emitted(text);
    }

    pub fn add_code_block(&mut self, text: &str) {
        self.need_space = false;
        self.sink.add_code_block(text);
        self.block_emitted();
    }

    pub fn add_warning(&mut self, text: &str) {
        self.need_space = false;
        self.sink.add_warning(text);
        self.block_emitted();
    }

    pub fn add_note(&mut self, text: &str) {
        self.need_space = false;
        self.sink.add_note(text);
        self.block_emitted();
    }

    pub fn add_section(&mut self, level: u8, text: &str) {
        self.need_space = false;
        self.sink.add_section(level, text);
        self.block_emitted();
    }

    fn space_before(&mut self, next: &str) {
        if !self.need_space {
            return;
        }
        self.need_space = false;
        if !self.trailing_space && !next.starts_with(char::is_whitespace) {
            self.sink.add_text(" ");
        }
    }

    fn emitted(&mut self, text: &str) {
        self.open = true;
        self.fresh = false;
        self.trailing_space = text.ends_with(char::is_whitespace);
    }

    // Block content closes the paragraph inside the sink; what follows
    // starts afresh.
    fn block_emitted(&mut self) {
        self.open = true;
        self.fresh = true;
        self.trailing_space = false;
    }
}

#[cfg(test)]
mod tests {
    use super::json::{Event, JsonRenderer};
    use super::*;

    fn texts(sink: &JsonRenderer) -> Vec<Event> {
        sink.events().cloned().collect()
    }

    #[test]
    fn anchors() {
        assert_eq!(anchor("Foo::bar"), "bar");
        assert_eq!(anchor("Foo::~Foo"), "destructor");
        assert_eq!(anchor("Outer::Inner::run"), "run");
    }

    #[test]
    fn soft_spaces_collapse() {
        let mut sink = JsonRenderer::default();
        let mut out = Output::new(&mut sink);
        out.start_headline(Headline::Intro { name: "x".into() });
        out.end_paragraph();
        out.add_space();
        out.add_text("a");
        out.add_space();
        out.add_space();
        out.add_text("b ");
        out.add_space();
        out.add_text(" c");
        out.end_paragraph();
        assert_eq!(
            texts(&sink),
            vec![
                Event::Headline(Headline::Intro { name: "x".into() }),
                Event::EndParagraph,
                Event::Text("a".into()),
                Event::Text(" ".into()),
                Event::Text("b ".into()),
                Event::Text("c".into()),
                Event::EndParagraph,
            ]
        );
    }

    #[test]
    fn headlines_are_balanced() {
        let mut sink = JsonRenderer::default();
        let mut out = Output::new(&mut sink);
        out.start_headline(Headline::Class { name: "Foo".into() });
        out.add_text("Class Foo.");
        out.start_headline(Headline::Function(FunctionRef {
            name: "Foo::bar".into(),
            class: "Foo".into(),
        }));
        out.end_paragraph();
        out.end_paragraph();
        let ends = sink
            .events()
            .filter(|e| **e == Event::EndParagraph)
            .count();
        assert_eq!(ends, 2);
    }

    #[test]
    fn unknown_format_fails() {
        let err = create_renderer("pdf", "", "").err().unwrap();
        assert!(err.to_string().contains("unknown format"));
        assert!(create_renderer("md", "", "").is_ok());
    }
}
