//! HTML renderer: one web page per introduction and per class.

use crate::render::{page_name, FunctionRef, Headline, Page, Sink};

pub struct HtmlRenderer {
    owner: String,
    owner_home: String,
    pages: Vec<Page>,
    current: Option<PageState>,
}

/// The page being written.
struct PageState {
    name: String,
    out: String,
    /// Closing markup of the open headline or paragraph; empty when none is
    /// open.
    close: &'static str,
    anchors: Vec<String>,
}

impl HtmlRenderer {
    pub fn new(owner: &str, owner_home: &str) -> Self {
        Self {
            owner: owner.to_string(),
            owner_home: owner_home.to_string(),
            pages: Vec::new(),
            current: None,
        }
    }

    fn start_page(&mut self, name: &str, title: &str) {
        self.end_page();
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=en><head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", html_escape(title)));
        out.push_str("<link rel=stylesheet href=\"udoc.css\" type=\"text/css\">\n");
        out.push_str("</head><body>\n");
        self.current = Some(PageState {
            name: page_name(name),
            out,
            close: "",
            anchors: Vec::new(),
        });
    }

    fn end_page(&mut self) {
        let Some(mut page) = self.current.take() else {
            return;
        };
        page.close_block();
        page.out
            .push_str("<p class=\"rights\">This web page based on source code belonging to ");
        if self.owner_home.is_empty() {
            page.out.push_str(&html_escape(&self.owner));
        } else {
            page.out.push_str(&format!(
                "<a href=\"{}\">{}</a>",
                html_escape(&self.owner_home),
                html_escape(&self.owner)
            ));
        }
        page.out.push_str(". All rights reserved.</p>\n");
        page.out.push_str("</body></html>\n");
        self.pages.push(Page {
            name: format!("{}.{}", page.name, self.file_extension()),
            content: page.out,
        });
    }

    /// Adds inline markup, opening a text paragraph first if needed.
    fn inline(&mut self, markup: &str) {
        if let Some(page) = self.current.as_mut() {
            if page.close.is_empty() {
                page.out.push_str("<p class=\"text\">");
                page.close = "</p>\n";
            }
            page.out.push_str(markup);
        }
    }

    /// Adds block markup after closing the open paragraph.
    fn block(&mut self, markup: &str) {
        if let Some(page) = self.current.as_mut() {
            page.close_block();
            page.out.push_str(markup);
        }
    }

    fn current_name(&self) -> Option<&str> {
        self.current.as_ref().map(|p| p.name.as_str())
    }

    /// Adds `text` with the `len` bytes at `start` wrapped in a link to
    /// `href`, or left plain without one.
    fn link_within(&mut self, text: &str, start: usize, len: usize, href: Option<String>) {
        let nobr = text.contains(' ');
        let mut s = String::new();
        if nobr {
            s.push_str("<span class=nobr>");
        }
        s.push_str(&html_escape(&text[..start]));
        let part = html_escape(&text[start..start + len]);
        match href {
            Some(href) => s.push_str(&format!("<a href=\"{}\">{}</a>", href, part)),
            None => s.push_str(&part),
        }
        s.push_str(&html_escape(&text[start + len..]));
        if nobr {
            s.push_str("</span>");
        }
        self.inline(&s);
    }
}

impl PageState {
    fn close_block(&mut self) {
        self.out.push_str(self.close);
        self.close = "";
    }
}

impl Sink for HtmlRenderer {
    fn start_headline(&mut self, headline: &Headline) {
        match headline {
            Headline::Intro { name } => self.start_page(name, name),
            Headline::Class { name } => {
                self.start_page(name, &format!("{} documentation", name));
                if let Some(page) = self.current.as_mut() {
                    page.out.push_str("<h1 class=\"classh\">");
                    page.close = "</h1>\n";
                }
            }
            Headline::Function(f) => {
                if self.current_name() != Some(page_name(&f.class).as_str()) {
                    self.start_page(&f.class, &format!("{} documentation", f.class));
                }
                let anchor = f.anchor();
                if let Some(page) = self.current.as_mut() {
                    page.close_block();
                    page.out.push_str("<h2 class=\"functionh\">");
                    if !page.anchors.contains(&anchor) {
                        page.out.push_str(&format!("<a name=\"{}\"></a>", html_escape(&anchor)));
                        page.anchors.push(anchor);
                    }
                    page.close = "</h2>\n";
                }
            }
        }
    }

    fn end_paragraph(&mut self) {
        if let Some(page) = self.current.as_mut() {
            page.close_block();
        }
    }

    fn add_text(&mut self, text: &str) {
        self.inline(&html_escape(text));
    }

    fn add_link(&mut self, url: &str, title: &str) {
        self.inline(&format!(
            "<a href=\"{}\">{}</a>",
            html_escape(url),
            html_escape(title)
        ));
    }

    fn add_argument(&mut self, text: &str) {
        self.inline(&format!("<i>{}</i>", html_escape(text)));
    }

    fn add_class(&mut self, text: &str, class: &str) {
        let (start, len) = match text.find(class) {
            Some(i) => (i, class.len()),
            None => (0, text.len()),
        };
        let target = page_name(class);
        let href = if self.current_name() == Some(target.as_str()) {
            None
        } else {
            Some(format!("{}.{}", html_escape(&target), self.file_extension()))
        };
        self.link_within(text, start, len, href);
    }

    fn add_function(&mut self, text: &str, function: &FunctionRef) {
        let (start, mut len) = match text.find(&function.name) {
            Some(i) => (i, function.name.len()),
            None => match text.find(function.member()) {
                Some(i) => (i, function.member().len()),
                None => (0, text.len()),
            },
        };
        if text[start + len..].starts_with("()") {
            len += 2;
        }
        let target = page_name(&function.class);
        let page = if self.current_name() == Some(target.as_str()) {
            String::new()
        } else {
            format!("{}.{}", html_escape(&target), self.file_extension())
        };
        let href = format!("{}#{}", page, html_escape(&function.anchor()));
        self.link_within(text, start, len, Some(href));
    }

    fn add_code_block(&mut self, text: &str) {
        self.block(&format!("<pre>{}</pre>\n", text));
    }

    fn add_warning(&mut self, text: &str) {
        self.block(&format!(
            "<p class=\"warning\"><b>Warning:</b> {}</p>\n",
            html_escape(text)
        ));
    }

    fn add_note(&mut self, text: &str) {
        self.block(&format!(
            "<p class=\"note\"><b>Note:</b> {}</p>\n",
            html_escape(text)
        ));
    }

    fn add_section(&mut self, level: u8, text: &str) {
        // h1 and h2 belong to class and function headlines
        let h = level.clamp(1, 3) + 2;
        self.block(&format!("<h{0}>{1}</h{0}>\n", h, html_escape(text)));
    }

    fn finish(&mut self) -> Vec<Page> {
        self.end_page();
        std::mem::take(&mut self.pages)
    }

    fn file_extension(&self) -> &str {
        "html"
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str, class: &str) -> FunctionRef {
        FunctionRef {
            name: name.into(),
            class: class.into(),
        }
    }

    fn class_page(r: &mut HtmlRenderer) {
        r.start_headline(&Headline::Class { name: "Widget".into() });
        r.add_text("Class Widget.");
        r.end_paragraph();
    }

    #[test]
    fn class_page_structure() {
        let mut r = HtmlRenderer::new("Example Corp", "");
        class_page(&mut r);
        r.add_text("Draws a <b> & more.");
        r.end_paragraph();
        let pages = r.finish();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].name, "widget.html");
        let html = &pages[0].content;
        assert!(html.contains("<title>Widget documentation</title>"));
        assert!(html.contains("<h1 class=\"classh\">Class Widget.</h1>"));
        assert!(html.contains("<p class=\"text\">Draws a &lt;b&gt; &amp; more.</p>"));
        assert!(html.contains(
            "This web page based on source code belonging to Example Corp. All rights reserved."
        ));
    }

    #[test]
    fn owner_linked_when_home_set() {
        let mut r = HtmlRenderer::new("Example Corp", "https://example.com/");
        class_page(&mut r);
        let pages = r.finish();
        assert!(pages[0]
            .content
            .contains("<a href=\"https://example.com/\">Example Corp</a>. All rights reserved."));
    }

    #[test]
    fn anchor_emitted_once_per_page() {
        let mut r = HtmlRenderer::new("", "");
        class_page(&mut r);
        for _ in 0..2 {
            r.start_headline(&Headline::Function(function("Widget::resize", "Widget")));
            r.add_text("void Widget::resize()");
            r.end_paragraph();
        }
        let pages = r.finish();
        assert_eq!(pages[0].content.matches("<a name=\"resize\"></a>").count(), 1);
        assert_eq!(pages[0].content.matches("<h2 class=\"functionh\">").count(), 2);
    }

    #[test]
    fn links_to_other_pages_and_same_page() {
        let mut r = HtmlRenderer::new("", "");
        class_page(&mut r);
        r.add_class("Button,", "Button");
        r.add_text(" ");
        r.add_class("Widget", "Widget");
        r.add_text(" ");
        r.add_function("resize().", &function("Widget::resize", "Widget"));
        r.add_text(" ");
        r.add_function("Button::press()", &function("Button::press", "Button"));
        r.end_paragraph();
        let html = r.finish().remove(0).content;
        assert!(html.contains("<a href=\"button.html\">Button</a>,"));
        assert!(html.contains(" Widget "));
        assert!(html.contains("<a href=\"#resize\">resize()</a>."));
        assert!(html.contains("<a href=\"button.html#press\">Button::press()</a>"));
    }

    #[test]
    fn code_block_unescaped_and_closes_paragraph() {
        let mut r = HtmlRenderer::new("", "");
        class_page(&mut r);
        r.add_text("Example:");
        r.add_code_block("if (a < b) {}");
        r.add_text("After.");
        r.end_paragraph();
        let html = r.finish().remove(0).content;
        assert!(html.contains("<p class=\"text\">Example:</p>\n<pre>if (a < b) {}</pre>\n<p class=\"text\">After.</p>"));
    }

    #[test]
    fn warning_and_section() {
        let mut r = HtmlRenderer::new("", "");
        class_page(&mut r);
        r.add_warning("Not thread-safe.");
        r.add_section(1, "Details");
        let html = r.finish().remove(0).content;
        assert!(html.contains("<p class=\"warning\"><b>Warning:</b> Not thread-safe.</p>"));
        assert!(html.contains("<h3>Details</h3>"));
    }
}
