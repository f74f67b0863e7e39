//! GitHub-flavored markdown renderer: same page split as the HTML
//! renderer, with relative links between pages.

use crate::render::{page_name, FunctionRef, Headline, Page, Sink};

pub struct MarkdownRenderer {
    owner: String,
    owner_home: String,
    pages: Vec<Page>,
    current: Option<(String, String)>,
    // something is open that needs a blank line before the next block
    open: bool,
}

impl MarkdownRenderer {
    pub fn new(owner: &str, owner_home: &str) -> Self {
        Self {
            owner: owner.to_string(),
            owner_home: owner_home.to_string(),
            pages: Vec::new(),
            current: None,
            open: false,
        }
    }

    fn start_page(&mut self, name: &str) {
        self.end_page();
        self.current = Some((page_name(name), String::new()));
    }

    fn end_page(&mut self) {
        self.close();
        let Some((name, mut out)) = self.current.take() else {
            return;
        };
        if !self.owner.is_empty() {
            let owner = if self.owner_home.is_empty() {
                self.owner.clone()
            } else {
                format!("[{}]({})", self.owner, self.owner_home)
            };
            out.push_str(&format!(
                "---\n\nThis page based on source code belonging to {}. All rights reserved.\n",
                owner
            ));
        }
        self.pages.push(Page {
            name: format!("{}.{}", name, self.file_extension()),
            content: out,
        });
    }

    fn push(&mut self, s: &str) {
        if let Some((_, out)) = self.current.as_mut() {
            out.push_str(s);
            self.open = true;
        }
    }

    fn close(&mut self) {
        if self.open {
            if let Some((_, out)) = self.current.as_mut() {
                out.push_str("\n\n");
            }
            self.open = false;
        }
    }

    fn current_name(&self) -> Option<&str> {
        self.current.as_ref().map(|(name, _)| name.as_str())
    }

    fn link_within(&mut self, text: &str, start: usize, len: usize, href: Option<String>) {
        let part = &text[start..start + len];
        let linked = match href {
            Some(href) => format!("[{}]({})", part, href),
            None => part.to_string(),
        };
        self.push(&format!("{}{}{}", &text[..start], linked, &text[start + len..]));
    }
}

impl Sink for MarkdownRenderer {
    fn start_headline(&mut self, headline: &Headline) {
        match headline {
            Headline::Intro { name } => self.start_page(name),
            Headline::Class { name } => {
                self.start_page(name);
                self.push("# ");
            }
            Headline::Function(f) => {
                if self.current_name() != Some(page_name(&f.class).as_str()) {
                    self.start_page(&f.class);
                }
                self.close();
                self.push(&format!("<a name=\"{}\"></a>\n\n### ", f.anchor()));
            }
        }
    }

    fn end_paragraph(&mut self) {
        self.close();
    }

    fn add_text(&mut self, text: &str) {
        self.push(text);
    }

    fn add_link(&mut self, url: &str, title: &str) {
        self.push(&format!("[{}]({})", title, url));
    }

    fn add_argument(&mut self, text: &str) {
        self.push(&format!("*{}*", text));
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
            Some(format!("{}.{}", target, self.file_extension()))
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
            format!("{}.{}", target, self.file_extension())
        };
        let href = format!("{}#{}", page, function.anchor());
        self.link_within(text, start, len, Some(href));
    }

    fn add_code_block(&mut self, text: &str) {
        self.close();
        self.push(&format!("```cpp\n{}\n```", text.trim_end_matches('\n')));
        self.close();
    }

    fn add_warning(&mut self, text: &str) {
        self.close();
        self.push(&format!("> **Warning:** {}", text));
        self.close();
    }

    fn add_note(&mut self, text: &str) {
        self.close();
        self.push(&format!("> **Note:** {}", text));
        self.close();
    }

    fn add_section(&mut self, level: u8, text: &str) {
        self.close();
        let hashes = "#".repeat(usize::from(level.clamp(1, 3)) + 1);
        self.push(&format!("{} {}", hashes, text));
        self.close();
    }

    fn finish(&mut self) -> Vec<Page> {
        self.end_page();
        std::mem::take(&mut self.pages)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}
