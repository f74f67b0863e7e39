//! JSON renderer: the event stream of each page, for tooling integration.
//!
//! Events are kept in memory as received, so the renderer also serves as a
//! recording sink.

use crate::render::{page_name, FunctionRef, Headline, Page, Sink};

/// One event received by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Headline(Headline),
    EndParagraph,
    Text(String),
    Link { url: String, title: String },
    Argument(String),
    Class { text: String, class: String },
    Function { text: String, function: FunctionRef },
    Code(String),
    Warning(String),
    Note(String),
    Section { level: u8, text: String },
}

#[derive(Debug, Default)]
pub struct JsonRenderer {
    pages: Vec<(String, Vec<Event>)>,
}

impl JsonRenderer {
    /// Every event received, across all pages, in order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.pages.iter().flat_map(|(_, events)| events.iter())
    }

    /// Base names of the pages started so far.
    pub fn page_names(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|(name, _)| name.as_str())
    }

    fn push(&mut self, event: Event) {
        if self.pages.is_empty() {
            self.pages.push((String::new(), Vec::new()));
        }
        if let Some((_, events)) = self.pages.last_mut() {
            events.push(event);
        }
    }
}

impl Sink for JsonRenderer {
    fn start_headline(&mut self, headline: &Headline) {
        let page = match headline {
            Headline::Intro { name } | Headline::Class { name } => Some(page_name(name)),
            Headline::Function(f) => {
                let target = page_name(&f.class);
                match self.pages.last() {
                    Some((current, _)) if *current == target => None,
                    _ => Some(target),
                }
            }
        };
        if let Some(name) = page {
            self.pages.push((name, Vec::new()));
        }
        self.push(Event::Headline(headline.clone()));
    }

    fn end_paragraph(&mut self) {
        self.push(Event::EndParagraph);
    }

    fn add_text(&mut self, text: &str) {
        self.push(Event::Text(text.to_string()));
    }

    fn add_link(&mut self, url: &str, title: &str) {
        self.push(Event::Link {
            url: url.to_string(),
            title: title.to_string(),
        });
    }

    fn add_argument(&mut self, text: &str) {
        self.push(Event::Argument(text.to_string()));
    }

    fn add_class(&mut self, text: &str, class: &str) {
        self.push(Event::Class {
            text: text.to_string(),
            class: class.to_string(),
        });
    }

    fn add_function(&mut self, text: &str, function: &FunctionRef) {
        self.push(Event::Function {
            text: text.to_string(),
            function: function.clone(),
        });
    }

    fn add_code_block(&mut self, text: &str) {
        self.push(Event::Code(text.to_string()));
    }

    fn add_warning(&mut self, text: &str) {
        self.push(Event::Warning(text.to_string()));
    }

    fn add_note(&mut self, text: &str) {
        self.push(Event::Note(text.to_string()));
    }

    fn add_section(&mut self, level: u8, text: &str) {
        self.push(Event::Section {
            level,
            text: text.to_string(),
        });
    }

    fn finish(&mut self) -> Vec<Page> {
        self.pages
            .iter()
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, events)| Page {
                name: format!("{}.{}", name, self.file_extension()),
                content: render_page(name, events),
            })
            .collect()
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

fn render_page(name: &str, events: &[Event]) -> String {
    let mut out = String::new();
    out.push_str("{\n");
    out.push_str(&format!("  \"page\": \"{}\",\n", json_escape(name)));
    out.push_str("  \"events\": [\n");
    for (i, event) in events.iter().enumerate() {
        out.push_str("    ");
        out.push_str(&render_event(event));
        if i < events.len() - 1 {
            out.push_str(",\n");
        } else {
            out.push('\n');
        }
    }
    out.push_str("  ]\n");
    out.push_str("}\n");
    out
}

fn render_event(event: &Event) -> String {
    match event {
        Event::Headline(Headline::Intro { name }) => format!(
            "{{ \"event\": \"headline\", \"kind\": \"intro\", \"name\": \"{}\" }}",
            json_escape(name)
        ),
        Event::Headline(Headline::Class { name }) => format!(
            "{{ \"event\": \"headline\", \"kind\": \"class\", \"name\": \"{}\" }}",
            json_escape(name)
        ),
        Event::Headline(Headline::Function(f)) => format!(
            "{{ \"event\": \"headline\", \"kind\": \"function\", \"name\": \"{}\", \"anchor\": \"{}\" }}",
            json_escape(&f.name),
            json_escape(&f.anchor())
        ),
        Event::EndParagraph => "{ \"event\": \"end_paragraph\" }".to_string(),
        Event::Text(text) => string_event("text", text),
        Event::Link { url, title } => format!(
            "{{ \"event\": \"link\", \"url\": \"{}\", \"title\": \"{}\" }}",
            json_escape(url),
            json_escape(title)
        ),
        Event::Argument(text) => string_event("argument", text),
        Event::Class { text, class } => format!(
            "{{ \"event\": \"class\", \"text\": \"{}\", \"class\": \"{}\" }}",
            json_escape(text),
            json_escape(class)
        ),
        Event::Function { text, function } => format!(
            "{{ \"event\": \"function\", \"text\": \"{}\", \"function\": \"{}\", \"page\": \"{}\", \"anchor\": \"{}\" }}",
            json_escape(text),
            json_escape(&function.name),
            json_escape(&page_name(&function.class)),
            json_escape(&function.anchor())
        ),
        Event::Code(text) => string_event("code", text),
        Event::Warning(text) => string_event("warning", text),
        Event::Note(text) => string_event("note", text),
        Event::Section { level, text } => format!(
            "{{ \"event\": \"section\", \"level\": {}, \"text\": \"{}\" }}",
            level,
            json_escape(text)
        ),
    }
}

fn string_event(kind: &str, text: &str) -> String {
    format!("{{ \"event\": \"{}\", \"text\": \"{}\" }}", kind, json_escape(text))
}

fn json_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
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

    #[test]
    fn one_page_per_class() {
        let mut r = JsonRenderer::default();
        r.start_headline(&Headline::Class { name: "Foo".into() });
        r.end_paragraph();
        r.start_headline(&Headline::Function(function("Foo::bar", "Foo")));
        r.end_paragraph();
        r.start_headline(&Headline::Class { name: "Bar".into() });
        r.end_paragraph();
        assert_eq!(r.page_names().collect::<Vec<_>>(), vec!["foo", "bar"]);
        let pages = r.finish();
        assert_eq!(pages[0].name, "foo.json");
        assert!(pages[0].content.contains("\"anchor\": \"bar\""));
    }

    #[test]
    fn function_without_class_page_opens_one() {
        let mut r = JsonRenderer::default();
        r.start_headline(&Headline::Function(function("Foo::~Foo", "Foo")));
        assert_eq!(r.page_names().collect::<Vec<_>>(), vec!["foo"]);
        let pages = r.finish();
        assert!(pages[0].content.contains("\"anchor\": \"destructor\""));
    }

    #[test]
    fn escapes_text() {
        let mut r = JsonRenderer::default();
        r.start_headline(&Headline::Intro { name: "intro".into() });
        r.add_code_block("printf(\"%d\\n\", x);\n");
        let pages = r.finish();
        assert!(pages[0]
            .content
            .contains(r#""text": "printf(\"%d\\n\", x);\n""#));
    }
}
