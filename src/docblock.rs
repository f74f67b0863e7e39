//! Markup interpreter: walks the text of one doc block, resolves its
//! directives and references, and emits the result to an [`Output`].
//!
//! The interpreter is a small state machine over the words of the text.
//! `\a` and `\introduces` change what the following words mean; a blank
//! line ends the paragraph and returns to plain text.

use crate::cursor::{is_space, simplified, Cursor};
use crate::model::{ClassId, DocId, DocTarget, FileId, FunctionId, Location};
use crate::parser::cpp::parameter_names;
use crate::registry::Registry;
use crate::render::{FunctionRef, Headline, Output};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static RE_RFC_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \n]*([0-9]+)").unwrap());

static RE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// What the next word means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Plain,
    /// After `\a`: the next word names a parameter.
    ExpectingArgumentName,
    /// After `\introduces`: every word up to the end of the paragraph
    /// names a class.
    ExpectingIntroducedName,
}

struct Interpreter<'a, 's> {
    reg: &'a mut Registry,
    out: &'a mut Output<'s>,
    file: FileId,
    /// Where the comment opens; block-level problems are reported here.
    line: usize,
    text_line: usize,
    target: DocTarget,
    state: State,
    validated: HashSet<String>,
    introduces_seen: bool,
    overload_seen: bool,
}

/// Generates output for the doc block `doc`. Blocks marked `\internal`
/// produce nothing.
pub fn generate(reg: &mut Registry, out: &mut Output<'_>, doc: DocId) {
    let block = reg.doc(doc);
    if block.is_internal() {
        return;
    }
    let text = block.text.clone();
    let Location { file, line } = block.origin;
    let text_line = block.text_line;
    let target = block.target;

    let mut it = Interpreter {
        reg,
        out,
        file,
        line,
        text_line,
        target,
        state: State::Plain,
        validated: HashSet::new(),
        introduces_seen: false,
        overload_seen: false,
    };
    match target {
        DocTarget::Function(f) => it.function_preamble(f),
        DocTarget::Class(c) => it.class_preamble(c),
        DocTarget::Intro(i) => {
            let name = it.reg.intro(i).name.clone();
            it.out.start_headline(Headline::Intro { name });
        }
    }
    it.words(&text);
    it.epilogue();
}

impl Interpreter<'_, '_> {
    fn report(&mut self, line: usize, message: impl Into<String>) {
        self.reg.report(self.file, line, message);
    }

    /// The class whose members unqualified names refer to.
    fn scope(&self) -> Option<ClassId> {
        match self.target {
            DocTarget::Function(f) => Some(self.reg.function(f).class),
            DocTarget::Class(c) => Some(c),
            DocTarget::Intro(_) => None,
        }
    }

    fn function_ref(&self, f: FunctionId) -> FunctionRef {
        let function = self.reg.function(f);
        FunctionRef {
            name: function.name.clone(),
            class: self.reg.class(function.class).name.clone(),
        }
    }

    // -- Preambles ------------------------------------------------------------

    fn function_preamble(&mut self, f: FunctionId) {
        let function = self.reg.function(f);
        let class = function.class;
        let return_type = function.return_type.clone();
        let name = function.name.clone();
        let arguments = function.arguments.clone();
        let is_const = function.is_const;

        let headline = Headline::Function(self.function_ref(f));
        self.out.start_headline(headline);
        self.add_with_class(&return_type, class);
        self.out.add_text(" ");
        self.out.add_text(&name);
        if arguments == "()" {
            self.out.add_text(&arguments);
        } else {
            for (i, chunk) in arguments.split_inclusive(',').enumerate() {
                let chunk = if i > 0 {
                    self.out.add_space();
                    chunk.trim_start()
                } else {
                    chunk
                };
                self.add_with_class(chunk, class);
            }
        }
        if is_const {
            self.out.add_text(" const");
        }
        self.out.end_paragraph();
    }

    fn class_preamble(&mut self, c: ClassId) {
        let class = self.reg.class(c);
        let name = class.name.clone();
        let parent = class.parent.map(|p| self.reg.class(p).name.clone());
        let children: Vec<String> = class
            .children
            .iter()
            .map(|child| self.reg.class(*child).name.clone())
            .collect();
        let has_members = !class.members.is_empty();

        self.out.start_headline(Headline::Class { name: name.clone() });
        self.out.add_text("Class ");
        self.out.add_text(&name);
        self.out.add_text(".");
        self.out.end_paragraph();

        if let Some(parent) = &parent {
            self.out.add_text("Inherits ");
            self.out.add_class(&format!("{}.", parent), parent);
        }
        if !children.is_empty() {
            self.out.add_space();
            self.out.add_text("Inherited by ");
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    self.out.add_space();
                }
                let punctuation = if i + 1 < children.len() { "," } else { "." };
                self.out.add_class(&format!("{}{}", child, punctuation), child);
            }
        }
        self.out.end_paragraph();

        if !has_members {
            let line = self.line;
            self.report(line, format!("Class {} has no member functions", name));
        }
    }

    /// Adds `s`, linked to the first known class named in it unless that
    /// class is `within`.
    fn add_with_class(&mut self, s: &str, within: ClassId) {
        let bytes = s.as_bytes();
        let mut found = None;
        let mut i = 0;
        while found.is_none() && i < bytes.len() {
            if bytes[i].is_ascii_uppercase() {
                let mut j = i;
                while j < bytes.len() && bytes[j].is_ascii_alphanumeric() {
                    j += 1;
                }
                found = self.reg.find_class(&s[i..j]);
                i = j;
            }
            i += 1;
        }
        match found {
            Some(c) if c != within => {
                let name = self.reg.class(c).name.clone();
                self.out.add_class(s, &name);
            }
            _ => self.out.add_text(s),
        }
    }

    // -- Word loop ------------------------------------------------------------

    fn words(&mut self, text: &str) {
        let mut p = Cursor::new(text);
        let mut count = 0;
        let mut last_line = self.text_line;
        while !p.at_end() {
            let start = p.pos();
            let mut newlines = 0;
            while let Some(b) = p.peek().filter(|b| is_space(*b)) {
                if b == b'\n' {
                    newlines += 1;
                }
                p.step();
            }
            if newlines >= 2 {
                self.end_of_paragraph(last_line);
            } else if p.pos() > start && self.state != State::ExpectingIntroducedName {
                self.out.add_space();
            }
            if p.at_end() {
                break;
            }
            count += 1;
            let line = self.text_line + p.line() - 1;
            self.word(&mut p, line, count);
            last_line = line;
        }
        self.end_of_paragraph(last_line);
    }

    fn transition(&mut self, to: State, directive: &str, line: usize) {
        match (self.state, to) {
            (State::Plain, _) | (_, State::Plain) => {}
            (State::ExpectingArgumentName | State::ExpectingIntroducedName, _) => {
                self.report(
                    line,
                    format!("Directive {} negates preceding directive", directive),
                );
            }
        }
        self.state = to;
    }

    fn end_of_paragraph(&mut self, line: usize) {
        match self.state {
            State::Plain | State::ExpectingIntroducedName => {}
            State::ExpectingArgumentName => {
                self.report(line, "Directive hanging at end of paragraph");
            }
        }
        self.state = State::Plain;
        self.out.end_paragraph();
    }

    /// Processes the word at the cursor; `n` is its 1-based position in the
    /// block.
    fn word(&mut self, p: &mut Cursor, line: usize, n: usize) {
        let start = p.pos();
        while p.peek().is_some_and(|b| !is_space(b)) {
            p.step();
        }
        let w = p.slice(start, p.pos());

        if w == "RFC" {
            if let Some(m) = RE_RFC_NUMBER.captures(p.rest()) {
                if let Ok(number) = m[1].parse::<u64>() {
                    let url = format!("http://www.rfc-editor.org/rfc/rfc{}.txt", number);
                    self.out.add_link(&url, &format!("RFC {}", number));
                    p.set_pos(p.pos() + m[0].len());
                    return;
                }
            }
            self.plain_word(w, line);
        } else if RE_URL.is_match(w) {
            self.out.add_link(w, w);
        } else if !w.starts_with('\\') {
            self.plain_word(w, line);
        } else {
            self.directive(w, p, line, n);
        }
    }

    fn directive(&mut self, w: &str, p: &mut Cursor, line: usize, n: usize) {
        match w {
            "\\a" => {
                if matches!(self.target, DocTarget::Function(_)) {
                    self.transition(State::ExpectingArgumentName, w, line);
                } else {
                    self.report(line, "\\a is only defined for function documentation");
                }
            }
            "\\introduces" => {
                if matches!(self.target, DocTarget::Intro(_)) {
                    self.transition(State::ExpectingIntroducedName, w, line);
                } else {
                    self.report(line, "\\introduces is only valid after \\chapter");
                }
                self.introduces_seen = true;
            }
            "\\overload" => self.overload(line, n),
            "\\code" => {
                let code = p.text_until("\\endcode");
                let code = match code.find('\n') {
                    Some(i) if code[..i].trim().is_empty() => &code[i + 1..],
                    _ => code.trim_start(),
                };
                self.out.add_code_block(code.trim_end());
            }
            "\\warning" => {
                let text = read_until_end_of_block(p);
                self.out.add_warning(&text);
            }
            "\\note" => {
                let text = read_until_end_of_block(p);
                self.out.add_note(&text);
            }
            "\\section1" | "\\section2" | "\\section3" => {
                let level = w.as_bytes()[w.len() - 1] - b'0';
                let text = read_until_end_of_block(p);
                self.out.add_section(level, &text);
            }
            _ => {
                self.report(line, format!("Unknown directive: {}", w));
                self.out.add_text(w);
            }
        }
    }

    fn overload(&mut self, line: usize, n: usize) {
        match self.target {
            DocTarget::Function(f) => {
                if self.reg.function(f).overload {
                    self.report(line, "\\overload repeated");
                } else {
                    self.reg.function_mut(f).overload = true;
                }
                self.overload_seen = true;
            }
            _ => self.report(line, "\\overload is only meaningful for functions"),
        }
        if n > 1 {
            self.report(line, "\\overload must be the first directive");
        }
    }

    // -- References -----------------------------------------------------------

    fn plain_word(&mut self, w: &str, line: usize) {
        match self.state {
            State::ExpectingIntroducedName => self.introduced_name(w, line),
            State::ExpectingArgumentName => self.argument_name(w, line),
            State::Plain => self.reference(w, line),
        }
    }

    fn introduced_name(&mut self, w: &str, line: usize) {
        let name = w.trim_end_matches([',', '.']);
        self.reg.singleton(name, Location { file: self.file, line });
        let DocTarget::Intro(intro) = self.target else {
            return;
        };
        match self.reg.find_class(name) {
            Some(c) => self.reg.intro_mut(intro).add_class(c),
            None => self.report(line, format!("Cannot find class: {}", name)),
        }
    }

    fn argument_name(&mut self, w: &str, line: usize) {
        let name = word_proper(w);
        let name = name.strip_prefix('*').unwrap_or(name);
        if !self.validated.contains(name) {
            let known = match self.target {
                DocTarget::Function(f) => self.reg.function(f).has_argument(name),
                _ => false,
            };
            if known {
                self.validated.insert(name.to_string());
            } else {
                self.report(line, format!("No such argument: {}", name));
            }
        }
        self.out.add_argument(w);
        self.transition(State::Plain, "(after argument name)", line);
    }

    fn reference(&mut self, w: &str, line: usize) {
        let proper = word_proper(w);
        let scope = self.scope();

        if proper.ends_with('(') {
            let i = proper.find('(').unwrap_or(0);
            if i > 0 && proper.as_bytes()[0].is_ascii_alphabetic() {
                let mut name = proper[..i].to_string();
                let mut link = None;
                if name.contains(':') {
                    link = self.reg.find_function(&name, None, false);
                } else if let Some(c) = scope {
                    let mut chain = vec![c];
                    chain.extend(self.reg.ancestors(c));
                    for class in chain {
                        let qualified = format!("{}::{}", self.reg.class(class).name, name);
                        if let Some(f) = self.reg.find_function(&qualified, None, false) {
                            link = Some(f);
                            name = qualified;
                            break;
                        }
                    }
                }
                match (scope, link) {
                    (Some(c), None) if name != "main" => {
                        let class = self.reg.class(c).name.clone();
                        self.report(
                            line,
                            format!("No link target for {}() (in class {})", name, class),
                        );
                    }
                    (_, Some(f)) if self.target != DocTarget::Function(f) => {
                        let function = self.function_ref(f);
                        self.out.add_function(w, &function);
                        return;
                    }
                    _ => {}
                }
            }
        } else if proper.as_bytes()[0].is_ascii_uppercase()
            && !matches!(self.target, DocTarget::Class(c) if self.reg.class(c).name == proper)
        {
            if let Some(c) = self.reg.find_class(proper) {
                if Some(c) != scope {
                    let name = self.reg.class(c).name.clone();
                    self.out.add_class(w, &name);
                    return;
                }
            }
        }

        self.out.add_text(w);
    }

    // -- Completeness checks --------------------------------------------------

    fn epilogue(&mut self) {
        let line = self.line;
        match self.target {
            DocTarget::Function(f) => {
                if let Some(base) = self.reg.overridden(f) {
                    let base = self.function_ref(base);
                    self.out.add_text("Reimplements ");
                    self.out.add_function(&format!("{}().", base.name), &base);
                    self.out.end_paragraph();
                }
                if !self.overload_seen {
                    let names = parameter_names(&self.reg.function(f).arguments);
                    for name in names {
                        if !self.validated.contains(&name) {
                            self.report(line, format!("Undocumented argument: {}", name));
                        }
                    }
                }
            }
            DocTarget::Intro(_) => {
                if !self.introduces_seen {
                    self.report(line, "\\chapter must contain \\introduces");
                }
            }
            DocTarget::Class(_) => {}
        }
    }
}

/// `w` without trailing punctuation, keeping at least its first character.
fn word_proper(w: &str) -> &str {
    let t = w.trim_end_matches([',', '.', ':', ')']);
    if t.is_empty() {
        &w[..w.chars().next().map_or(0, char::len_utf8)]
    } else {
        t
    }
}

/// Consumes text up to the next blank line and returns it with whitespace
/// collapsed.
fn read_until_end_of_block(p: &mut Cursor) -> String {
    let start = p.pos();
    let mut end = p.text().len();
    let mut i = start;
    while let Some(b) = p.byte_at(i) {
        if b == b'\n' {
            let mut j = i + 1;
            while p.byte_at(j).is_some_and(|c| matches!(c, b' ' | b'\t' | b'\r')) {
                j += 1;
            }
            if p.byte_at(j) == Some(b'\n') {
                end = i;
                break;
            }
        }
        i += 1;
    }
    let text = simplified(p.slice(start, end));
    p.set_pos(end);
    text
}
