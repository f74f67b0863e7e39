//! Source scanner: finds doc comments and binds each one to the symbol it
//! documents.
//!
//! A doc comment opens with `/*!` and closes with `*/`. Its first word may
//! be a directive naming the symbol (`\fn`, `\class`, `\chapter`) or
//! suppressing it (`\nodoc`); otherwise the comment documents the function
//! definition that follows it.

use super::cpp::{argument_list, identifier, parse_type, word};
use crate::cursor::Cursor;
use crate::model::{DocTarget, FileId, Location};
use crate::registry::Registry;
use anyhow::Result;
use std::path::Path;
use std::rc::Rc;

/// Opens a doc comment.
pub const DOC_OPEN: &str = "/*!";
/// Closes any comment.
pub const DOC_CLOSE: &str = "*/";

/// What the leading directive of a comment resolved to.
enum Binding {
    Target(DocTarget),
    Suppressed,
    Unbound,
}

/// Scans the source `file`, which must already be in the registry. Headers
/// named by `\class` comments are scanned on demand.
pub fn scan(reg: &mut Registry, file: FileId) -> Result<()> {
    let text = Rc::clone(&reg.file(file).contents);
    let mut p = Cursor::new(&text);
    let mut any = false;

    p.scan_to(DOC_OPEN);
    while !p.at_end() {
        any = true;
        p.skip_whitespace();
        let line = p.line();
        let origin = Location { file, line };

        let (binding, (text_line, text)) = if p.looking_at("\\fn ") {
            p.scan_to(" ");
            let binding = function(reg, file, &mut p);
            (binding, body(&mut p))
        } else if p.looking_at("\\chapter ") {
            p.scan_to(" ");
            let name = word(&mut p);
            if name.is_empty() {
                let line = p.line();
                reg.report(file, line, "\\chapter must be followed by name");
            }
            let intro = reg.new_intro(&name);
            (Binding::Target(DocTarget::Intro(intro)), body(&mut p))
        } else if p.looking_at("\\class ") {
            p.scan_to(" ");
            let binding = class(reg, file, line, &mut p)?;
            (binding, body(&mut p))
        } else if p.looking_at("\\nodoc") {
            (Binding::Suppressed, (line, ""))
        } else {
            let text = body(&mut p);
            (function(reg, file, &mut p), text)
        };

        match binding {
            Binding::Suppressed => {}
            _ if text.is_empty() => {
                reg.report(file, line, "Comment contains no documentation");
            }
            Binding::Target(target) => {
                reg.attach_doc(origin, text_line, text, target);
            }
            Binding::Unbound => {}
        }

        p.scan_to(DOC_OPEN);
    }

    if !any {
        let mut p = Cursor::new(&text);
        if p.scan_to("::") {
            let line = p.line();
            reg.report(file, line, "File contains no documentation");
        }
    }
    Ok(())
}

/// Consumes the comment text up to its end. Returns the text without
/// leading whitespace, and the line it starts on.
fn body<'a>(p: &mut Cursor<'a>) -> (usize, &'a str) {
    let line = p.line();
    (line, p.text_until(DOC_CLOSE).trim_start())
}

/// Parses a function signature at the cursor and finds or creates the
/// function. Reports an error if the signature cannot be parsed.
fn function(reg: &mut Registry, file: FileId, p: &mut Cursor) -> Binding {
    let mut return_type = parse_type(p);
    let line = p.line();
    let mut name = identifier(p);
    if name.is_empty() && p.looking_at("(") && return_type.find(':').is_some_and(|i| i > 0) {
        // constructors and destructors parse as a bare type
        name = std::mem::take(&mut return_type);
    }
    let arguments = argument_list(p);
    p.skip_whitespace();
    let mut is_const = false;
    if p.looking_at("const") {
        word(p);
        is_const = true;
    }

    let qualified = name.find(':').is_some_and(|i| i > 0);
    if qualified && !arguments.is_empty() {
        let origin = Location { file, line };
        if let Some(f) = reg.declare_function(&return_type, &name, &arguments, is_const, origin) {
            return Binding::Target(DocTarget::Function(f));
        }
    }
    reg.report(file, line, "Unable to parse function name");
    Binding::Unbound
}

/// Handles `\class Name header.h`: finds or creates the class, checks that
/// this file includes the header, and scans the header if that has not
/// happened yet.
fn class(reg: &mut Registry, file: FileId, line: usize, p: &mut Cursor) -> Result<Binding> {
    let class_name = identifier(p);
    if class_name.is_empty() {
        reg.report(file, line, "\\class must be followed by a class name");
    }
    let class = reg.class_or_placeholder(&class_name);

    p.skip_whitespace();
    let mut header = word(p);
    while p.looking_at(".") || p.looking_at("/") {
        let separator = if p.looking_at(".") { "." } else { "/" };
        p.step();
        header.push_str(separator);
        header.push_str(&word(p));
    }

    if header.len() < 2 || !header.ends_with(".h") {
        reg.report(file, line, "Missing header file name");
        return Ok(Binding::Target(DocTarget::Class(class)));
    }

    let contents = Rc::clone(&reg.file(file).contents);
    if !contents.contains(&format!("#include \"{}\"", header))
        && !contents.contains(&format!("#include <{}>", header))
    {
        reg.report(file, line, format!("File does not include {}", header));
    }

    if reg.find_header(&header).is_none() {
        let path = reg
            .file(file)
            .path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&header);
        if super::scan_header_file(reg, &path)?.is_none() {
            reg.report(
                file,
                line,
                format!(
                    "Cannot find header file {} (for class {})",
                    path.display(),
                    class_name
                ),
            );
        }
    }

    if reg.class(class).members.is_empty() {
        reg.report(
            file,
            line,
            format!("Cannot find any {} members in {}", class_name, header),
        );
    }
    Ok(Binding::Target(DocTarget::Class(class)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileKind;

    fn scan_text(text: &str) -> Registry {
        let mut reg = Registry::new();
        let f = reg.add_file("test.cpp".into(), FileKind::Source, text.to_string());
        scan(&mut reg, f).unwrap();
        reg
    }

    fn messages(reg: &Registry) -> Vec<String> {
        reg.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn fn_directive_binds_function() {
        let reg = scan_text("/*! \\fn int Foo::bar() const\n  Returns something. */\n");
        let f = reg.find_function("Foo::bar", Some("()"), true).unwrap();
        let doc = reg.doc(reg.function(f).doc.unwrap());
        assert_eq!(doc.text.trim(), "Returns something.");
        assert_eq!(doc.origin.line, 1);
        assert!(reg.diagnostics.is_empty());
    }

    #[test]
    fn undirected_comment_binds_following_definition() {
        let text = "\n/*! Sets the width to \\a w. */\n\nvoid Widget::setWidth( int w )\n{\n}\n";
        let reg = scan_text(text);
        let f = reg.find_function("Widget::setWidth", None, false).unwrap();
        assert_eq!(reg.function(f).arguments, "(int w)");
        assert_eq!(reg.function(f).origin.line, 4);
        let doc = reg.doc(reg.function(f).doc.unwrap());
        assert_eq!(doc.origin.line, 2);
        assert!(reg.diagnostics.is_empty());
    }

    #[test]
    fn constructor_definition_recognized() {
        let reg = scan_text("/*! Constructs an empty Widget. */\nWidget::Widget()\n    : w( 0 )\n{\n}\n");
        assert!(reg.find_function("Widget::Widget", Some("()"), false).is_some());
    }

    #[test]
    fn chapter_creates_introduction() {
        let reg = scan_text("/*! \\chapter networking\n\n  \\introduces Socket\n*/\n");
        let intro = reg.intro_ids().next().unwrap();
        assert_eq!(reg.intro(intro).name, "networking");
        assert!(reg.intro(intro).doc.is_some());
    }

    #[test]
    fn empty_comment_reported() {
        let reg = scan_text("/*! \\fn void Foo::f() */\n");
        assert_eq!(messages(&reg), vec!["test.cpp:1: Comment contains no documentation"]);
    }

    #[test]
    fn nodoc_is_silent() {
        let reg = scan_text("/*! \\nodoc */\nint main() {}\n");
        assert!(reg.diagnostics.is_empty());
    }

    #[test]
    fn unparsable_function_reported() {
        let reg = scan_text("/*! Something. */\nstatic int x = 4;\n");
        assert_eq!(messages(&reg), vec!["test.cpp:2: Unable to parse function name"]);
    }

    #[test]
    fn no_comments_but_cpp_content() {
        let reg = scan_text("#include <x.h>\n\nint\nFoo::bar()\n{\n}\n");
        assert_eq!(messages(&reg), vec!["test.cpp:4: File contains no documentation"]);
    }

    #[test]
    fn no_comments_no_cpp_content() {
        let reg = scan_text("int main() { return 0; }\n");
        assert!(reg.diagnostics.is_empty());
    }

    #[test]
    fn class_directive_missing_header_name() {
        let reg = scan_text("/*! \\class Foo\n  A foo. */\n");
        assert!(messages(&reg).contains(&"test.cpp:1: Missing header file name".to_string()));
    }
}
