//! Header scanner: finds class bodies and their member functions.
//!
//! A header is viewed as a sequence of `class Name ... { ... };`
//! statements. Each one contributes a Class with its declared parent and
//! a Function per member that has an argument list. Everything else in the
//! header is ignored.

use super::cpp::{argument_list, identifier, parse_type, value, word};
use crate::cursor::Cursor;
use crate::model::{FileId, Location};
use crate::registry::Registry;
use std::rc::Rc;

/// Scans the header `file`, which must already be in the registry.
pub fn scan(reg: &mut Registry, file: FileId) {
    let text = Rc::clone(&reg.file(file).contents);
    let mut p = Cursor::new(&text);
    if p.looking_at("class ") {
        p.set_pos("class ".len());
    } else {
        p.scan_to("\nclass ");
    }
    while !p.at_end() {
        scan_class(reg, file, &mut p);
        p.scan_to("\nclass ");
    }
}

/// Scans one class statement. The cursor is just after `class `.
fn scan_class(reg: &mut Registry, file: FileId, p: &mut Cursor) {
    let line = p.line();
    let class_name = identifier(p);
    if class_name.is_empty() {
        return;
    }
    let mut superclass = String::new();
    p.skip_whitespace();
    if p.looking_at(":") {
        p.step();
        let inheritance = word(p);
        if inheritance != "public" {
            let line = p.line();
            reg.report(file, line, format!("Non-public inheritance for class {}", class_name));
            return;
        }
        let parent = identifier(p);
        if parent.is_empty() {
            let line = p.line();
            reg.report(
                file,
                line,
                format!("Cannot parse superclass name for class {}", class_name),
            );
            return;
        }
        p.skip_whitespace();
        if p.looking_at(",") {
            let line = p.line();
            reg.report(
                file,
                line,
                format!("Skipping multiple inheritance on class {}", class_name),
            );
            return;
        }
        superclass = parent;
    }

    p.skip_whitespace();
    if !p.looking_at("{") {
        // forward declaration
        return;
    }

    let class = reg.class_or_placeholder(&class_name);
    reg.class_mut(class).parent_name = superclass;
    match reg.class(class).origin {
        Some(other) if other.file != file => {
            let here = reg.file(file).name.clone();
            let there = reg.file(other.file).name.clone();
            reg.report(
                file,
                line,
                format!("Class {0} conflicts with {0} at {1}:{2}", class_name, there, other.line),
            );
            reg.report(
                other.file,
                other.line,
                format!("Class {0} conflicts with {0} at {1}:{2}", class_name, here, line),
            );
        }
        Some(_) => {}
        None => reg.class_mut(class).origin = Some(Location { file, line }),
    }

    p.step();
    let mut members = 0;
    while scan_member(reg, file, p, &class_name) {
        members += 1;
    }
    log::debug!("class {}: {} members scanned", class_name, members);
}

/// Scans one member declaration and whatever follows it (a body or a `;`).
/// Returns false at the first construct it does not recognize.
fn scan_member(reg: &mut Registry, file: FileId, p: &mut Cursor, class_name: &str) -> bool {
    p.skip_whitespace();
    while p.looking_at("public:") || p.looking_at("private:") || p.looking_at("protected:") {
        p.scan_to(":");
        p.skip_whitespace();
    }
    if p.looking_at("virtual ") {
        p.scan_to(" ");
    }
    p.skip_whitespace();

    let line = p.line();
    let mut ok = false;
    let mut return_type = String::new();
    let mut name = String::new();

    if p.looking_at("operator ") {
        name = identifier(p);
    } else if p.looking_at("enum ") {
        p.scan_to(" ");
        let enum_name = word(p);
        p.skip_whitespace();
        if p.looking_at("{") {
            ok = scan_enum(reg, file, p, class_name, &enum_name);
        } else if p.looking_at(";") {
            ok = true;
        } else {
            reg.report(file, line, format!("Cannot parse enum {}::{}", class_name, enum_name));
        }
    } else if p.looking_at("typedef ") {
        ok = true;
    } else {
        return_type = parse_type(p);
        name = identifier(p);
        if name.is_empty() {
            // constructor or destructor
            if return_type == class_name || return_type == format!("~{}", class_name) {
                name = std::mem::take(&mut return_type);
            } else if return_type.is_empty() && p.looking_at("~") {
                p.step();
                name = format!("~{}", identifier(p));
            }
        }
    }

    if !name.is_empty() {
        p.skip_whitespace();
        if p.looking_at(";") {
            ok = true;
        }
        let arguments = argument_list(p);
        p.skip_whitespace();
        let mut is_const = false;
        if p.looking_at("const") {
            is_const = true;
            word(p);
        }
        if !name.contains(':') && !arguments.is_empty() {
            let qualified = format!("{}::{}", class_name, name);
            reg.declare_function(&return_type, &qualified, &arguments, is_const, Location { file, line });
            ok = true;
        }
    }

    if ok {
        p.skip_whitespace();
        if p.looking_at("{") {
            skip_block(p);
            if p.looking_at(";") {
                p.step();
            }
        } else {
            p.scan_to(";");
        }
    }
    ok
}

/// Scans an enum body; the cursor is on its `{`. Values are collected for
/// the log and otherwise discarded.
fn scan_enum(
    reg: &mut Registry,
    file: FileId,
    p: &mut Cursor,
    class_name: &str,
    enum_name: &str,
) -> bool {
    let mut values = Vec::new();
    loop {
        p.step();
        p.skip_whitespace();
        let v = word(p);
        if v.is_empty() {
            if !p.looking_at("}") {
                let line = p.line();
                reg.report(file, line, "Could not parse enum value");
            }
        } else {
            values.push(v);
        }
        p.skip_whitespace();
        if p.looking_at("=") {
            p.step();
            p.skip_whitespace();
            value(p);
            p.skip_whitespace();
        }
        if !p.looking_at(",") {
            break;
        }
    }
    log::debug!("enum {}::{}: {}", class_name, enum_name, values.join(", "));
    if p.looking_at("}") {
        p.step();
        true
    } else {
        let line = p.line();
        reg.report(
            file,
            line,
            format!("Enum definition for {}::{} does not end with '}}'", class_name, enum_name),
        );
        false
    }
}

/// Skips a balanced `{ ... }` block.
fn skip_block(p: &mut Cursor) {
    let mut level = 0usize;
    while !p.at_end() && (level > 0 || p.looking_at("{")) {
        if p.looking_at("{") {
            level += 1;
        } else if p.looking_at("}") {
            level -= 1;
        }
        p.step();
        p.skip_whitespace();
    }
}
