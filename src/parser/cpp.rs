//! Structural scanning of a C++ subset.
//!
//! This is not a C++ parser. It recognizes just enough of the language
//! (qualified identifiers, type specifiers, argument lists, operator names)
//! for the header and source scanners to pick declarations out of the text.
//!
//! The `*_at` helpers take an absolute offset and return the first offset
//! after what they recognized, or the offset they were given when nothing
//! matched. The cursor-level functions consume what they return.

use crate::cursor::{simplified, spaceless, Cursor};

/// Keywords accepted in front of a type name.
const TYPE_MODIFIERS: &[&str] = &[
    "const", "static", "virtual", "unsigned", "signed", "inline", "class", "struct",
];

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Punctuation that may follow the `operator` keyword.
fn is_operator_char(b: u8) -> bool {
    ((b > b' ' && b < b'@') || (b > b'Z' && b < b'a')) && !b.is_ascii_digit()
}

/// Scans a plain identifier (no `::`, templates or whitespace) starting at
/// `j`, after leading whitespace.
pub fn simple_identifier_at(c: &Cursor, j: usize) -> usize {
    let k = c.whitespace_at(j);
    if c.looking_at_at(k, "operator") {
        let end = operator_at(c, k);
        if end > k {
            return end;
        }
    }
    if !c.byte_at(k).is_some_and(is_ident_start) {
        return j;
    }
    let mut end = k + 1;
    while c.byte_at(end).is_some_and(is_ident_char) {
        end += 1;
    }
    end
}

/// Scans anything usable as an identifier in C++: scope qualifiers,
/// destructor names, operator names and one level of template arguments.
pub fn complex_identifier_at(c: &Cursor, j: usize) -> usize {
    let mut k = c.whitespace_at(j);
    if c.looking_at_at(k, "::") {
        k = c.whitespace_at(k + 2);
    }
    let l = simple_identifier_at(c, k);
    if l == k {
        return j;
    }
    let mut end = c.whitespace_at(l);
    while c.looking_at_at(end, "::") {
        let next = if c.looking_at_at(end + 2, "operator") {
            operator_at(c, end + 2)
        } else if c.byte_at(end + 2) == Some(b'~') {
            simple_identifier_at(c, end + 3)
        } else {
            simple_identifier_at(c, end + 2)
        };
        if next <= end + 2 {
            break;
        }
        end = next;
    }
    end = c.whitespace_at(end);
    if c.byte_at(end) == Some(b'<') {
        let inner = complex_identifier_at(c, end + 1);
        if inner > end + 1 && c.byte_at(inner) == Some(b'>') {
            end = inner + 1;
        }
    }
    end
}

/// Scans an operator-function name such as `operator+`, `operator()` or
/// `operator const char *`. The name is only accepted when an argument
/// list follows; the returned offset is that of its `(`.
pub fn operator_at(c: &Cursor, j: usize) -> usize {
    let k = c.whitespace_at(j + "operator".len());
    let mut chars = 0;
    if c.looking_at_at(k, "()") {
        chars = 2;
    } else if c.byte_at(k).is_some_and(is_operator_char) {
        chars = 1;
        if c.byte_at(k + 1).is_some_and(|b| b != b'(' && is_operator_char(b)) {
            chars = 2;
        }
    } else {
        let end = type_at(c, k);
        if end > k {
            chars = end - k;
        }
    }
    if chars > 0 {
        let k = c.whitespace_at(k + chars);
        if c.byte_at(k) == Some(b'(') {
            return k;
        }
    }
    j
}

/// Scans a type specifier: modifier keywords, an identifier, an optional
/// trailing `::member` and an optional `&` or `*`. Trailing whitespace is
/// included in the result.
pub fn type_at(c: &Cursor, j: usize) -> usize {
    let mut k;
    let mut l = j;
    loop {
        k = l;
        l = c.whitespace_at(k);
        while c.byte_at(l).is_some_and(|b| b.is_ascii_lowercase()) {
            l += 1;
        }
        let modifier = c.slice(k, l).trim();
        if !TYPE_MODIFIERS.contains(&modifier) {
            l = k;
        }
        if l <= k {
            break;
        }
    }

    let l = complex_identifier_at(c, k);
    if l == k {
        return j;
    }
    let mut k = c.whitespace_at(l);
    if c.looking_at_at(k, "::") {
        let member = simple_identifier_at(c, k + 2);
        if member == k + 2 {
            return j;
        }
        k = c.whitespace_at(member);
    }
    if matches!(c.byte_at(k), Some(b'&' | b'*')) {
        k = c.whitespace_at(k + 1);
    }
    k
}

/// Consumes a possibly qualified identifier and returns it with all
/// embedded whitespace removed. Returns an empty string and leaves the
/// cursor alone if there is none.
pub fn identifier(c: &mut Cursor) -> String {
    let start = c.pos();
    let end = complex_identifier_at(c, start);
    let r = spaceless(c.slice(start, end));
    c.set_pos(end);
    r
}

/// Consumes a type specifier and returns it cleaned up: whitespace is
/// simplified, leading `class `/`struct ` keywords are dropped, and the
/// space before a trailing `&` or `*` is removed.
pub fn parse_type(c: &mut Cursor) -> String {
    let start = c.pos();
    let end = type_at(c, start);
    let mut r = simplified(c.slice(start, end));
    c.set_pos(end);
    loop {
        if let Some(rest) = r.strip_prefix("class ") {
            r = rest.to_string();
        } else if let Some(rest) = r.strip_prefix("struct ") {
            r = rest.to_string();
        } else {
            break;
        }
    }
    r = r.replace(" class ", " ").replace(" struct ", " ");
    if r.len() >= 2 && (r.ends_with('&') || r.ends_with('*')) {
        let cut = r.len() - 2;
        if r.as_bytes()[cut] == b' ' {
            r.remove(cut);
        }
    }
    r
}

/// Consumes an argument list. The cursor must be on (or whitespace before)
/// the `(`; it is left after the closing `)`.
///
/// Returns `"()"` or `"(type name, type, ...)"`: default values are
/// dropped and a trailing `[]` stays with its argument. On failure an empty
/// string is returned and the cursor is left near the problem.
pub fn argument_list(c: &mut Cursor) -> String {
    let j = c.whitespace_at(c.pos());
    if c.byte_at(j) != Some(b'(') {
        return String::new();
    }
    let mut r = String::from("(");
    c.set_pos(c.whitespace_at(j + 1));
    if c.peek() == Some(b')') {
        c.step();
        return "()".to_string();
    }
    let mut separator = "";
    loop {
        let mut arg = parse_type(c);
        if arg.is_empty() {
            return String::new();
        }
        c.skip_whitespace();
        let end = simple_identifier_at(c, c.pos());
        if end > c.pos() {
            arg.push(' ');
            arg.push_str(&simplified(c.slice(c.pos(), end)));
            c.set_pos(end);
        }
        r.push_str(separator);
        r.push_str(&arg);
        c.skip_whitespace();
        if c.peek() == Some(b'=') {
            while !c.at_end() && !matches!(c.peek(), Some(b',' | b')')) {
                c.step();
            }
            c.skip_whitespace();
        } else if c.looking_at("[]") {
            c.set_pos(c.pos() + 2);
            r.push_str("[]");
            c.skip_whitespace();
        }
        separator = ", ";
        if c.peek() == Some(b',') {
            c.step();
        } else {
            break;
        }
    }
    if c.peek() != Some(b')') {
        return String::new();
    }
    c.step();
    r.push(')');
    r
}

/// Consumes a single word: an identifier, possibly joined to further
/// identifiers by `-`. Returns an empty string if there is none.
pub fn word(c: &mut Cursor) -> String {
    let start = c.pos();
    let mut j = simple_identifier_at(c, start);
    while c.byte_at(j) == Some(b'-') {
        let k = simple_identifier_at(c, j + 1);
        if k <= j + 1 {
            break;
        }
        j = k;
    }
    let r = simplified(c.slice(start, j));
    if !r.is_empty() {
        c.set_pos(j);
    }
    r
}

/// Consumes a value: an optionally negative integer, or an identifier.
pub fn value(c: &mut Cursor) -> String {
    let j = c.whitespace_at(c.pos());
    if c.byte_at(j).is_some_and(|b| b == b'-' || b.is_ascii_digit()) {
        let mut k = j;
        if c.byte_at(k) == Some(b'-') {
            k += 1;
        }
        while c.byte_at(k).is_some_and(|b| b.is_ascii_digit()) {
            k += 1;
        }
        let r = c.slice(j, k).to_string();
        c.set_pos(k);
        return r;
    }
    identifier(c)
}

/// Strips argument names from an argument list produced by
/// [`argument_list`]: `"(int a, const Foo& b)"` becomes
/// `"( int, const Foo& )"`. Applying it to its own output changes nothing.
pub fn types_only(arguments: &str) -> String {
    if arguments == "()" {
        return arguments.to_string();
    }
    let mut c = Cursor::new(arguments);
    c.step();
    let mut r = String::new();
    let mut separator = "( ";
    loop {
        let t = parse_type(&mut c);
        if t.is_empty() {
            break;
        }
        r.push_str(separator);
        r.push_str(&t);
        c.scan_to(",");
        separator = ", ";
    }
    r.push_str(" )");
    r
}

/// Names of the named parameters in an argument list produced by
/// [`argument_list`], in order. Unnamed parameters are skipped.
pub fn parameter_names(arguments: &str) -> Vec<String> {
    let mut names = Vec::new();
    if arguments == "()" {
        return names;
    }
    let mut c = Cursor::new(arguments);
    c.step();
    loop {
        if parse_type(&mut c).is_empty() {
            break;
        }
        let end = simple_identifier_at(&c, c.pos());
        if end > c.pos() {
            names.push(simplified(c.slice(c.pos(), end)));
        }
        if !c.scan_to(",") {
            break;
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(s: &str) -> String {
        argument_list(&mut Cursor::new(s))
    }

    #[test]
    fn identifier_qualified() {
        let mut c = Cursor::new("Foo::bar ( int )");
        assert_eq!(identifier(&mut c), "Foo::bar");
        assert!(c.looking_at("("));
    }

    #[test]
    fn identifier_template_and_destructor() {
        assert_eq!(identifier(&mut Cursor::new("List< Foo >::x")), "List<Foo>");
        assert_eq!(identifier(&mut Cursor::new("Foo::~Foo()")), "Foo::~Foo");
    }

    #[test]
    fn identifier_operators() {
        assert_eq!(identifier(&mut Cursor::new("operator+( int )")), "operator+");
        assert_eq!(identifier(&mut Cursor::new("operator==(x)")), "operator==");
        assert_eq!(identifier(&mut Cursor::new("operator()()")), "operator()");
        assert_eq!(
            identifier(&mut Cursor::new("Foo::operator const char *() const")),
            "Foo::operatorconstchar*"
        );
    }

    #[test]
    fn identifier_nothing_leaves_cursor() {
        let mut c = Cursor::new("(int)");
        assert_eq!(identifier(&mut c), "");
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn type_with_modifiers_and_pointer() {
        assert_eq!(parse_type(&mut Cursor::new("const char * name")), "const char*");
        assert_eq!(parse_type(&mut Cursor::new("static unsigned int x")), "static unsigned int");
        assert_eq!(parse_type(&mut Cursor::new("class Foo & f")), "Foo&");
        assert_eq!(parse_type(&mut Cursor::new("struct stat *st")), "stat*");
    }

    #[test]
    fn type_with_nested_member() {
        assert_eq!(
            parse_type(&mut Cursor::new("List<Foo>::Iterator it")),
            "List<Foo>::Iterator"
        );
    }

    #[test]
    fn type_empty_when_no_identifier() {
        let mut c = Cursor::new(") x");
        assert_eq!(parse_type(&mut c), "");
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn argument_list_forms() {
        assert_eq!(parse_args("()"), "()");
        assert_eq!(parse_args("( )"), "()");
        assert_eq!(parse_args("(int a, const Foo & b)"), "(int a, const Foo& b)");
        assert_eq!(parse_args("(int a = 4, bool b=false)"), "(int a, bool b)");
        assert_eq!(parse_args("(char * argv [])"), "(char* argv[])");
        assert_eq!(parse_args("(int, uint)"), "(int, uint)");
    }

    #[test]
    fn argument_list_failures() {
        assert_eq!(parse_args("(int a"), "");
        assert_eq!(parse_args("(1, 2)"), "");
        assert_eq!(parse_args("int a)"), "");
    }

    #[test]
    fn argument_list_leaves_cursor_after_paren() {
        let mut c = Cursor::new("(int a) const;");
        argument_list(&mut c);
        c.skip_whitespace();
        assert!(c.looking_at("const"));
    }

    #[test]
    fn types_only_strips_names() {
        assert_eq!(types_only("(int a, const Foo& b)"), "( int, const Foo& )");
        assert_eq!(types_only("(char* argv[])"), "( char* )");
        assert_eq!(types_only("()"), "()");
    }

    #[test]
    fn types_only_is_idempotent() {
        for args in [
            "(int a, const Foo& b)",
            "(uint, class Bar * b)",
            "(List<Foo>::Iterator it)",
            "()",
            "(unsigned int n, bool)",
        ] {
            let once = types_only(args);
            assert_eq!(types_only(&once), once, "for {args}");
        }
    }

    #[test]
    fn parameter_names_skip_unnamed() {
        assert_eq!(parameter_names("(int a, bool, char* argv[])"), vec!["a", "argv"]);
        assert!(parameter_names("()").is_empty());
    }

    #[test]
    fn word_and_value() {
        let mut c = Cursor::new(" intro-page rest");
        assert_eq!(word(&mut c), "intro-page");
        let mut c = Cursor::new(" = -12,");
        c.step();
        c.step();
        assert_eq!(value(&mut c), "-12");
        let mut c = Cursor::new("Other,");
        assert_eq!(value(&mut c), "Other");
    }
}
