//! Data model for scanned declarations and their documentation.
//!
//! Entities live in arenas owned by the [`Registry`](crate::registry::Registry)
//! and refer to each other through the copyable handles defined here.

use std::path::PathBuf;
use std::rc::Rc;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);
    };
}

handle!(
    /// Handle to a [`File`].
    FileId
);
handle!(
    /// Handle to a [`Class`].
    ClassId
);
handle!(
    /// Handle to a [`Function`].
    FunctionId
);
handle!(
    /// Handle to an [`Introduction`].
    IntroId
);
handle!(
    /// Handle to a [`DocBlock`].
    DocId
);

/// A position in a scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub file: FileId,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Header,
    Source,
}

/// A header or source file, read once and kept for the whole run.
#[derive(Debug)]
pub struct File {
    pub path: PathBuf,
    /// Display name used in diagnostics.
    pub name: String,
    pub kind: FileKind,
    pub contents: Rc<str>,
}

/// A C++ class.
#[derive(Debug, Default)]
pub struct Class {
    pub name: String,
    /// Where the class body was found in a header. `None` for placeholders.
    pub origin: Option<Location>,
    /// Declared parent name as written, possibly with template arguments.
    pub parent_name: String,
    pub parent: Option<ClassId>,
    /// Direct subclasses, sorted by name.
    pub children: Vec<ClassId>,
    /// Member functions in declaration order.
    pub members: Vec<FunctionId>,
    pub doc: Option<DocId>,
    pub done: bool,
}

/// A member function.
///
/// Identity is the qualified name plus the types-only signature and
/// constness; re-declarations resolve to the same entity.
#[derive(Debug)]
pub struct Function {
    /// Qualified name, `Class::member`.
    pub name: String,
    pub class: ClassId,
    pub return_type: String,
    /// Argument list as written, with parameter names.
    pub arguments: String,
    /// Argument list without parameter names.
    pub signature: String,
    pub is_const: bool,
    pub origin: Location,
    pub doc: Option<DocId>,
    pub overload: bool,
}

impl Function {
    /// The part of the name after the last `::`.
    pub fn member_name(&self) -> &str {
        self.name
            .rfind("::")
            .map(|i| &self.name[i + 2..])
            .unwrap_or(&self.name)
    }

    /// True if `name` is one of the named parameters.
    pub fn has_argument(&self, name: &str) -> bool {
        !name.is_empty()
            && crate::parser::cpp::parameter_names(&self.arguments)
                .iter()
                .any(|p| p == name)
    }
}

/// A chapter: free-form documentation that introduces classes.
#[derive(Debug)]
pub struct Introduction {
    pub name: String,
    /// Introduced classes in the order they were named.
    pub classes: Vec<ClassId>,
    pub doc: Option<DocId>,
}

impl Introduction {
    pub fn add_class(&mut self, class: ClassId) {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
    }
}

/// What a [`DocBlock`] documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocTarget {
    Function(FunctionId),
    Class(ClassId),
    Intro(IntroId),
}

/// The text of one doc comment, bound to the symbol it documents.
#[derive(Debug)]
pub struct DocBlock {
    /// Where the comment opens.
    pub origin: Location,
    /// Line of the first character of `text`.
    pub text_line: usize,
    pub text: String,
    pub target: DocTarget,
}

impl DocBlock {
    /// Comments mentioning `\internal` produce no output.
    pub fn is_internal(&self) -> bool {
        self.text.contains("\\internal")
    }
}
