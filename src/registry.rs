//! Symbol registry: every file, class, function, introduction and doc
//! block seen during a run, plus the singleton table and diagnostics.
//!
//! Lookups are exact, case-sensitive name matches. Classes are created
//! lazily as placeholders the first time any consumer mentions them.

use crate::diagnostic::Diagnostics;
use crate::model::*;
use crate::parser::cpp::types_only;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Registry {
    files: Vec<File>,
    classes: Vec<Class>,
    functions: Vec<Function>,
    intros: Vec<Introduction>,
    docs: Vec<DocBlock>,
    singletons: HashMap<String, Location>,
    hierarchy_built: bool,
    pub diagnostics: Diagnostics,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Files ----------------------------------------------------------------

    pub fn add_file(&mut self, path: PathBuf, kind: FileKind, contents: String) -> FileId {
        let id = FileId(self.files.len());
        self.files.push(File {
            name: path.to_string_lossy().into_owned(),
            path,
            kind,
            contents: Rc::from(contents),
        });
        id
    }

    pub fn file(&self, id: FileId) -> &File {
        &self.files[id.0]
    }

    /// Finds a scanned header whose path is `name` or ends in `/name`.
    pub fn find_header(&self, name: &str) -> Option<FileId> {
        let suffix = format!("/{}", name);
        self.files
            .iter()
            .position(|f| f.kind == FileKind::Header && (f.name == name || f.name.ends_with(&suffix)))
            .map(FileId)
    }

    // -- Diagnostics ----------------------------------------------------------

    /// Reports `message` at `file:line`.
    pub fn report(&mut self, file: FileId, line: usize, message: impl Into<String>) {
        let name = self.files[file.0].name.clone();
        self.diagnostics.push(name, line, message);
    }

    /// Reports at `location`, or drops the message for symbols that never
    /// gained a location.
    pub fn report_at(&mut self, location: Option<Location>, message: impl Into<String>) {
        if let Some(loc) = location {
            self.report(loc.file, loc.line, message);
        }
    }

    // -- Classes --------------------------------------------------------------

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.0]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.0]
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.classes.len()).map(ClassId)
    }

    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.classes.iter().position(|c| c.name == name).map(ClassId)
    }

    /// Finds the class named `name`, creating a placeholder without a
    /// location if there is none yet.
    pub fn class_or_placeholder(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.find_class(name) {
            return id;
        }
        let id = ClassId(self.classes.len());
        self.classes.push(Class {
            name: name.to_string(),
            ..Default::default()
        });
        id
    }

    /// Ancestors of `class`, nearest first. Only meaningful after
    /// [`build_hierarchy`](Self::build_hierarchy).
    pub fn ancestors(&self, class: ClassId) -> Vec<ClassId> {
        let mut out = Vec::new();
        let mut current = self.class(class).parent;
        while let Some(p) = current {
            if p == class || out.contains(&p) {
                break;
            }
            out.push(p);
            current = self.class(p).parent;
        }
        out
    }

    /// Links every class to its declared parent. Must run once, after all
    /// files are scanned and before any documentation is generated.
    pub fn build_hierarchy(&mut self) {
        if self.hierarchy_built {
            log::warn!("class hierarchy already built");
            return;
        }
        self.hierarchy_built = true;

        let mut linked = 0;
        for id in self.class_ids().collect::<Vec<_>>() {
            let declared = self.class(id).parent_name.clone();
            let base = declared.split('<').next().unwrap_or("").trim();
            if base.is_empty() {
                continue;
            }
            match self.find_class(base) {
                Some(parent) => {
                    self.classes[id.0].parent = Some(parent);
                    self.insert_child(parent, id);
                    linked += 1;
                }
                None => {
                    let class = self.class(id);
                    let message = format!(
                        "Class {} inherits undocumented class {}",
                        class.name, declared
                    );
                    let origin = class.origin;
                    self.report_at(origin, message);
                }
            }
        }
        log::debug!("hierarchy: {} classes, {} parent links", self.classes.len(), linked);
    }

    pub fn hierarchy_built(&self) -> bool {
        self.hierarchy_built
    }

    fn insert_child(&mut self, parent: ClassId, child: ClassId) {
        let name = self.classes[child.0].name.clone();
        let pos = {
            let classes = &self.classes;
            classes[parent.0]
                .children
                .iter()
                .position(|c| classes[c.0].name > name)
        };
        let children = &mut self.classes[parent.0].children;
        if children.contains(&child) {
            return;
        }
        match pos {
            Some(i) => children.insert(i, child),
            None => children.push(child),
        }
    }

    // -- Functions ------------------------------------------------------------

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.0]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id.0]
    }

    /// Finds the function with qualified `name`. With `arguments`, the
    /// types-only signature and constness must match as well; without, the
    /// first function of that name is returned.
    pub fn find_function(
        &self,
        name: &str,
        arguments: Option<&str>,
        is_const: bool,
    ) -> Option<FunctionId> {
        let signature = arguments.map(types_only);
        self.functions
            .iter()
            .position(|f| {
                f.name == name
                    && signature
                        .as_ref()
                        .map_or(true, |s| f.signature == *s && f.is_const == is_const)
            })
            .map(FunctionId)
    }

    /// Creates a member function and files it under its class, creating a
    /// placeholder class if needed. Returns `None` if `name` is not
    /// qualified.
    pub fn new_function(
        &mut self,
        return_type: &str,
        name: &str,
        arguments: &str,
        is_const: bool,
        origin: Location,
    ) -> Option<FunctionId> {
        let split = name.rfind("::")?;
        if split == 0 {
            return None;
        }
        let class = self.class_or_placeholder(&name[..split]);
        let id = FunctionId(self.functions.len());
        self.functions.push(Function {
            name: name.to_string(),
            class,
            return_type: return_type.to_string(),
            arguments: arguments.to_string(),
            signature: types_only(arguments),
            is_const,
            origin,
            doc: None,
            overload: false,
        });
        self.classes[class.0].members.push(id);
        Some(id)
    }

    /// Finds the function matching name, signature and constness, or
    /// creates it. An existing function takes over `arguments`, so its
    /// parameter names follow the latest declaration, and keeps its
    /// return type unless it had none.
    pub fn declare_function(
        &mut self,
        return_type: &str,
        name: &str,
        arguments: &str,
        is_const: bool,
        origin: Location,
    ) -> Option<FunctionId> {
        match self.find_function(name, Some(arguments), is_const) {
            Some(id) => {
                let f = &mut self.functions[id.0];
                f.arguments = arguments.to_string();
                if f.return_type.is_empty() {
                    f.return_type = return_type.to_string();
                }
                Some(id)
            }
            None => self.new_function(return_type, name, arguments, is_const, origin),
        }
    }

    /// The function in an ancestor class that `id` reimplements: same
    /// member name, signature and constness.
    pub fn overridden(&self, id: FunctionId) -> Option<FunctionId> {
        let f = self.function(id);
        let member = f.member_name();
        self.ancestors(f.class).into_iter().find_map(|ancestor| {
            self.class(ancestor).members.iter().copied().find(|m| {
                let g = self.function(*m);
                g.member_name() == member && g.signature == f.signature && g.is_const == f.is_const
            })
        })
    }

    // -- Introductions --------------------------------------------------------

    pub fn intro(&self, id: IntroId) -> &Introduction {
        &self.intros[id.0]
    }

    pub fn intro_mut(&mut self, id: IntroId) -> &mut Introduction {
        &mut self.intros[id.0]
    }

    pub fn intro_ids(&self) -> impl Iterator<Item = IntroId> {
        (0..self.intros.len()).map(IntroId)
    }

    pub fn new_intro(&mut self, name: &str) -> IntroId {
        log::debug!("new introduction: {}", name);
        let id = IntroId(self.intros.len());
        self.intros.push(Introduction {
            name: name.to_string(),
            classes: Vec::new(),
            doc: None,
        });
        id
    }

    // -- Doc blocks -----------------------------------------------------------

    pub fn doc(&self, id: DocId) -> &DocBlock {
        &self.docs[id.0]
    }

    /// Binds `text`, which starts on `text_line`, to `target` and points
    /// the target back at it.
    pub fn attach_doc(
        &mut self,
        origin: Location,
        text_line: usize,
        text: &str,
        target: DocTarget,
    ) -> DocId {
        let id = DocId(self.docs.len());
        self.docs.push(DocBlock {
            origin,
            text_line,
            text: text.to_string(),
            target,
        });
        match target {
            DocTarget::Function(f) => self.functions[f.0].doc = Some(id),
            DocTarget::Class(c) => self.classes[c.0].doc = Some(id),
            DocTarget::Intro(i) => self.intros[i.0].doc = Some(id),
        }
        id
    }

    // -- Singletons -----------------------------------------------------------

    /// Records that `name` was mentioned at `location`. A name may be
    /// registered once; a second mention is reported at both sites.
    pub fn singleton(&mut self, name: &str, location: Location) {
        match self.singletons.get(name).copied() {
            Some(first) => {
                let here = self.file(location.file).name.clone();
                let there = self.file(first.file).name.clone();
                self.report(
                    location.file,
                    location.line,
                    format!("{} also mentioned at {} line {}", name, there, first.line),
                );
                self.report(
                    first.file,
                    first.line,
                    format!("{} also mentioned at {} line {}", name, here, location.line),
                );
            }
            None => {
                self.singletons.insert(name.to_string(), location);
            }
        }
    }
}
