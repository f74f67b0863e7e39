//! Page generation: introductions first, each followed by the classes it
//! introduces, then every class not yet generated. Undocumented classes and
//! functions are reported along the way.

use crate::docblock;
use crate::model::ClassId;
use crate::registry::Registry;
use crate::render::{Output, Sink};

/// Generates documentation for everything in `reg` into `sink`. The class
/// hierarchy must already be built.
pub fn generate(reg: &mut Registry, sink: &mut dyn Sink) {
    if !reg.hierarchy_built() {
        log::warn!("generating documentation before the class hierarchy is built");
    }
    let mut out = Output::new(sink);

    for intro in reg.intro_ids().collect::<Vec<_>>() {
        if let Some(doc) = reg.intro(intro).doc {
            docblock::generate(reg, &mut out, doc);
        }
        // the introduction's own text names its classes
        for class in reg.intro(intro).classes.clone() {
            generate_class(reg, &mut out, class);
        }
    }

    let classes: Vec<ClassId> = reg.class_ids().collect();
    log::debug!("generating for {} classes", classes.len());
    for class in classes {
        generate_class(reg, &mut out, class);
    }
    out.end_paragraph();
}

/// Generates the page of `class` and its member functions, once.
fn generate_class(reg: &mut Registry, out: &mut Output<'_>, class: ClassId) {
    if reg.class(class).done {
        return;
    }
    reg.class_mut(class).done = true;

    let c = reg.class(class);
    let Some(doc) = c.doc else {
        let location = c
            .origin
            .or_else(|| c.members.first().map(|m| reg.function(*m).origin));
        let message = format!("Undocumented class: {}", c.name);
        reg.report_at(location, message);
        return;
    };
    log::debug!("generating class {}", c.name);
    if c.origin.is_some() {
        docblock::generate(reg, out, doc);
    }

    for member in reg.class(class).members.clone() {
        if let Some(doc) = reg.function(member).doc {
            docblock::generate(reg, out, doc);
        } else if reg.overridden(member).is_none() {
            let f = reg.function(member);
            let message = format!("Undocumented function: {}{}", f.name, f.arguments);
            let origin = f.origin;
            reg.report(origin.file, origin.line, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileKind;
    use crate::parser::{header, source};
    use crate::render::json::{Event, JsonRenderer};
    use crate::render::Headline;

    const HEADER: &str = "
class Base
{
public:
    void run();
    void stop();
};

class Derived: public Base
{
public:
    void run();
};

class Lonely
{
public:
    void alone( int x );
};
";

    fn build(source_text: &str) -> (Registry, JsonRenderer) {
        let mut reg = Registry::new();
        let h = reg.add_file("x.h".into(), FileKind::Header, HEADER.into());
        header::scan(&mut reg, h);
        let s = reg.add_file("x.cpp".into(), FileKind::Source, source_text.into());
        source::scan(&mut reg, s).unwrap();
        reg.build_hierarchy();
        let mut sink = JsonRenderer::default();
        generate(&mut reg, &mut sink);
        (reg, sink)
    }

    fn messages(reg: &Registry) -> Vec<String> {
        reg.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    fn headlines(sink: &JsonRenderer) -> Vec<Headline> {
        sink.events()
            .filter_map(|e| match e {
                Event::Headline(h) => Some(h.clone()),
                _ => None,
            })
            .collect()
    }

    const SOURCE: &str = "#include \"x.h\"

/*! \\class Base x.h
  Runs things.
*/

/*! Starts running. */
void Base::run()
{
}

/*! \\class Derived x.h
  Runs differently.
*/

/*! \\chapter guide
  \\introduces Derived
*/
";

    #[test]
    fn intros_first_then_remaining_classes() {
        let (_, sink) = build(SOURCE);
        let order: Vec<String> = headlines(&sink)
            .into_iter()
            .map(|h| match h {
                Headline::Intro { name } | Headline::Class { name } => name,
                Headline::Function(f) => f.name,
            })
            .collect();
        assert_eq!(order, vec!["guide", "Derived", "Base", "Base::run"]);
    }

    #[test]
    fn completeness_sweep() {
        let (reg, _) = build(SOURCE);
        assert_eq!(
            messages(&reg),
            vec![
                "x.h:6: Undocumented function: Base::stop()",
                "x.h:15: Undocumented class: Lonely",
            ]
        );
    }

    #[test]
    fn every_class_generated_once() {
        let (reg, sink) = build(SOURCE);
        let derived = headlines(&sink)
            .iter()
            .filter(|h| **h == Headline::Class { name: "Derived".into() })
            .count();
        assert_eq!(derived, 1);
        assert!(reg.class_ids().all(|c| reg.class(c).done));
    }

    #[test]
    fn undocumented_placeholder_class_uses_member_location() {
        let mut reg = Registry::new();
        let s = reg.add_file(
            "y.cpp".into(),
            FileKind::Source,
            "/*! Spins. */\nvoid Ghost::spin()\n{\n}\n".into(),
        );
        source::scan(&mut reg, s).unwrap();
        reg.build_hierarchy();
        let mut sink = JsonRenderer::default();
        generate(&mut reg, &mut sink);
        assert_eq!(messages(&reg), vec!["y.cpp:2: Undocumented class: Ghost"]);
        assert_eq!(sink.events().count(), 0);
    }
}
