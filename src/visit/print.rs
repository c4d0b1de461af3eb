//! Outline printing visitor

use std::fmt::Write;

use crate::model::{Object, ObjectExt};
use crate::nodes::Lod;

use super::traits::Visitor;

/// Writes an indented outline of class names, one object per line
///
/// Objects with a `"name"` string value print it in quotes after the class
/// name. Level-of-detail children print their minimum screen-height ratio.
#[derive(Debug)]
pub struct PrintTree {
    indent: usize,
    depth: usize,
    output: String,
}

impl PrintTree {
    pub fn new() -> Self {
        Self::with_indent(2)
    }

    pub fn with_indent(indent: usize) -> Self {
        Self {
            indent,
            depth: 0,
            output: String::new(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }

    fn write_line(&mut self, object: &dyn Object, suffix: &str) {
        let _ = write!(
            self.output,
            "{:width$}{}",
            "",
            object.class_name(),
            width = self.depth * self.indent
        );
        if let Some(name) = object.get_value::<String>("name") {
            let _ = write!(self.output, " \"{name}\"");
        }
        let _ = writeln!(self.output, "{suffix}");
    }
}

impl Default for PrintTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for PrintTree {
    fn apply_object(&mut self, object: &dyn Object) {
        self.write_line(object, "");
        self.depth += 1;
        object.traverse(self);
        self.depth -= 1;
    }

    fn apply_lod(&mut self, lod: &Lod) {
        self.write_line(lod, "");
        self.depth += 1;
        for child in lod.children() {
            let _ = writeln!(
                self.output,
                "{:width$}>= {}",
                "",
                child.minimum_screen_height_ratio,
                width = self.depth * self.indent
            );
            self.depth += 1;
            child.node.accept(self);
            self.depth -= 1;
        }
        self.depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RefPtr;
    use crate::nodes::{Group, Leaf, Sphere};

    #[test]
    fn test_outline() {
        let mut lod = Lod::new(Sphere::default());
        lod.add_child(0.5, RefPtr::new(Leaf::new()).upcast());

        let named = RefPtr::new(Leaf::new());
        named.set_value("name", "wheel".to_string());

        let mut root = Group::new();
        root.add_child(named.upcast());
        root.add_child(RefPtr::new(lod).upcast());
        let root = RefPtr::new(root);
        root.set_value("name", "car".to_string());

        let mut printer = PrintTree::new();
        root.accept(&mut printer);
        assert_eq!(
            printer.into_output(),
            "Group \"car\"\n  Leaf \"wheel\"\n  Lod\n    >= 0.5\n      Leaf\n"
        );
    }
}
