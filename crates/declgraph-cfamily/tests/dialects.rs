//! End-to-end extraction tests per dialect.
//!
//! Each test runs real source through the adapter, builds per-file tables,
//! merges them and resolves relationships, then checks the resulting graph.
//!
//! # Organization
//!
//! - `cpp`: namespaces, access sections, out-of-line definitions
//! - `csharp`: file-scoped namespaces, interfaces, override modifiers
//! - `java`: packages, extends/implements, `@Override`

use declgraph_cfamily::{CFamilyAdapter, Dialect};
use declgraph_core::adapter::LanguageAdapter;
use declgraph_core::builder::build_file;
use declgraph_core::diagnostics::{Diagnostic, DiagnosticKind};
use declgraph_core::graph::SymbolGraph;
use declgraph_core::resolver::resolve;
use declgraph_core::span::FileId;
use declgraph_core::symbols::{SymbolKind, Visibility};
use declgraph_core::table::SymbolTable;

fn index(files: &[(&str, &str)]) -> SymbolGraph {
    let adapter = CFamilyAdapter::new(Dialect::Cpp);
    let mut table = SymbolTable::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    for (name, src) in files {
        let file = FileId::new(*name);
        let extraction = adapter.extract(&file, src);
        let built = build_file(&file, &extraction.events);
        diagnostics.extend(extraction.diagnostics);
        diagnostics.extend(built.diagnostics);
        table.merge(built.table);
    }
    table.canonicalize();
    diagnostics.extend(resolve(&mut table));
    SymbolGraph::new(table, Vec::new(), diagnostics)
}

fn names(symbols: &[&declgraph_core::symbols::Symbol]) -> Vec<String> {
    symbols.iter().map(|s| s.name.to_string()).collect()
}

// ============================================================================
// C++
// ============================================================================

mod cpp {
    use super::*;

    const SHAPES: &str = r#"
namespace graphics {
class Shape {
public:
    virtual double area() const = 0;
    virtual void draw() const = 0;
};

class Circle : public Shape {
public:
    Circle(double r) : radius(r) {}
    double area() const override { return 3.14159 * radius * radius; }
    void draw() const override {}
private:
    double radius;
};
}
"#;

    #[test]
    fn shape_and_circle_graph() {
        let graph = index(&[("shapes.hpp", SHAPES)]);

        let shape = graph.lookup("graphics.Shape").unwrap();
        assert!(shape.as_type().unwrap().is_abstract);

        let circle = graph.lookup("graphics::Circle").unwrap();
        assert_eq!(names(&graph.bases_of(circle.id)), vec!["graphics.Shape"]);

        assert_eq!(
            names(&graph.override_chain("graphics.Circle.area")),
            vec!["graphics.Circle.area", "graphics.Shape.area"]
        );
        assert_eq!(names(&graph.implementors("graphics.Shape")), vec!["graphics.Circle"]);

        let ctor = graph
            .lookup_kind("graphics.Circle.Circle", SymbolKind::Constructor)
            .unwrap();
        assert_eq!(ctor.signatures()[0].params, "double r");

        let radius = graph.lookup("graphics.Circle.radius").unwrap();
        assert_eq!(radius.visibility, Visibility::Private);
        assert_eq!(radius.as_field().unwrap().type_text, "double");

        assert_eq!(
            names(&graph.children("graphics.Circle")),
            vec![
                "graphics.Circle.Circle",
                "graphics.Circle.area",
                "graphics.Circle.draw",
                "graphics.Circle.radius",
            ]
        );
        assert!(graph.diagnostics().is_empty());
    }

    #[test]
    fn find_by_parameter_types() {
        let graph = index(&[("shapes.hpp", SHAPES)]);
        assert_eq!(
            names(&graph.find("Circle(double)").unwrap()),
            vec!["graphics.Circle.Circle"]
        );
        assert_eq!(
            names(&graph.find("area()").unwrap()),
            vec!["graphics.Circle.area", "graphics.Shape.area"]
        );
        assert!(graph.find("Circle(int)").unwrap().is_empty());
    }

    #[test]
    fn out_of_line_definition_merges_with_declaration() {
        let header = "namespace graphics {\nclass Circle {\npublic:\n    double area() const;\n};\n}\n";
        let source = "#include \"circle.hpp\"\nnamespace graphics {\ndouble Circle::area() const { return 0.0; }\n}\n";
        let graph = index(&[("circle.hpp", header), ("circle.cpp", source)]);

        let area = graph.lookup("graphics.Circle.area").unwrap();
        assert_eq!(area.spans.len(), 2);
        assert_eq!(area.spans[1].file.as_str(), "circle.cpp");
        assert_eq!(area.visibility, Visibility::Public);

        let namespace = graph.lookup("graphics").unwrap();
        assert_eq!(namespace.kind(), SymbolKind::Namespace);
        assert_eq!(namespace.spans.len(), 2);
    }

    #[test]
    fn braces_in_comments_and_strings_are_ignored() {
        let src = "namespace a {\n// }\n/* { */\nconst char* s = \"}\";\nclass B {};\n}\n";
        let graph = index(&[("a.cpp", src)]);
        assert!(graph.lookup("a.B").is_some());
        assert_eq!(names(&graph.children("a")), vec!["a.B", "a.s"]);
        assert!(graph.diagnostics().is_empty());
    }

    #[test]
    fn unresolved_base_is_kept_and_reported() {
        let graph = index(&[("w.cpp", "class Widget : public QObject {};")]);
        let widget = graph.lookup("Widget").unwrap();
        let base = &widget.as_type().unwrap().bases[0];
        assert_eq!(base.written, "QObject");
        assert!(base.link.and_then(|l| l.resolved()).is_none());
        assert_eq!(graph.diagnostics().len(), 1);
        assert_eq!(graph.diagnostics()[0].kind, DiagnosticKind::UnresolvedBase);
    }
}

// ============================================================================
// C#
// ============================================================================

mod csharp {
    use super::*;

    #[test]
    fn file_scoped_namespace_and_overrides() {
        let src = r#"
namespace Shapes.Core;

public abstract class Shape
{
    public abstract double Area();
    public virtual void Draw() { }
}

public sealed class Circle : Shape, IDisposable
{
    private readonly double radius;
    public Circle(double r) { radius = r; }
    public override double Area() => Math.PI * radius * radius;
    public void Dispose() { }
}
"#;
        let graph = index(&[("Shapes.cs", src)]);

        let namespace = graph.lookup("Shapes.Core").unwrap();
        assert_eq!(namespace.kind(), SymbolKind::Namespace);
        assert_eq!(names(&graph.children("Shapes")), vec!["Shapes.Core"]);

        assert_eq!(
            names(&graph.override_chain("Shapes.Core.Circle.Area")),
            vec!["Shapes.Core.Circle.Area", "Shapes.Core.Shape.Area"]
        );
        assert_eq!(
            names(&graph.implementors("Shapes.Core.Shape")),
            vec!["Shapes.Core.Circle"]
        );

        // IDisposable is external.
        let kinds: Vec<DiagnosticKind> = graph.diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::UnresolvedBase]);

        let circle = graph.lookup("Shapes.Core.Circle").unwrap();
        assert_eq!(circle.visibility, Visibility::Public);
    }

    #[test]
    fn interface_members_are_implemented() {
        let src = r#"
namespace Zoo
{
    public interface IAnimal
    {
        string Speak();
    }

    public class Dog : IAnimal
    {
        public string Speak() { return "woof"; }
    }
}
"#;
        let graph = index(&[("Zoo.cs", src)]);
        let speak = graph.lookup("Zoo.IAnimal.Speak").unwrap();
        assert!(speak.as_method().unwrap().flags.is_abstract);
        assert_eq!(names(&graph.implementors("Zoo.IAnimal")), vec!["Zoo.Dog"]);
    }
}

// ============================================================================
// Java
// ============================================================================

mod java {
    use super::*;

    #[test]
    fn package_spans_files() {
        let shape = r#"
package com.example.shapes;

public abstract class Shape {
    public abstract double area();
}
"#;
        let drawable = r#"
package com.example.shapes;

public interface Drawable {
    void draw();
}
"#;
        let circle = r#"
package com.example.shapes;

import java.util.Objects;

public class Circle extends Shape implements Drawable {
    private final double radius;

    public Circle(double radius) {
        this.radius = radius;
    }

    @Override
    public double area() {
        return Math.PI * radius * radius;
    }

    @Override
    public void draw() {}

    private void helper() {}
}
"#;
        let graph = index(&[
            ("Shape.java", shape),
            ("Drawable.java", drawable),
            ("Circle.java", circle),
        ]);

        let circle = graph.lookup("com.example.shapes.Circle").unwrap();
        assert_eq!(
            names(&graph.bases_of(circle.id)),
            vec!["com.example.shapes.Shape", "com.example.shapes.Drawable"]
        );
        assert_eq!(
            names(&graph.implementors("com.example.shapes.Drawable")),
            vec!["com.example.shapes.Circle"]
        );
        assert_eq!(
            names(&graph.implementors("com.example.shapes.Shape")),
            vec!["com.example.shapes.Circle"]
        );
        assert_eq!(
            names(&graph.override_chain("com.example.shapes.Circle.helper")),
            vec!["com.example.shapes.Circle.helper"]
        );
        assert!(graph.diagnostics().is_empty());
    }
}
