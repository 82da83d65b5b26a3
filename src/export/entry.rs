//! Generated entry component (`src/App.tsx`).
//!
//! DESIGN
//! ======
//! The module is assembled from a small structured model rather than by
//! pasting strings. Fixed template text is `&'static str`; everything that
//! comes from the request (the instance list, type names) enters only as
//! [`JsExpr::Str`], and the serializer escapes every string literal. A type
//! name therefore cannot close a literal, open a template interpolation, or
//! end the surrounding `<script>`.
//!
//! The import map is static: one `lazy(() => import('./elements/<Type>'))`
//! entry per copied type. Rejected names are listed and logged when the
//! bundle loads. Lookups use an own-property check so inherited names such
//! as `constructor` render the placeholder.

use std::path::Path;

use serde_json::Value;

use super::project::write_file;
use super::{ExportError, ExportReport};

// =============================================================================
// MODULE MODEL
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum JsExpr {
    /// String literal; always escaped on output.
    Str(String),
    /// Trusted identifier or member path from template code.
    Ident(&'static str),
    Array(Vec<JsExpr>),
    /// Object literal with string-literal keys.
    Object(Vec<(String, JsExpr)>),
    Call(Box<JsExpr>, Vec<JsExpr>),
    /// `() => <expr>`
    Thunk(Box<JsExpr>),
    /// `import('<specifier>')`
    Import(String),
}

impl JsExpr {
    fn call(callee: &'static str, args: Vec<JsExpr>) -> Self {
        Self::Call(Box::new(Self::Ident(callee)), args)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Fixed template text emitted verbatim.
    Raw(&'static str),
    Const { name: &'static str, ty: &'static str, value: JsExpr },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub statements: Vec<Statement>,
}

impl Module {
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 && !out.ends_with("\n\n") {
                out.push('\n');
            }
            match statement {
                Statement::Raw(text) => out.push_str(text),
                Statement::Const { name, ty, value } => {
                    out.push_str(&format!("const {name}: {ty} = "));
                    render_expr(value, 0, &mut out);
                    out.push_str(";\n");
                }
            }
        }
        out
    }
}

fn render_expr(expr: &JsExpr, depth: usize, out: &mut String) {
    match expr {
        JsExpr::Str(s) => out.push_str(&string_literal(s)),
        JsExpr::Ident(name) => out.push_str(name),
        JsExpr::Array(items) if items.is_empty() => out.push_str("[]"),
        JsExpr::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_expr(item, depth, out);
            }
            out.push(']');
        }
        JsExpr::Object(entries) if entries.is_empty() => out.push_str("{}"),
        JsExpr::Object(entries) => {
            let indent = "  ".repeat(depth + 1);
            out.push_str("{\n");
            for (key, value) in entries {
                out.push_str(&indent);
                out.push_str(&string_literal(key));
                out.push_str(": ");
                render_expr(value, depth + 1, out);
                out.push_str(",\n");
            }
            out.push_str(&"  ".repeat(depth));
            out.push('}');
        }
        JsExpr::Call(callee, args) => {
            render_expr(callee, depth, out);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_expr(arg, depth, out);
            }
            out.push(')');
        }
        JsExpr::Thunk(body) => {
            out.push_str("() => ");
            render_expr(body, depth, out);
        }
        JsExpr::Import(specifier) => {
            out.push_str("import(");
            out.push_str(&string_literal(specifier));
            out.push(')');
        }
    }
}

/// Single-quoted JS literal for `s`, safe inside a template literal and
/// inside an HTML `<script>`.
#[must_use]
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            '<' if chars.peek() == Some(&'/') => out.push_str("<\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

// =============================================================================
// APP.TSX
// =============================================================================

const PRELUDE: &str = "import React, { Suspense, lazy, CSSProperties } from 'react';

interface ElementInstance {
  id: string | number;
  type: string;
  styles?: CSSProperties;
  jsSettings?: { [key: string]: unknown };
}
";

const REJECTED_LOG: &str = "rejectedTypes.forEach((type) => {
  console.error('Invalid element type for dynamic import: ' + type);
});
";

const RENDER: &str = "const mainContentStyles: CSSProperties = {
  flex: 1,
  overflowY: 'auto',
  padding: '20px',
  margin: '0 auto',
  maxWidth: '1200px',
};

function isElementInstance(value: unknown): value is ElementInstance {
  if (typeof value !== 'object' || value === null) {
    return false;
  }
  const candidate = value as { id?: unknown; type?: unknown };
  return typeof candidate.type === 'string' && candidate.type !== ''
    && ((typeof candidate.id === 'string' && candidate.id !== '') || typeof candidate.id === 'number');
}

function resolveComponent(type: string) {
  return Object.prototype.hasOwnProperty.call(elementComponentMap, type)
    ? elementComponentMap[type]
    : undefined;
}

function App() {
  if (!Array.isArray(elementsData)) {
    console.error('Elements data is not an array:', elementsData);
    return <div>Error: Invalid elements data format.</div>;
  }

  return (
    <main style={mainContentStyles}>
      {elementsData.map((element: unknown, index: number) => {
        if (!isElementInstance(element)) {
          console.error('Invalid element structure:', element);
          return <div key={'invalid-' + index} style={{ color: 'red' }}>Invalid element data</div>;
        }
        const Component = resolveComponent(element.type);
        if (!Component) {
          return (
            <div key={element.id} style={{ color: 'red' }}>
              Error: Component type '{element.type}' not found or not in map.
            </div>
          );
        }
        return (
          <div key={element.id} style={element.styles}>
            <Suspense fallback={<div>Loading {element.type}...</div>}>
              <Component {...(element.jsSettings || {})} />
            </Suspense>
          </div>
        );
      })}
    </main>
  );
}

export default App;
";

/// Build the entry module for `elements`, mapping only `report.copied`.
///
/// # Errors
///
/// Returns `Serialise` if the instance list cannot be rendered as JSON.
pub fn app_module(elements: &[Value], report: &ExportReport) -> Result<Module, ExportError> {
    let data = serde_json::to_string(elements)?;
    let imports = report
        .copied
        .iter()
        .map(|name| {
            let loader = JsExpr::call("lazy", vec![JsExpr::Thunk(Box::new(JsExpr::Import(format!("./elements/{name}"))))]);
            (name.clone(), loader)
        })
        .collect();
    let rejected = report.rejected.iter().cloned().map(JsExpr::Str).collect();

    Ok(Module {
        statements: vec![
            Statement::Raw(PRELUDE),
            Statement::Const {
                name: "elementsData",
                ty: "unknown",
                value: JsExpr::call("JSON.parse", vec![JsExpr::Str(data)]),
            },
            Statement::Const {
                name: "elementComponentMap",
                ty: "Record<string, React.LazyExoticComponent<React.ComponentType<any>>>",
                value: JsExpr::Object(imports),
            },
            Statement::Const { name: "rejectedTypes", ty: "string[]", value: JsExpr::Array(rejected) },
            Statement::Raw(REJECTED_LOG),
            Statement::Raw(RENDER),
        ],
    })
}

/// Render and write `src/App.tsx`.
///
/// # Errors
///
/// Returns `Serialise` or `Write`.
pub fn write_app(project: &Path, elements: &[Value], report: &ExportReport) -> Result<(), ExportError> {
    let source = app_module(elements, report)?.render();
    write_file(&project.join("src").join("App.tsx"), &source)
}

#[cfg(test)]
#[path = "entry_test.rs"]
mod tests;
