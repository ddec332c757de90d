use crate::error::{AnalysisError, Result};
use crate::language::Language;
use crate::registry::LanguageAnalyzer;
use crate::types::{ClassSummary, Fidelity, FileStructure, FunctionSummary, Parameter};
use std::sync::Arc;
use tree_sitter::{Node, Parser};

/// Syntax-tree analyzer for Python sources
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonAnalyzer;

impl LanguageAnalyzer for PythonAnalyzer {
    fn language(&self) -> Language {
        Language::Python
    }

    fn analyze(&self, content: &str) -> Result<FileStructure> {
        let ts_language = Language::Python.tree_sitter_language()?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| AnalysisError::tree_sitter(format!("Failed to set language: {e}")))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| AnalysisError::parse("Failed to parse source code"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(first_syntax_error(root));
        }
        if let Some(node) = first_legacy_statement(root) {
            let pos = node.start_position();
            return Err(AnalysisError::syntax_at(pos.row, pos.column));
        }

        let mut walker = OutlineBuilder::new(content);
        walker.walk(root);
        Ok(walker.finish())
    }
}

/// Class being assembled; methods are attached by index while walking
struct ClassShell {
    name: String,
    bases: Vec<String>,
    line_number: usize,
    docstring: Option<String>,
    methods: Vec<Arc<FunctionSummary>>,
}

/// Single pre-order pass over the tree collecting imports, classes and functions
struct OutlineBuilder<'a> {
    source: &'a str,
    imports: Vec<String>,
    classes: Vec<ClassShell>,
    functions: Vec<Arc<FunctionSummary>>,
}

impl<'a> OutlineBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Walk with an explicit stack; each entry remembers the class whose body
    /// directly contains it
    fn walk(&mut self, root: Node<'_>) {
        let mut stack: Vec<(Node<'_>, Option<usize>)> = Vec::new();
        push_children(&mut stack, root, None);

        while let Some((node, owner)) = stack.pop() {
            match node.kind() {
                "import_statement" => self.collect_import(node),
                "import_from_statement" | "future_import_statement" => {
                    self.collect_import_from(node);
                }
                "decorated_definition" => {
                    if let Some(definition) = node.child_by_field_name("definition") {
                        stack.push((definition, owner));
                    }
                }
                "class_definition" => {
                    let index = self.open_class(node);
                    if let Some(body) = node.child_by_field_name("body") {
                        push_children(&mut stack, body, Some(index));
                    }
                }
                "function_definition" => {
                    self.collect_function(node, owner);
                    if let Some(body) = node.child_by_field_name("body") {
                        push_children(&mut stack, body, None);
                    }
                }
                _ => push_children(&mut stack, node, None),
            }
        }
    }

    fn finish(self) -> FileStructure {
        let classes = self
            .classes
            .into_iter()
            .map(|shell| ClassSummary {
                name: shell.name,
                bases: shell.bases,
                methods: shell.methods,
                line_number: Some(shell.line_number),
                docstring: shell.docstring,
            })
            .collect();

        FileStructure {
            fidelity: Fidelity::SyntaxTree,
            imports: self.imports,
            classes,
            functions: self.functions,
        }
    }

    /// `import a.b, c as d` -> `a.b`, `c`
    fn collect_import(&mut self, node: Node<'_>) {
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            let dotted = self.imported_name(name);
            if !dotted.is_empty() {
                self.imports.push(dotted);
            }
        }
    }

    /// `from m import x` -> `m.x`; relative modules keep their leading dots
    fn collect_import_from(&mut self, node: Node<'_>) {
        let module = if node.kind() == "future_import_statement" {
            "__future__".to_string()
        } else {
            node.child_by_field_name("module_name")
                .map(|m| compact(self.text(m)))
                .unwrap_or_default()
        };

        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "wildcard_import" {
                names.push("*".to_string());
            }
        }
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            names.push(self.imported_name(name));
        }

        for name in names.into_iter().filter(|n| !n.is_empty()) {
            if module.is_empty() || module.ends_with('.') {
                self.imports.push(format!("{module}{name}"));
            } else {
                self.imports.push(format!("{module}.{name}"));
            }
        }
    }

    /// Imported module name, ignoring any `as` alias
    fn imported_name(&self, node: Node<'_>) -> String {
        let target = if node.kind() == "aliased_import" {
            node.child_by_field_name("name").unwrap_or(node)
        } else {
            node
        };
        compact(self.text(target))
    }

    fn open_class(&mut self, node: Node<'_>) -> usize {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        let mut bases = Vec::new();
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for base in superclasses.named_children(&mut cursor) {
                match base.kind() {
                    // metaclass=..., **kwargs are not bases
                    "keyword_argument" | "dictionary_splat" | "comment" => {}
                    _ => bases.push(compact(self.text(base))),
                }
            }
        }

        let docstring = node
            .child_by_field_name("body")
            .and_then(|body| self.docstring(body));

        self.classes.push(ClassShell {
            name,
            bases,
            line_number: node.start_position().row + 1,
            docstring,
            methods: Vec::new(),
        });
        self.classes.len() - 1
    }

    fn collect_function(&mut self, node: Node<'_>, owner: Option<usize>) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        let args = node
            .child_by_field_name("parameters")
            .map(|params| self.parameters(params))
            .unwrap_or_default();

        let return_annotation = node
            .child_by_field_name("return_type")
            .map(|ret| compact(self.text(ret)));

        let docstring = node
            .child_by_field_name("body")
            .and_then(|body| self.docstring(body));

        let summary = Arc::new(FunctionSummary {
            name,
            args,
            return_annotation,
            line_number: Some(node.start_position().row + 1),
            docstring,
            enclosing_class: owner.and_then(|idx| self.classes.get(idx).map(|c| c.name.clone())),
        });

        if let Some(class) = owner.and_then(|idx| self.classes.get_mut(idx)) {
            class.methods.push(Arc::clone(&summary));
        }
        self.functions.push(summary);
    }

    fn parameters(&self, params: Node<'_>) -> Vec<Parameter> {
        let mut out = Vec::new();
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            let (name, annotation) = match param.kind() {
                "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                    (self.text(param).to_string(), None)
                }
                "typed_parameter" => {
                    let name = param
                        .named_child(0)
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    (name, param.child_by_field_name("type"))
                }
                "default_parameter" | "typed_default_parameter" => {
                    let name = param
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    (name, param.child_by_field_name("type"))
                }
                // `*` and `/` separators, comments
                _ => continue,
            };

            out.push(Parameter {
                name: compact(&name),
                type_annotation: annotation.map(|t| compact(self.text(t))),
            });
        }
        out
    }

    /// Docstring of a body block: its first statement, if that is a plain string
    fn docstring(&self, body: Node<'_>) -> Option<String> {
        let mut cursor = body.walk();
        let first = body
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment")?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let string = first.named_child(0)?;
        if string.kind() != "string" {
            return None;
        }
        string_literal_body(self.text(string)).map(|raw| clean_docstring(&raw))
    }

    fn text(&self, node: Node<'_>) -> &'a str {
        self.source.get(node.byte_range()).unwrap_or("")
    }
}

fn push_children<'t>(stack: &mut Vec<(Node<'t>, Option<usize>)>, node: Node<'t>, owner: Option<usize>) {
    let mut cursor = node.walk();
    let children: Vec<_> = node.named_children(&mut cursor).collect();
    // reversed so that popping visits in source order
    for child in children.into_iter().rev() {
        stack.push((child, owner));
    }
}

/// Position of the first error or missing node, in source order
fn first_syntax_error(root: Node<'_>) -> AnalysisError {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return AnalysisError::syntax_at(pos.row, pos.column);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    let pos = root.start_position();
    AnalysisError::syntax_at(pos.row, pos.column)
}

/// `print x` and `exec code` parse in the grammar but are not Python 3
fn first_legacy_statement(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if matches!(node.kind(), "print_statement" | "exec_statement") {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

/// Strip whitespace inside a dotted expression (`a . b` -> `a.b`) and collapse
/// multi-line annotations onto one line
fn compact(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() && !matches!(ch, '.' | ',' | ']' | ')')
            && !out.ends_with(['.', '[', '('])
        {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }
    out
}

/// Body of a string literal; `None` for bytes and f-strings, which are not docstrings
fn string_literal_body(literal: &str) -> Option<String> {
    let quote_start = literal.find(['"', '\''])?;
    let prefix = &literal[..quote_start];
    if prefix.chars().any(|c| matches!(c, 'b' | 'B' | 'f' | 'F')) {
        return None;
    }
    let quoted = &literal[quote_start..];
    for delim in ["\"\"\"", "'''", "\"", "'"] {
        if quoted.len() >= delim.len() * 2 && quoted.starts_with(delim) && quoted.ends_with(delim) {
            return Some(quoted[delim.len()..quoted.len() - delim.len()].to_string());
        }
    }
    None
}

/// Same rules as Python's `inspect.cleandoc`
fn clean_docstring(raw: &str) -> String {
    let expanded = expand_tabs(raw);
    let lines: Vec<&str> = expanded.split('\n').collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim_start().is_empty())
        .map(|line| line.chars().count() - line.trim_start().chars().count())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if idx == 0 {
            cleaned.push(line.trim_start().to_string());
        } else if line.trim_start().is_empty() {
            cleaned.push(String::new());
        } else {
            cleaned.push(skip_chars(line, margin).to_string());
        }
    }

    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    let leading = cleaned.iter().take_while(|l| l.trim().is_empty()).count();
    cleaned.drain(..leading);
    cleaned.join("\n")
}

/// `line` without its first `count` characters
fn skip_chars(line: &str, count: usize) -> &str {
    line.char_indices()
        .nth(count)
        .map_or("", |(offset, _)| &line[offset..])
}

fn expand_tabs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = 8 - column % 8;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn analyze(code: &str) -> FileStructure {
        PythonAnalyzer.analyze(code).expect("valid python")
    }

    #[test]
    fn collects_imports_in_source_order() {
        let structure = analyze(
            "import os\nimport a.b as ab, sys\nfrom x.y import z, w as ww\nfrom . import sibling\nfrom ..pkg import thing\nfrom m import *\nfrom __future__ import annotations\n",
        );
        assert_eq!(
            structure.imports,
            vec![
                "os",
                "a.b",
                "sys",
                "x.y.z",
                "x.y.w",
                ".sibling",
                "..pkg.thing",
                "m.*",
                "__future__.annotations",
            ]
        );
    }

    #[test]
    fn collects_nested_imports() {
        let structure = analyze("def load():\n    import json\n    return json\n");
        assert_eq!(structure.imports, vec!["json"]);
    }

    #[test]
    fn extracts_function_signature() {
        let structure = analyze(
            "def greet(name: str, times: int = 1, *args, flag=False, **kwargs) -> str:\n    \"\"\"Say hello.\"\"\"\n    return name\n",
        );
        assert_eq!(structure.functions.len(), 1);
        let func = &structure.functions[0];
        assert_eq!(func.name, "greet");
        assert_eq!(func.line_number, Some(1));
        assert_eq!(func.return_annotation.as_deref(), Some("str"));
        assert_eq!(func.docstring.as_deref(), Some("Say hello."));
        assert_eq!(func.enclosing_class, None);

        let args: Vec<(&str, Option<&str>)> = func
            .args
            .iter()
            .map(|a| (a.name.as_str(), a.type_annotation.as_deref()))
            .collect();
        assert_eq!(
            args,
            vec![
                ("name", Some("str")),
                ("times", Some("int")),
                ("*args", None),
                ("flag", None),
                ("**kwargs", None),
            ]
        );
    }

    #[test]
    fn generic_annotations_keep_source_text() {
        let structure = analyze("def f(items: List[int]) -> Dict[str, int]:\n    pass\n");
        let func = &structure.functions[0];
        assert_eq!(func.args[0].type_annotation.as_deref(), Some("List[int]"));
        assert_eq!(func.return_annotation.as_deref(), Some("Dict[str, int]"));
    }

    #[test]
    fn class_bases_exclude_keywords() {
        let structure = analyze("class Model(base.Model, Mixin, metaclass=Meta):\n    pass\n");
        assert_eq!(structure.classes.len(), 1);
        assert_eq!(structure.classes[0].bases, vec!["base.Model", "Mixin"]);
    }

    #[test]
    fn methods_attach_to_their_own_class() {
        let code = r#"
class A:
    """First."""

    def run(self):
        pass

class B:
    def run(self):
        def helper():
            pass
        return helper

    @staticmethod
    async def build() -> "B":
        pass
"#;
        let structure = analyze(code);
        assert_eq!(structure.classes.len(), 2);

        let a = &structure.classes[0];
        assert_eq!(a.docstring.as_deref(), Some("First."));
        assert_eq!(a.line_number, Some(2));
        assert_eq!(a.methods.len(), 1);
        assert_eq!(a.methods[0].enclosing_class.as_deref(), Some("A"));

        let b = &structure.classes[1];
        let names: Vec<&str> = b.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["run", "build"]);
        assert_eq!(b.methods[0].enclosing_class.as_deref(), Some("B"));

        // helper is nested in a method, not a class member
        let helper = structure
            .functions
            .iter()
            .find(|f| f.name == "helper")
            .unwrap();
        assert_eq!(helper.enclosing_class, None);

        let order: Vec<&str> = structure.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(order, vec!["run", "run", "helper", "build"]);
        assert!(Arc::ptr_eq(&b.methods[0], &structure.functions[1]));
    }

    #[test]
    fn docstring_is_cleaned_like_python() {
        let code = "def f():\n    \"\"\"Summary line.\n\n        Indented detail.\n    Body.\n    \"\"\"\n";
        let structure = analyze(code);
        assert_eq!(
            structure.functions[0].docstring.as_deref(),
            Some("Summary line.\n\n    Indented detail.\nBody.")
        );
    }

    #[test]
    fn docstring_margin_counts_characters() {
        let structure = analyze("def f():\n    \"\"\"x\n a\n\u{a0}b\"\"\"\n");
        assert_eq!(structure.functions[0].docstring.as_deref(), Some("x\na\nb"));
    }

    #[test]
    fn docstring_skips_leading_comment_but_not_code() {
        let structure = analyze("def f():\n    # note\n    'doc'\n\ndef g():\n    x = 1\n    'not doc'\n");
        assert_eq!(structure.functions[0].docstring.as_deref(), Some("doc"));
        assert_eq!(structure.functions[1].docstring, None);
    }

    #[test]
    fn fstring_is_not_a_docstring() {
        let structure = analyze("def f():\n    f\"\"\"{x}\"\"\"\n");
        assert_eq!(structure.functions[0].docstring, None);
    }

    #[test]
    fn invalid_syntax_reports_position() {
        let err = PythonAnalyzer.analyze("def broken(:\n    pass\n").unwrap_err();
        assert!(matches!(err, AnalysisError::Syntax { line: 1, .. }), "{err:?}");
    }

    #[test]
    fn python2_print_statement_is_invalid() {
        let err = PythonAnalyzer
            .analyze("import os\n\nprint \"hello\"\n")
            .unwrap_err();
        assert_eq!(err, AnalysisError::Syntax { line: 3, column: 1 });

        let structure = analyze("print(\"hello\")\n");
        assert!(structure.functions.is_empty());
    }

    #[test]
    fn compact_joins_dotted_names() {
        assert_eq!(compact("a . b"), "a.b");
        assert_eq!(compact("Dict[str,\n    int]"), "Dict[str, int]");
        assert_eq!(compact("Optional[ str ]"), "Optional[str]");
    }
}
