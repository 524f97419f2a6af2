//! Export Rewriter + Import Injector for the Export Exposer
//!
//! Walks the top-level statements of a parsed module, classifies each export
//! as default or named, and appends one `set(globalObject, "dotted.path",
//! value)` call per export. A default import of the path-assignment primitive
//! is injected at the very top of the file under a generated binding that
//! cannot collide with anything already in the file.

use oxc_allocator::{Allocator, Box as oxc_box, CloneIn};
use oxc_ast::ast::*;
use oxc_ast::AstBuilder;
use oxc_ast_visit::Visit;
use oxc_span::SPAN;
use std::collections::HashSet;
use std::env;
use std::path::{Component, Path, PathBuf};

use crate::compile::ExportMapping;
use crate::options::ExposeOptions;
use crate::paths::ModulePath;

pub struct ExportExposer<'a> {
    allocator: &'a Allocator,
    ast: AstBuilder<'a>,
    options: &'a ExposeOptions,
    module_path: &'a ModulePath,
    set_binding: String,
    used_names: HashSet<String>,
    pub mappings: Vec<ExportMapping>,
}

impl<'a> ExportExposer<'a> {
    pub fn new(
        allocator: &'a Allocator,
        options: &'a ExposeOptions,
        module_path: &'a ModulePath,
        program: &Program<'a>,
    ) -> Self {
        let mut collector = IdentCollector::default();
        collector.visit_program(program);

        let mut exposer = Self {
            allocator,
            ast: AstBuilder::new(allocator),
            options,
            module_path,
            set_binding: String::new(),
            used_names: collector.names,
            mappings: Vec::new(),
        };
        exposer.set_binding = exposer.generate_uid("_exposed_set");
        exposer
    }

    /// Rebuilds the statement list: injected import first, then the original
    /// statements in order, each export followed by its synthesized writes.
    pub fn rewrite(&mut self, program: &mut Program<'a>, filename: &Path) {
        let old_body = std::mem::replace(&mut program.body, self.ast.vec());
        let mut new_body = self.ast.vec();
        new_body.push(self.build_set_import(filename));

        for stmt in old_body.into_iter() {
            match stmt {
                Statement::ExportDefaultDeclaration(export) => {
                    self.rewrite_default_export(export, &mut new_body);
                }
                Statement::ExportNamedDeclaration(export) => {
                    self.rewrite_named_export(export, &mut new_body);
                }
                other => new_body.push(other),
            }
        }

        program.body = new_body;
    }

    fn rewrite_default_export(
        &mut self,
        mut export: oxc_box<'a, ExportDefaultDeclaration<'a>>,
        new_body: &mut oxc_allocator::Vec<'a, Statement<'a>>,
    ) {
        // Named (or freshly named) declarations stay the default export and
        // get their write appended after the statement.
        let declared = match &mut export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                if func.id.is_none() {
                    let fresh = self.generate_uid("_exposed_default");
                    let atom = self.allocator.alloc_str(&fresh);
                    func.id = Some(self.ast.binding_identifier(SPAN, atom));
                }
                func.id.as_ref().map(|id| id.name.to_string())
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                if class.id.is_none() {
                    let fresh = self.generate_uid("_exposed_default");
                    let atom = self.allocator.alloc_str(&fresh);
                    class.id = Some(self.ast.binding_identifier(SPAN, atom));
                }
                class.id.as_ref().map(|id| id.name.to_string())
            }
            _ => None,
        };

        if let Some(name) = declared {
            new_body.push(Statement::ExportDefaultDeclaration(export));
            let value = self.ident_expr(&name);
            let write = self.build_set("default", value);
            new_body.push(write);
            return;
        }

        // Arbitrary expression: hoist it into a fresh binding declared before
        // the export, write that binding, then re-export the binding.
        let hoisted = export
            .declaration
            .as_expression()
            .map(|e| e.clone_in(self.allocator));
        match hoisted {
            Some(expr) => {
                let fresh = self.generate_uid("_exposed_default");
                new_body.push(self.build_const(&fresh, expr));
                let value = self.ident_expr(&fresh);
                let write = self.build_set("default", value);
                new_body.push(write);
                export.declaration = ExportDefaultDeclarationKind::from(self.ident_expr(&fresh));
                new_body.push(Statement::ExportDefaultDeclaration(export));
            }
            // TS-only declaration shapes carry no runtime value to expose.
            None => new_body.push(Statement::ExportDefaultDeclaration(export)),
        }
    }

    fn rewrite_named_export(
        &mut self,
        export: oxc_box<'a, ExportNamedDeclaration<'a>>,
        new_body: &mut oxc_allocator::Vec<'a, Statement<'a>>,
    ) {
        if export.export_kind.is_type() {
            new_body.push(Statement::ExportNamedDeclaration(export));
            return;
        }

        // (exported name, local binding) in declaration order.
        let mut writes: Vec<(String, String)> = Vec::new();

        if let Some(decl) = &export.declaration {
            match decl {
                Declaration::VariableDeclaration(var_decl) => {
                    for declarator in &var_decl.declarations {
                        let mut names = Vec::new();
                        collect_binding_names(&declarator.id, &mut names);
                        for name in names {
                            writes.push((name.clone(), name));
                        }
                    }
                }
                Declaration::FunctionDeclaration(func) => {
                    if let Some(id) = &func.id {
                        writes.push((id.name.to_string(), id.name.to_string()));
                    }
                }
                Declaration::ClassDeclaration(class) => {
                    if let Some(id) = &class.id {
                        writes.push((id.name.to_string(), id.name.to_string()));
                    }
                }
                _ => {}
            }
        }

        // Specifier lists write the local binding under the exported name.
        // Re-exports from another module have no local binding to read, so
        // they pass through untouched.
        if export.source.is_none() {
            for specifier in &export.specifiers {
                if specifier.export_kind.is_type() {
                    continue;
                }
                writes.push((
                    module_export_name(&specifier.exported),
                    module_export_name(&specifier.local),
                ));
            }
        }

        new_body.push(Statement::ExportNamedDeclaration(export));
        for (exported, local) in writes {
            let value = self.ident_expr(&local);
            let write = self.build_set(&exported, value);
            new_body.push(write);
        }
    }

    /// `setBinding(globalObject, "a.b.c.key", value);`
    fn build_set(&mut self, export_name: &str, value: Expression<'a>) -> Statement<'a> {
        let joined = self.module_path.global_path(export_name, self.options);
        if self.options.log_mapping {
            println!(
                "[ExposerNative] {}::{} -> {}",
                self.module_path.relative(),
                export_name,
                joined
            );
        }
        self.mappings.push(ExportMapping {
            export_name: export_name.to_string(),
            global_path: joined.clone(),
        });

        let callee = self.ident_expr(&self.set_binding);
        let mut args = self.ast.vec();
        args.push(Argument::from(self.ident_expr(&self.options.global_object)));
        let path_atom = self.allocator.alloc_str(&joined);
        args.push(Argument::from(self.ast.expression_string_literal(
            SPAN,
            path_atom,
            None,
        )));
        args.push(Argument::from(value));

        self.ast.statement_expression(
            SPAN,
            self.ast.expression_call(
                SPAN,
                callee,
                None::<oxc_box<TSTypeParameterInstantiation>>,
                args,
                false,
            ),
        )
    }

    /// `const name = init;`
    fn build_const(&self, name: &str, init: Expression<'a>) -> Statement<'a> {
        let atom = self.allocator.alloc_str(name);
        let id = self.ast.binding_identifier(SPAN, atom);
        let pattern = BindingPattern::BindingIdentifier(self.ast.alloc(id));
        let mut declarators = self.ast.vec();
        declarators.push(self.ast.variable_declarator(
            SPAN,
            VariableDeclarationKind::Const,
            pattern,
            None::<oxc_box<TSTypeAnnotation>>,
            Some(init),
            false,
        ));
        Statement::VariableDeclaration(self.ast.alloc_variable_declaration(
            SPAN,
            VariableDeclarationKind::Const,
            declarators,
            false,
        ))
    }

    /// `import setBinding from "specifier";` at the top of the file.
    fn build_set_import(&self, filename: &Path) -> Statement<'a> {
        let specifier = resolve_set_specifier(&self.options.set_package, filename);
        let local_atom = self.allocator.alloc_str(&self.set_binding);
        let local = self.ast.binding_identifier(SPAN, local_atom);
        let mut specifiers = self.ast.vec();
        specifiers.push(
            self.ast
                .import_declaration_specifier_import_default_specifier(SPAN, local),
        );
        let source_atom = self.allocator.alloc_str(&specifier);
        Statement::ImportDeclaration(self.ast.alloc_import_declaration(
            SPAN,
            Some(specifiers),
            self.ast.string_literal(SPAN, source_atom, None),
            None,
            None::<oxc_box<WithClause>>,
            ImportOrExportKind::Value,
        ))
    }

    fn ident_expr(&self, name: &str) -> Expression<'a> {
        let atom = self.allocator.alloc_str(name);
        self.ast.expression_identifier(SPAN, atom)
    }

    /// Fresh name that shadows nothing in the file and no earlier fresh name.
    fn generate_uid(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 1;
        while self.used_names.contains(&candidate) {
            n += 1;
            candidate = format!("{}{}", base, n);
        }
        self.used_names.insert(candidate.clone());
        candidate
    }
}

/// Every identifier appearing anywhere in the file, reference or binding.
/// Coarser than true scope analysis, but a superset of it, which is all
/// collision avoidance needs.
#[derive(Default)]
struct IdentCollector {
    names: HashSet<String>,
}

impl<'a> Visit<'a> for IdentCollector {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.names.insert(ident.name.to_string());
    }

    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        self.names.insert(ident.name.to_string());
    }
}

fn collect_binding_names<'a>(pattern: &BindingPattern<'a>, names: &mut Vec<String>) {
    match pattern {
        BindingPattern::BindingIdentifier(id) => {
            names.push(id.name.to_string());
        }
        BindingPattern::ObjectPattern(obj) => {
            for prop in &obj.properties {
                collect_binding_names(&prop.value, names);
            }
            if let Some(rest) = &obj.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPattern::ArrayPattern(arr) => {
            for elem in arr.elements.iter().flatten() {
                collect_binding_names(elem, names);
            }
            if let Some(rest) = &arr.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPattern::AssignmentPattern(assign) => {
            collect_binding_names(&assign.left, names);
        }
    }
}

fn module_export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(s) => s.value.to_string(),
    }
}

/// Package-style specifiers are emitted as-is. Relative specifiers are
/// resolved against the process working directory, then re-relativized
/// against the consuming file's own directory so the generated import stays
/// valid wherever the file lives in the tree.
pub(crate) fn resolve_set_specifier(set_package: &str, filename: &Path) -> String {
    if !set_package.starts_with('.') {
        return set_package.to_string();
    }
    let base = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let target = normalize(&base.join(set_package));
    let file_dir = match filename.parent() {
        Some(dir) => normalize(dir),
        None => return set_package.to_string(),
    };
    let relative = relative_path(&file_dir, &target);
    let mut specifier = relative.to_string_lossy().replace('\\', "/");
    if !specifier.starts_with('.') {
        specifier = format!("./{}", specifier);
    }
    specifier
}

/// Lexically folds `.` and `..` components; no filesystem access.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from_components: Vec<_> = from.components().collect();
    let to_components: Vec<_> = to.components().collect();

    let common = from_components
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..from_components.len() {
        out.push("..");
    }
    for component in &to_components[common..] {
        out.push(component.as_os_str());
    }
    out
}
