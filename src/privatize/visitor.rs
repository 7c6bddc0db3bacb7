use std::{
    collections::HashSet,
    fmt,
    ops::Range,
    sync::LazyLock,
};

use regex::Regex;
use swc_common::{BytePos, Span};
use swc_ecma_ast::{
    Accessibility, Class, ClassDecl, ClassExpr, ClassMember, Expr, FnDecl, FnExpr, GetterProp,
    IdentName, MemberExpr, MemberProp, MethodKind, MethodProp, Module, PropName, SetterProp,
};
use swc_ecma_visit::{Visit, VisitWith};

/// Comments and identifiers between a member's decorators and its key.
static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)//[^\n]*|/\*.*?\*/|[A-Za-z_$][\w$]*").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Method,
}

/// A member whose access modifier was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub name: String,
    /// `true` for `private` members (now `#name`), `false` for `public`.
    pub private: bool,
    pub kind: MemberKind,
    pub line: usize,
}

impl Rename {
    pub fn from_text(&self) -> String {
        let modifier = if self.private { "private" } else { "public" };
        format!("{} {}", modifier, self.name)
    }

    pub fn to_text(&self) -> String {
        if self.private {
            format!("#{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for Rename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' -> '{}'", self.from_text(), self.to_text())
    }
}

/// A `private` member left untouched because the class reads it through
/// something other than its own `this`, such as `other.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMember {
    pub name: String,
    pub line: usize,
}

impl fmt::Display for SkippedMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'private {}' kept: accessed outside `this`", self.name)
    }
}

/// Names renamed to `#name` in one class body.
#[derive(Debug, Default)]
struct Scope {
    /// Names reachable as `this.name`. Empty inside functions that rebind `this`.
    this_names: HashSet<String>,
    class_name: Option<String>,
    /// Static names reachable as `ClassName.name`.
    static_names: HashSet<String>,
}

/// A byte range of the source replaced by `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub text: &'static str,
}

/// Everything [`MemberRewriter`] found in a module.
#[derive(Debug, Default)]
pub struct MemberEdits {
    pub edits: Vec<TextEdit>,
    pub renames: Vec<Rename>,
    pub skipped: Vec<SkippedMember>,
}

/// Collects the text edits that turn `private`/`public` members into
/// `#name`/`name`.
///
/// `this.name` accesses are rewritten inside the class declaring the
/// member, as are `ClassName.name` accesses to static members. Function
/// expressions and object literal methods rebind `this` and are left alone.
/// A private member the class also reads any other way keeps its modifier.
pub struct MemberRewriter<'a> {
    source: &'a str,
    start_pos: BytePos,
    scopes: Vec<Scope>,
    /// Name of the class declaration or expression about to be visited.
    class_name: Option<String>,
    found: MemberEdits,
}

impl<'a> MemberRewriter<'a> {
    pub fn new(source: &'a str, start_pos: BytePos) -> Self {
        Self {
            source,
            start_pos,
            scopes: Vec::new(),
            class_name: None,
            found: MemberEdits::default(),
        }
    }

    pub fn rewrite(mut self, module: &Module) -> MemberEdits {
        self.visit_module(module);
        self.found
    }

    fn offset(&self, pos: BytePos) -> usize {
        (pos.0 - self.start_pos.0) as usize
    }

    fn line_of(&self, offset: usize) -> usize {
        self.source[..offset].matches('\n').count() + 1
    }

    /// Returns the scope of private names declared by `class`.
    fn rewrite_members(&mut self, class: &Class) -> Scope {
        let overloaded: HashSet<&str> = class
            .body
            .iter()
            .filter_map(|member| match member {
                ClassMember::Method(method) if method.function.body.is_none() => {
                    prop_ident(&method.key).map(|key| &*key.sym)
                }
                _ => None,
            })
            .collect();
        let foreign = foreign_accesses(class, self.class_name.as_deref());

        let mut scope = Scope {
            class_name: self.class_name.take(),
            ..Default::default()
        };
        for member in &class.body {
            let Some(candidate) = candidate(member) else {
                continue;
            };
            let name = &*candidate.key.sym;
            let (private, keyword) = match candidate.accessibility {
                Accessibility::Private if overloaded.contains(name) => continue,
                Accessibility::Private => (true, "private"),
                Accessibility::Public => (false, "public"),
                Accessibility::Protected => continue,
            };

            let source = self.source;
            let member_start = self.offset(candidate.span.lo);
            let line = self.line_of(member_start);
            if private && foreign.contains(name) {
                self.found.skipped.push(SkippedMember {
                    name: name.to_string(),
                    line,
                });
                continue;
            }

            let modifiers_start = candidate
                .decorators_end
                .map_or(member_start, |end| self.offset(end).max(member_start));
            let key_start = self.offset(candidate.key.span.lo);
            let Some(modifier) = source
                .get(modifiers_start..key_start)
                .and_then(|modifiers| find_modifier(modifiers, keyword))
            else {
                continue;
            };

            self.found.edits.push(TextEdit {
                range: modifiers_start + modifier.start..modifiers_start + modifier.end,
                text: "",
            });
            if private {
                self.found.edits.push(TextEdit {
                    range: key_start..key_start,
                    text: "#",
                });
                scope.this_names.insert(name.to_string());
                if candidate.is_static {
                    scope.static_names.insert(name.to_string());
                }
            }
            self.found.renames.push(Rename {
                name: name.to_string(),
                private,
                kind: candidate.kind,
                line,
            });
        }
        scope
    }

    fn is_renamed(&self, obj: &Expr, name: &str) -> bool {
        match obj {
            Expr::This(_) => self
                .scopes
                .last()
                .is_some_and(|scope| scope.this_names.contains(name)),
            Expr::Ident(ident) => self.scopes.iter().rev().any(|scope| {
                scope.class_name.as_deref() == Some(&*ident.sym)
                    && scope.static_names.contains(name)
            }),
            _ => false,
        }
    }

    fn with_scope(&mut self, scope: Scope, visit: impl FnOnce(&mut Self)) {
        self.scopes.push(scope);
        visit(self);
        self.scopes.pop();
    }
}

/// Property or method declaration with an identifier key and an access modifier.
struct Candidate<'a> {
    span: Span,
    decorators_end: Option<BytePos>,
    key: &'a IdentName,
    accessibility: Accessibility,
    kind: MemberKind,
    is_static: bool,
}

fn candidate(member: &ClassMember) -> Option<Candidate<'_>> {
    match member {
        ClassMember::ClassProp(prop) if !prop.is_abstract && !prop.is_optional && !prop.declare => {
            Some(Candidate {
                span: prop.span,
                decorators_end: prop.decorators.iter().map(|d| d.span.hi).max(),
                key: prop_ident(&prop.key)?,
                accessibility: prop.accessibility?,
                kind: MemberKind::Property,
                is_static: prop.is_static,
            })
        }
        ClassMember::Method(method)
            if method.kind == MethodKind::Method && !method.is_abstract && !method.is_optional =>
        {
            Some(Candidate {
                span: method.span,
                decorators_end: method.function.decorators.iter().map(|d| d.span.hi).max(),
                key: prop_ident(&method.key)?,
                accessibility: method.accessibility?,
                kind: MemberKind::Method,
                is_static: method.is_static,
            })
        }
        _ => None,
    }
}

fn prop_ident(key: &PropName) -> Option<&IdentName> {
    match key {
        PropName::Ident(ident) => Some(ident),
        _ => None,
    }
}

/// Byte range of the `keyword` token and the whitespace after it.
/// Keywords inside comments do not count.
fn find_modifier(modifiers: &str, keyword: &str) -> Option<Range<usize>> {
    let token = TOKEN_REGEX
        .find_iter(modifiers)
        .find(|token| token.as_str() == keyword)?;
    let rest = &modifiers[token.end()..];
    let spaces = rest.len() - rest.trim_start().len();
    Some(token.start()..token.end() + spaces)
}

/// Member names `class` reads through anything but its own `this` or its
/// class name.
fn foreign_accesses(class: &Class, class_name: Option<&str>) -> HashSet<String> {
    let mut collector = ForeignAccess {
        class_name,
        function_depth: 0,
        names: HashSet::new(),
    };
    for member in &class.body {
        member.visit_with(&mut collector);
    }
    collector.names
}

struct ForeignAccess<'a> {
    class_name: Option<&'a str>,
    /// Functions that rebind `this` entered so far.
    function_depth: usize,
    names: HashSet<String>,
}

impl ForeignAccess<'_> {
    fn in_function(&mut self, visit: impl FnOnce(&mut Self)) {
        self.function_depth += 1;
        visit(self);
        self.function_depth -= 1;
    }
}

impl Visit for ForeignAccess<'_> {
    fn visit_member_expr(&mut self, node: &MemberExpr) {
        if let MemberProp::Ident(prop) = &node.prop {
            let own = match &*node.obj {
                Expr::This(_) => self.function_depth == 0,
                Expr::Ident(ident) => self.class_name == Some(&*ident.sym),
                _ => false,
            };
            if !own {
                self.names.insert(prop.sym.to_string());
            }
        }
        node.visit_children_with(self);
    }

    fn visit_class(&mut self, node: &Class) {
        // `this` in a nested class is that class's instance
        let depth = std::mem::replace(&mut self.function_depth, 0);
        node.visit_children_with(self);
        self.function_depth = depth;
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.in_function(|this| node.visit_children_with(this));
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        self.in_function(|this| node.visit_children_with(this));
    }

    fn visit_method_prop(&mut self, node: &MethodProp) {
        self.in_function(|this| node.visit_children_with(this));
    }

    fn visit_getter_prop(&mut self, node: &GetterProp) {
        self.in_function(|this| node.visit_children_with(this));
    }

    fn visit_setter_prop(&mut self, node: &SetterProp) {
        self.in_function(|this| node.visit_children_with(this));
    }
}

impl Visit for MemberRewriter<'_> {
    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.class_name = Some(node.ident.sym.to_string());
        node.class.visit_with(self);
    }

    fn visit_class_expr(&mut self, node: &ClassExpr) {
        self.class_name = node.ident.as_ref().map(|ident| ident.sym.to_string());
        node.class.visit_with(self);
    }

    fn visit_class(&mut self, node: &Class) {
        let scope = self.rewrite_members(node);
        self.with_scope(scope, |this| node.visit_children_with(this));
    }

    fn visit_member_expr(&mut self, node: &MemberExpr) {
        if let MemberProp::Ident(prop) = &node.prop
            && self.is_renamed(&node.obj, &prop.sym)
        {
            let at = self.offset(prop.span.lo);
            self.found.edits.push(TextEdit {
                range: at..at,
                text: "#",
            });
        }
        node.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.with_scope(Scope::default(), |this| node.visit_children_with(this));
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        self.with_scope(Scope::default(), |this| node.visit_children_with(this));
    }

    fn visit_method_prop(&mut self, node: &MethodProp) {
        self.with_scope(Scope::default(), |this| node.visit_children_with(this));
    }

    fn visit_getter_prop(&mut self, node: &GetterProp) {
        self.with_scope(Scope::default(), |this| node.visit_children_with(this));
    }

    fn visit_setter_prop(&mut self, node: &SetterProp) {
        self.with_scope(Scope::default(), |this| node.visit_children_with(this));
    }
}

/// Apply non-overlapping edits to `source`.
pub fn apply_edits(source: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    let mut output = source.to_string();
    for edit in edits {
        output.replace_range(edit.range, edit.text);
    }
    output
}
