//! Per-language recognition of declaration sites in tree-sitter trees.

use crate::document::SyntaxTree;
use crate::language::Language;
use crate::types::{ElementKind, Span};
use tree_sitter::Node;

/// How the walker should treat a syntax node
pub enum Classified<'tree> {
    /// Declaration that owns nested declarations
    Composite(Declaration<'tree>),
    /// Declaration whose body is not indexed
    Leaf(Declaration<'tree>),
    /// Not a declaration; its children are still visited
    Unrecognized,
}

/// A recognized declaration node, as handed to feature discoverers
#[derive(Clone, Copy)]
pub struct Declaration<'tree> {
    node: Node<'tree>,
    name_node: Node<'tree>,
    kind: ElementKind,
    tree: &'tree SyntaxTree,
}

impl<'tree> Declaration<'tree> {
    /// The whole declaration node
    pub fn node(&self) -> Node<'tree> {
        self.node
    }

    /// The node naming the declaration (identifier, or impl target type)
    pub fn name_node(&self) -> Node<'tree> {
        self.name_node
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn language(&self) -> Language {
        self.tree.language()
    }

    /// Full source text of the declaration
    pub fn text(&self) -> &'tree str {
        self.tree.text_of(self.node)
    }

    pub fn name(&self) -> &'tree str {
        self.tree.text_of(self.name_node)
    }

    /// Display text shown in the outline
    pub fn display_text(&self) -> String {
        if self.node.kind() != "impl_item" {
            return self.name().to_string();
        }
        match self.node.child_by_field_name("trait") {
            Some(trait_node) => format!("{} for {}", self.tree.text_of(trait_node), self.name()),
            None => self.name().to_string(),
        }
    }

    pub fn span(&self) -> Span {
        Span::of_node(self.name_node)
    }

    /// Whether the declaration carries a modifier keyword such as `async`
    pub fn has_modifier(&self, keyword: &str) -> bool {
        let mut cursor = self.node.walk();
        let found = self.node.children(&mut cursor).any(|child| match child.kind() {
            kind if kind == keyword => true,
            "function_modifiers" => {
                let mut inner = child.walk();
                let found = child.children(&mut inner).any(|m| m.kind() == keyword);
                found
            }
            "modifier" => self.tree.text_of(child) == keyword,
            _ => false,
        });
        found
    }

    /// Attribute or decorator texts attached to the declaration, in source order
    pub fn attributes(&self) -> Vec<&'tree str> {
        match self.language() {
            Language::Rust => {
                let mut attrs = Vec::new();
                let mut sibling = self.node.prev_sibling();
                while let Some(node) = sibling {
                    match node.kind() {
                        "attribute_item" => attrs.push(self.tree.text_of(node)),
                        "line_comment" | "block_comment" => {}
                        _ => break,
                    }
                    sibling = node.prev_sibling();
                }
                attrs.reverse();
                attrs
            }
            Language::Python => {
                let Some(parent) = self.node.parent().filter(|p| p.kind() == "decorated_definition")
                else {
                    return Vec::new();
                };
                let mut cursor = parent.walk();
                let decorators: Vec<_> = parent
                    .children(&mut cursor)
                    .filter(|child| child.kind() == "decorator")
                    .map(|child| self.tree.text_of(child))
                    .collect();
                decorators
            }
            Language::CSharp => {
                let mut cursor = self.node.walk();
                let lists: Vec<_> = self
                    .node
                    .children(&mut cursor)
                    .filter(|child| child.kind() == "attribute_list")
                    .map(|child| self.tree.text_of(child))
                    .collect();
                lists
            }
            _ => Vec::new(),
        }
    }
}

/// Decide how `node` contributes to the outline
pub fn classify<'tree>(node: Node<'tree>, tree: &'tree SyntaxTree) -> Classified<'tree> {
    let found = match tree.language() {
        Language::Rust => rust_declaration(node),
        Language::Python => python_declaration(node, tree),
        Language::CSharp => csharp_declaration(node),
        language if language.is_script() => script_declaration(node, tree),
        _ => None,
    };

    let Some((kind, name_node)) = found else {
        return Classified::Unrecognized;
    };
    if tree.text_of(name_node).trim().is_empty() {
        return Classified::Unrecognized;
    }

    let declaration = Declaration {
        node,
        name_node,
        kind,
        tree,
    };
    if kind.is_composite() {
        Classified::Composite(declaration)
    } else {
        Classified::Leaf(declaration)
    }
}

type Found<'tree> = Option<(ElementKind, Node<'tree>)>;

fn named<'tree>(node: Node<'tree>, field: &str, kind: ElementKind) -> Found<'tree> {
    node.child_by_field_name(field).map(|name| (kind, name))
}

/// True when `node` sits directly in the body of one of `owners`
fn in_body_of(node: Node<'_>, body: &str, owners: &[&str]) -> bool {
    node.parent()
        .filter(|parent| parent.kind() == body)
        .and_then(|parent| parent.parent())
        .is_some_and(|owner| owners.contains(&owner.kind()))
}

fn rust_declaration(node: Node<'_>) -> Found<'_> {
    let kind = match node.kind() {
        "struct_item" | "union_item" => ElementKind::Struct,
        "enum_item" => ElementKind::Enum,
        "trait_item" => ElementKind::Interface,
        "mod_item" => ElementKind::Module,
        // impl blocks are named after the implementing type
        "impl_item" => return named(node, "type", ElementKind::Impl),
        "function_item" | "function_signature_item" => {
            if in_body_of(node, "declaration_list", &["impl_item", "trait_item"]) {
                ElementKind::Method
            } else {
                ElementKind::Function
            }
        }
        "field_declaration" => ElementKind::Field,
        "enum_variant" => ElementKind::EnumMember,
        "const_item" | "static_item" => ElementKind::Constant,
        _ => return None,
    };
    named(node, "name", kind)
}

/// Nearest enclosing class or function definition
fn python_owner(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if matches!(ancestor.kind(), "class_definition" | "function_definition") {
            return Some(ancestor);
        }
        current = ancestor.parent();
    }
    None
}

fn owned_by_class(node: Node<'_>) -> bool {
    python_owner(node).is_some_and(|owner| owner.kind() == "class_definition")
}

fn python_declaration<'tree>(node: Node<'tree>, tree: &'tree SyntaxTree) -> Found<'tree> {
    match node.kind() {
        "class_definition" => named(node, "name", ElementKind::Class),
        "function_definition" => {
            let name = node.child_by_field_name("name")?;
            let kind = if !owned_by_class(node) {
                ElementKind::Function
            } else if tree.text_of(name) == "__init__" {
                ElementKind::Constructor
            } else {
                ElementKind::Method
            };
            Some((kind, name))
        }
        "assignment" => {
            let statement = node.parent().filter(|p| p.kind() == "expression_statement")?;
            if !owned_by_class(statement) {
                return None;
            }
            let target = node
                .child_by_field_name("left")
                .filter(|left| left.kind() == "identifier")?;
            Some((ElementKind::Field, target))
        }
        _ => None,
    }
}

fn script_declaration<'tree>(node: Node<'tree>, tree: &'tree SyntaxTree) -> Found<'tree> {
    match node.kind() {
        "class_declaration" | "class" | "abstract_class_declaration" => {
            named(node, "name", ElementKind::Class)
        }
        "interface_declaration" => named(node, "name", ElementKind::Interface),
        "enum_declaration" => named(node, "name", ElementKind::Enum),
        "internal_module" | "module" => named(node, "name", ElementKind::Module),
        "method_definition" => {
            let name = node.child_by_field_name("name")?;
            let mut cursor = node.walk();
            let is_accessor = node
                .children(&mut cursor)
                .any(|child| matches!(child.kind(), "get" | "set"));
            let kind = if tree.text_of(name) == "constructor" {
                ElementKind::Constructor
            } else if is_accessor {
                ElementKind::Property
            } else {
                ElementKind::Method
            };
            Some((kind, name))
        }
        // signatures inside type literals belong to anonymous types
        "method_signature" if in_interface_body(node) => named(node, "name", ElementKind::Method),
        "property_signature" if in_interface_body(node) => {
            named(node, "name", ElementKind::Property)
        }
        "abstract_method_signature" => named(node, "name", ElementKind::Method),
        "public_field_definition" => named(node, "name", ElementKind::Field),
        "field_definition" => named(node, "property", ElementKind::Field),
        "function_declaration" | "generator_function_declaration" | "function_signature" => {
            named(node, "name", ElementKind::Function)
        }
        "property_identifier" if node.parent().is_some_and(|p| p.kind() == "enum_body") => {
            Some((ElementKind::EnumMember, node))
        }
        "enum_assignment" => named(node, "name", ElementKind::EnumMember),
        _ => None,
    }
}

fn in_interface_body(node: Node<'_>) -> bool {
    node.parent().is_some_and(|parent| parent.kind() == "interface_body")
}

fn csharp_declaration(node: Node<'_>) -> Found<'_> {
    let kind = match node.kind() {
        "class_declaration" => ElementKind::Class,
        "struct_declaration" => ElementKind::Struct,
        "interface_declaration" => ElementKind::Interface,
        "enum_declaration" => ElementKind::Enum,
        "enum_member_declaration" => ElementKind::EnumMember,
        "property_declaration" => ElementKind::Property,
        "method_declaration" => ElementKind::Method,
        "constructor_declaration" => ElementKind::Constructor,
        // fields and events are named after their first variable
        "field_declaration" => return first_variable(node).map(|name| (ElementKind::Field, name)),
        "event_field_declaration" => {
            return first_variable(node).map(|name| (ElementKind::Event, name))
        }
        _ => return None,
    };
    named(node, "name", kind)
}

fn first_variable(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let declaration = node
        .children(&mut cursor)
        .find(|child| child.kind() == "variable_declaration")?;
    let mut cursor = declaration.walk();
    let declarator = declaration
        .children(&mut cursor)
        .find(|child| child.kind() == "variable_declarator")?;
    if let Some(name) = declarator.child_by_field_name("name") {
        return Some(name);
    }
    let mut cursor = declarator.walk();
    let name = declarator
        .named_children(&mut cursor)
        .find(|child| child.kind() == "identifier");
    name
}
