//! Plain-text tree rendering of an outline.

use context_outline::OutlineElement;

/// Render the outline forest as an indented tree.
///
/// ```text
/// class Foo [P1, P2]
/// ├── method Bar [P1, P2] {async}
/// └── field baz [P2]
/// ```
pub fn render_outline(roots: &[OutlineElement]) -> String {
    let mut output = String::new();
    for root in roots {
        push_label(&mut output, root);
        render_children(&mut output, root, "");
    }
    output
}

fn render_children(output: &mut String, node: &OutlineElement, prefix: &str) {
    for (i, child) in node.children.iter().enumerate() {
        let is_last = i == node.children.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        push_label(output, child);

        let continuation = if is_last { "    " } else { "│   " };
        render_children(output, child, &format!("{prefix}{continuation}"));
    }
}

fn push_label(output: &mut String, node: &OutlineElement) {
    output.push_str(node.kind.as_str());
    output.push(' ');
    output.push_str(node.display_text());
    output.push_str(" [");
    output.push_str(&node.projects.to_vec().join(", "));
    output.push(']');
    if !node.features.is_empty() {
        let features: Vec<String> = node
            .features
            .iter()
            .map(|f| match &f.data {
                Some(data) => format!("{}={data}", f.name),
                None => f.name.clone(),
            })
            .collect();
        output.push_str(" {");
        output.push_str(&features.join(", "));
        output.push('}');
    }
    output.push('\n');
}
