use crate::spritemoji::dom::{Document, NodeId};

/// Every text node under `root`, in document order.
pub fn collect_text_leaves(doc: &Document, root: NodeId) -> Vec<NodeId> {
    collect_text_leaves_skipping::<&str>(doc, root, &[])
}

/// Like [`collect_text_leaves`], but does not descend into elements whose
/// tag name is listed in `skip` (case-insensitive).
pub fn collect_text_leaves_skipping<S: AsRef<str>>(
    doc: &Document,
    root: NodeId,
    skip: &[S],
) -> Vec<NodeId> {
    let mut leaves = vec![];
    walk(doc, root, skip, &mut leaves);
    leaves
}

fn walk<S: AsRef<str>>(doc: &Document, node: NodeId, skip: &[S], leaves: &mut Vec<NodeId>) {
    for child in doc.children(node) {
        if doc.is_text(child) {
            leaves.push(child);
            continue;
        }

        let skipped = doc.element(child).is_some_and(|el| {
            skip.iter()
                .any(|name| name.as_ref().eq_ignore_ascii_case(el.local_name()))
        });
        if !skipped {
            walk(doc, child, skip, leaves);
        }
    }
}
