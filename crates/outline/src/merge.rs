use crate::types::OutlineElement;

/// Insert `candidate` into the sorted `siblings`, or merge it into the
/// element that already occupies the same site.
///
/// A site is identified by its [`OrderKey`](crate::OrderKey). On a match the
/// existing element survives: it gains `project`, the candidate's children
/// are merged into its children, and the candidate's own features are
/// dropped. Returns the canonical element for the site.
pub fn merge_into<'a>(
    siblings: &'a mut Vec<OutlineElement>,
    mut candidate: OutlineElement,
    project: &str,
) -> &'a mut OutlineElement {
    let search = {
        let key = candidate.order_key();
        siblings.binary_search_by(|sibling| sibling.order_key().cmp(&key))
    };

    match search {
        Ok(index) => {
            let existing = &mut siblings[index];
            existing.projects.insert(project);
            for child in candidate.children {
                merge_into(&mut existing.children, child, project);
            }
            existing
        }
        Err(index) => {
            candidate.projects.insert(project);
            siblings.insert(index, candidate);
            &mut siblings[index]
        }
    }
}

/// Whether `siblings` are strictly ordered by site
pub fn is_sorted(siblings: &[OutlineElement]) -> bool {
    siblings
        .windows(2)
        .all(|pair| pair[0].order_key() < pair[1].order_key())
}
