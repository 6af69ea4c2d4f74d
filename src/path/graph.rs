use std::collections::{HashMap, HashSet};

use crate::error::{EngineError, EngineResult};
use crate::types::ContentItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Done,
}

/// Fails on the first prerequisite id that names no item in `items`.
pub fn validate_references(items: &[ContentItem]) -> EngineResult<()> {
    let ids: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();

    for item in items {
        if let Some(missing) = item
            .prerequisites
            .iter()
            .find(|prereq| !ids.contains(prereq.as_str()))
        {
            return Err(EngineError::UnresolvedPrerequisite {
                content_id: item.id.clone(),
                prerequisite_id: missing.clone(),
            });
        }
    }

    Ok(())
}

/// Depth-first ordering: each item is emitted after all of its prerequisites.
///
/// Items are visited in input order, so the input order decides placement among
/// items that do not depend on each other. Repeated ids keep their first
/// occurrence. Prerequisite ids outside `items` are ignored here; run
/// [`validate_references`] first to reject them.
pub fn topological_order(items: Vec<ContentItem>) -> EngineResult<Vec<ContentItem>> {
    let order = {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            index.entry(item.id.as_str()).or_insert(i);
        }

        let mut states: Vec<Option<VisitState>> = vec![None; items.len()];
        let mut stack = Vec::new();
        let mut order = Vec::with_capacity(items.len());

        for (i, item) in items.iter().enumerate() {
            if index.get(item.id.as_str()) != Some(&i) {
                continue;
            }
            visit(i, &items, &index, &mut states, &mut stack, &mut order)?;
        }
        order
    };

    let mut slots: Vec<Option<ContentItem>> = items.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

fn visit(
    i: usize,
    items: &[ContentItem],
    index: &HashMap<&str, usize>,
    states: &mut [Option<VisitState>],
    stack: &mut Vec<usize>,
    order: &mut Vec<usize>,
) -> EngineResult<()> {
    match states[i] {
        Some(VisitState::Done) => return Ok(()),
        Some(VisitState::Visiting) => {
            let start = stack.iter().position(|&s| s == i).unwrap_or(0);
            let mut cycle: Vec<String> = stack[start..].iter().map(|&s| items[s].id.clone()).collect();
            cycle.push(items[i].id.clone());
            return Err(EngineError::CyclicPrerequisites { cycle });
        }
        None => {}
    }

    states[i] = Some(VisitState::Visiting);
    stack.push(i);

    for prereq in &items[i].prerequisites {
        if let Some(&p) = index.get(prereq.as_str()) {
            visit(p, items, index, states, stack, order)?;
        }
    }

    stack.pop();
    states[i] = Some(VisitState::Done);
    order.push(i);
    Ok(())
}

/// True when every prerequisite present in `items` appears strictly earlier.
pub fn is_topologically_ordered(items: &[ContentItem]) -> bool {
    let position: HashMap<&str, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id.as_str(), i))
        .collect();

    items.iter().enumerate().all(|(i, item)| {
        item.prerequisites
            .iter()
            .filter_map(|p| position.get(p.as_str()))
            .all(|&p| p < i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentType, Modality};

    fn node(id: &str, prereqs: &[&str]) -> ContentItem {
        prereqs.iter().fold(
            ContentItem::new(id, ContentType::Practice, Modality::Visual, 0.5, 10.0),
            |item, p| item.with_prerequisite(*p),
        )
    }

    fn ids(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_prerequisites_pulled_forward() {
        let items = vec![node("c", &["b"]), node("a", &[]), node("b", &["a"])];
        let ordered = topological_order(items).unwrap();
        assert_eq!(ids(&ordered), vec!["a", "b", "c"]);
        assert!(is_topologically_ordered(&ordered));
    }

    #[test]
    fn test_independent_nodes_keep_input_order() {
        let items = vec![node("x", &[]), node("y", &[]), node("z", &[])];
        let ordered = topological_order(items).unwrap();
        assert_eq!(ids(&ordered), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_diamond_visits_shared_prerequisite_once() {
        let items = vec![
            node("d", &["b", "c"]),
            node("b", &["a"]),
            node("c", &["a"]),
            node("a", &[]),
        ];
        let ordered = topological_order(items).unwrap();
        assert_eq!(ids(&ordered), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let items = vec![node("a", &[]), node("a", &["zzz"]), node("b", &["a"])];
        let ordered = topological_order(items).unwrap();
        assert_eq!(ids(&ordered), vec!["a", "b"]);
        assert!(ordered[0].prerequisites.is_empty());
    }

    #[test]
    fn test_cycle_reported() {
        let items = vec![node("a", &["c"]), node("b", &["a"]), node("c", &["b"])];
        let err = topological_order(items).unwrap_err();
        match err {
            EngineError::CyclicPrerequisites { cycle } => {
                assert_eq!(cycle.first(), cycle.last());
                assert_eq!(cycle.len(), 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let err = topological_order(vec![node("a", &["a"])]).unwrap_err();
        assert!(matches!(err, EngineError::CyclicPrerequisites { .. }));
    }

    #[test]
    fn test_validate_references() {
        assert!(validate_references(&[node("a", &[]), node("b", &["a"])]).is_ok());
        let err = validate_references(&[node("b", &["ghost"])]).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnresolvedPrerequisite {
                content_id: "b".to_string(),
                prerequisite_id: "ghost".to_string(),
            }
        );
    }
}
