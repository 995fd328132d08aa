//! Call-tree reconstruction from a flat, unordered trace list.
//!
//! Each trace carries its `traceAddress`: the child indices leading to it from
//! the root call (`[]`). Sorting by that path puts every ancestor before its
//! descendants and siblings in index order, so a single pass can attach each
//! trace below the node it names.

use chainlens_core::{
    error::TraceGraphError,
    trace::{CallTrace, TraceNode},
};

/// Build the call tree.
///
/// Fails with `MissingRoot` when no trace has path `[]`, `DuplicateTrace`
/// when two traces share a path, and `MissingAncestor` when a trace's parent
/// path is absent. The result depends only on the set of paths, never on the
/// input order.
pub fn build(mut traces: Vec<CallTrace>) -> Result<TraceNode, TraceGraphError> {
    // Vec<usize> ordering is lexicographic: a prefix sorts before its extensions
    traces.sort_by(|a, b| a.trace_address.cmp(&b.trace_address));

    if let Some(pair) = traces
        .windows(2)
        .find(|w| w[0].trace_address == w[1].trace_address)
    {
        return Err(TraceGraphError::DuplicateTrace {
            path: pair[0].trace_address.clone(),
        });
    }

    let mut iter = traces.into_iter();
    let mut root = match iter.next() {
        Some(first) if first.is_root() => TraceNode::new(first),
        _ => return Err(TraceGraphError::MissingRoot),
    };

    for trace in iter {
        attach(&mut root, trace)?;
    }
    Ok(root)
}

/// Walk from `root` along the parent path of `trace` and append it there.
fn attach(root: &mut TraceNode, trace: CallTrace) -> Result<(), TraceGraphError> {
    let path = &trace.trace_address;
    let parent_len = path.len() - 1;

    let mut node = root;
    for (depth, &idx) in path[..parent_len].iter().enumerate() {
        // Input is sorted, so a present ancestor is always the newest sibling
        node = match node.children.last_mut() {
            Some(child) if child.child_index() == Some(idx) => child,
            _ => {
                return Err(TraceGraphError::MissingAncestor {
                    path: path.clone(),
                    ancestor: path[..=depth].to_vec(),
                })
            }
        };
    }

    node.children.push(TraceNode::new(trace));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, U256};
    use chainlens_core::trace::CallKind;

    fn trace(path: &[usize]) -> CallTrace {
        CallTrace {
            kind: if path.is_empty() { CallKind::Call } else { CallKind::StaticCall },
            from: "0x01".into(),
            to: format!("0x{:02x}", path.len()),
            value: U256::ZERO,
            input: Bytes::new(),
            output: Bytes::new(),
            gas_used: 21_000,
            trace_address: path.to_vec(),
            error: None,
        }
    }

    fn paths(node: &TraceNode) -> Vec<Vec<usize>> {
        node.iter().map(|n| n.trace.trace_address.clone()).collect()
    }

    fn sample() -> Vec<CallTrace> {
        vec![
            trace(&[]),
            trace(&[0]),
            trace(&[0, 0]),
            trace(&[0, 1]),
            trace(&[0, 1, 0]),
            trace(&[1]),
            trace(&[2]),
            trace(&[2, 0]),
        ]
    }

    #[test]
    fn builds_nested_tree() {
        let root = build(sample()).unwrap();
        assert_eq!(root.node_count(), 8);
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.find(&[0, 1]).unwrap().children.len(), 1);
        assert_eq!(root.depth(), 3);
        assert_eq!(
            paths(&root),
            vec![
                vec![],
                vec![0],
                vec![0, 0],
                vec![0, 1],
                vec![0, 1, 0],
                vec![1],
                vec![2],
                vec![2, 0],
            ]
        );
    }

    #[test]
    fn any_permutation_builds_the_same_tree() {
        let expected = build(sample()).unwrap();
        let mut input = sample();
        // Rotate and reverse to cover descendant-before-ancestor orderings
        for shift in 0..input.len() {
            input.rotate_left(1);
            assert_eq!(build(input.clone()).unwrap(), expected, "rotation {shift}");
            let mut reversed = input.clone();
            reversed.reverse();
            assert_eq!(build(reversed).unwrap(), expected, "reversed rotation {shift}");
        }
    }

    #[test]
    fn root_only() {
        let root = build(vec![trace(&[])]).unwrap();
        assert_eq!(root.node_count(), 1);
        assert!(root.children.is_empty());
    }

    #[test]
    fn sparse_siblings_are_allowed() {
        let root = build(vec![trace(&[]), trace(&[3]), trace(&[0])]).unwrap();
        let idx: Vec<Option<usize>> = root.children.iter().map(TraceNode::child_index).collect();
        assert_eq!(idx, vec![Some(0), Some(3)]);
    }

    #[test]
    fn missing_ancestor() {
        let err = build(vec![trace(&[]), trace(&[0, 1])]).unwrap_err();
        assert_eq!(
            err,
            TraceGraphError::MissingAncestor { path: vec![0, 1], ancestor: vec![0] }
        );
    }

    #[test]
    fn missing_deep_ancestor_names_first_gap() {
        let err = build(vec![trace(&[]), trace(&[1]), trace(&[1, 0, 2])]).unwrap_err();
        assert_eq!(
            err,
            TraceGraphError::MissingAncestor { path: vec![1, 0, 2], ancestor: vec![1, 0] }
        );
    }

    #[test]
    fn ancestor_behind_later_sibling_is_missing() {
        // [0] exists but [1] sorts after it; [1, 0] has no [1]
        let err = build(vec![trace(&[]), trace(&[0]), trace(&[1, 0])]).unwrap_err();
        assert!(matches!(err, TraceGraphError::MissingAncestor { ancestor, .. } if ancestor == vec![1]));
    }

    #[test]
    fn duplicate_path() {
        let err = build(vec![trace(&[]), trace(&[0]), trace(&[0])]).unwrap_err();
        assert_eq!(err, TraceGraphError::DuplicateTrace { path: vec![0] });
    }

    #[test]
    fn duplicate_root() {
        let err = build(vec![trace(&[]), trace(&[])]).unwrap_err();
        assert_eq!(err, TraceGraphError::DuplicateTrace { path: vec![] });
    }

    #[test]
    fn missing_root() {
        assert_eq!(build(vec![]).unwrap_err(), TraceGraphError::MissingRoot);
        assert_eq!(build(vec![trace(&[0])]).unwrap_err(), TraceGraphError::MissingRoot);
    }
}
