//! Call traces and the reconstructed call tree.
//!
//! A `CallTrace` is one flat record as reported by the indexer; its
//! `trace_address` locates it in the call hierarchy (`[]` = root call,
//! `[0, 2]` = third sub-call of the first sub-call). A `TraceNode` is the
//! same record re-parented into an owned tree.

use alloy_primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of call frame.
///
/// Unrecognised kinds are preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CallKind {
    Call,
    DelegateCall,
    StaticCall,
    CallCode,
    Create,
    Create2,
    SelfDestruct,
    Other(String),
}

impl CallKind {
    pub fn is_create(&self) -> bool {
        matches!(self, CallKind::Create | CallKind::Create2)
    }
}

impl From<String> for CallKind {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "CALL" => CallKind::Call,
            "DELEGATECALL" => CallKind::DelegateCall,
            "STATICCALL" => CallKind::StaticCall,
            "CALLCODE" => CallKind::CallCode,
            "CREATE" => CallKind::Create,
            "CREATE2" => CallKind::Create2,
            "SELFDESTRUCT" => CallKind::SelfDestruct,
            _ => CallKind::Other(s),
        }
    }
}

impl From<CallKind> for String {
    fn from(k: CallKind) -> Self {
        k.to_string()
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::Call => write!(f, "CALL"),
            CallKind::DelegateCall => write!(f, "DELEGATECALL"),
            CallKind::StaticCall => write!(f, "STATICCALL"),
            CallKind::CallCode => write!(f, "CALLCODE"),
            CallKind::Create => write!(f, "CREATE"),
            CallKind::Create2 => write!(f, "CREATE2"),
            CallKind::SelfDestruct => write!(f, "SELFDESTRUCT"),
            CallKind::Other(s) => write!(f, "{s}"),
        }
    }
}

/// One EVM call or sub-call as reported by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTrace {
    #[serde(rename = "type")]
    pub kind: CallKind,
    pub from: String,
    /// Empty for a CREATE whose address was not reported
    #[serde(default)]
    pub to: String,
    #[serde(with = "crate::quantity::u256_quantity", default)]
    pub value: U256,
    #[serde(default)]
    pub input: Bytes,
    #[serde(default)]
    pub output: Bytes,
    #[serde(with = "crate::quantity::u64_quantity", default)]
    pub gas_used: u64,
    /// Child indices from the root; `[]` is the top-level call
    #[serde(default)]
    pub trace_address: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallTrace {
    /// Nesting depth; the root call is depth 0.
    pub fn depth(&self) -> usize {
        self.trace_address.len()
    }

    pub fn is_root(&self) -> bool {
        self.trace_address.is_empty()
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// First four bytes of the input, if the call carries calldata.
    pub fn function_selector(&self) -> Option<[u8; 4]> {
        if self.kind.is_create() {
            return None;
        }
        self.input.get(..4).and_then(|s| s.try_into().ok())
    }
}

/// A call trace together with the calls it made, in sub-call order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceNode {
    #[serde(flatten)]
    pub trace: CallTrace,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    pub fn new(trace: CallTrace) -> Self {
        Self { trace, children: Vec::new() }
    }

    /// Sibling index of this node within its parent (`None` for the root).
    pub fn child_index(&self) -> Option<usize> {
        self.trace.trace_address.last().copied()
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TraceNode::node_count).sum::<usize>()
    }

    /// Height of the subtree; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Look up a node by its address path relative to this node.
    pub fn find(&self, path: &[usize]) -> Option<&TraceNode> {
        let mut node = self;
        for idx in path {
            node = node.children.iter().find(|c| c.child_index() == Some(*idx))?;
        }
        Some(node)
    }

    /// Pre-order traversal: parent first, then children in sub-call order.
    pub fn iter(&self) -> TraceIter<'_> {
        TraceIter { stack: vec![self] }
    }

    /// Whether any call in this subtree reported an error.
    pub fn failed(&self) -> bool {
        self.iter().any(|n| n.trace.failed())
    }

    /// The call where an error originated: the deepest failed call whose own
    /// sub-calls all succeeded. When several branches failed, the last one
    /// in execution order wins.
    pub fn error_origin(&self) -> Option<&TraceNode> {
        let mut last = None;
        for child in &self.children {
            if let Some(origin) = child.error_origin() {
                last = Some(origin);
            }
        }
        if last.is_some() {
            return last;
        }
        if self.trace.failed() {
            Some(self)
        } else {
            None
        }
    }
}

/// Pre-order iterator over a `TraceNode` subtree.
pub struct TraceIter<'a> {
    stack: Vec<&'a TraceNode>,
}

impl<'a> Iterator for TraceIter<'a> {
    type Item = &'a TraceNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(path: &[usize], error: Option<&str>) -> CallTrace {
        CallTrace {
            kind: CallKind::Call,
            from: "0x01".into(),
            to: "0x02".into(),
            value: U256::ZERO,
            input: Bytes::new(),
            output: Bytes::new(),
            gas_used: 0,
            trace_address: path.to_vec(),
            error: error.map(str::to_string),
        }
    }

    fn node(path: &[usize], error: Option<&str>, children: Vec<TraceNode>) -> TraceNode {
        TraceNode { trace: trace(path, error), children }
    }

    #[test]
    fn call_kind_roundtrip_keeps_unknown_kinds() {
        assert_eq!(CallKind::from("delegatecall".to_string()), CallKind::DelegateCall);
        let odd = CallKind::from("SUICIDE".to_string());
        assert_eq!(odd, CallKind::Other("SUICIDE".into()));
        assert_eq!(String::from(odd), "SUICIDE");
    }

    #[test]
    fn call_trace_from_indexer_json() {
        let json = r#"{
            "type": "STATICCALL",
            "from": "0xaa",
            "to": "0xbb",
            "value": "0x0",
            "gasUsed": "0x5208",
            "input": "0x70a08231000000000000000000000000000000000000000000000000000000000000dead",
            "output": "0x",
            "traceAddress": [0, 1]
        }"#;
        let t: CallTrace = serde_json::from_str(json).unwrap();
        assert_eq!(t.kind, CallKind::StaticCall);
        assert_eq!(t.gas_used, 21000);
        assert_eq!(t.depth(), 2);
        assert_eq!(t.function_selector(), Some([0x70, 0xa0, 0x82, 0x31]));
        assert!(!t.failed());
    }

    #[test]
    fn malformed_value_is_rejected() {
        let json = r#"{"type":"CALL","from":"0xaa","value":"ten","traceAddress":[]}"#;
        assert!(serde_json::from_str::<CallTrace>(json).is_err());
    }

    #[test]
    fn tree_helpers() {
        let root = node(
            &[],
            None,
            vec![
                node(&[0], None, vec![node(&[0, 0], None, vec![])]),
                node(&[1], None, vec![]),
            ],
        );
        assert_eq!(root.node_count(), 4);
        assert_eq!(root.depth(), 2);
        assert!(root.find(&[0, 0]).is_some());
        assert!(root.find(&[1, 0]).is_none());

        let order: Vec<Vec<usize>> = root.iter().map(|n| n.trace.trace_address.clone()).collect();
        assert_eq!(order, vec![vec![], vec![0], vec![0, 0], vec![1]]);
    }

    #[test]
    fn error_origin_is_deepest_failure() {
        let root = node(
            &[],
            Some("execution reverted"),
            vec![
                node(&[0], None, vec![]),
                node(&[1], Some("execution reverted"), vec![node(&[1, 0], Some("out of gas"), vec![])]),
            ],
        );
        let origin = root.error_origin().unwrap();
        assert_eq!(origin.trace.trace_address, vec![1, 0]);
        assert!(root.failed());
        assert!(root.find(&[0]).unwrap().error_origin().is_none());
    }
}
