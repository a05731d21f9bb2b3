//! Graphviz rendering of the state graph.

use std::fmt::Write;

use crate::fsm::{CurrentState, ExpandedFsm};
use crate::utils::indent;

impl ExpandedFsm {
    /// Renders the state graph in DOT.
    ///
    /// Nodes are labelled `state / output`; edges are the transitions after state-wildcard expansion, labelled with
    /// their input pattern.
    pub fn to_dot(&self) -> String {
        let node = |state: &str| format!("\"{} / {}\"", state, self.state_output(state).unwrap_or_default());

        let mut body = String::new();
        body.push_str("graph [fontsize=10 splines=true overlap=false]\n");
        body.push_str("edge [fontsize=10 fontname=\"helvetica\"]\n");
        body.push_str("node [fontsize=10 fontname=\"helvetica\" nodesep=2.0]\n");
        body.push_str("ratio=auto\n");
        for state in self.states() {
            let _ = writeln!(body, "{}", node(state));
        }
        for tr in self.state_transitions() {
            if let CurrentState::Named(current) = &tr.current {
                let (from, to) = (node(current), node(&tr.next));
                let _ = writeln!(body, "{} -> {} [label=\"{}\" arrowhead=vee]", from, to, tr.input);
            }
        }

        format!("digraph {{\n{}\n}}\n", indent(body, 4))
    }
}

#[cfg(test)]
mod tests {
    use crate::fsm::FsmSpec;
    use crate::intf::IntfSpec;

    #[test]
    fn state_graph() {
        let intf = IntfSpec::pynq_z1();
        let fsm = FsmSpec::new()
            .input("a", "D0")
            .output("y", "D1")
            .states(["S0", "S1"])
            .transition("1", "*", "S0", "")
            .transition("0", "S0", "S1", "1")
            .validate(&intf)
            .unwrap()
            .encode(false, &intf)
            .unwrap()
            .expand()
            .unwrap();
        let dot = fsm.to_dot();

        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.contains("    \"S0 / 1\"\n"));
        assert!(dot.contains("    \"S1 / 0\"\n"));
        assert!(dot.contains("\"S0 / 1\" -> \"S1 / 0\" [label=\"0\" arrowhead=vee]"));
        assert!(dot.contains("\"S1 / 0\" -> \"S0 / 1\" [label=\"1\" arrowhead=vee]"));
        assert!(dot.ends_with("}\n"));
    }
}
