//! Text rendering of a session's progression tree.

use std::fmt::Write;

use reharm::{depth_of, Node, NodeId, Session};

/// One line per node, children indented under their group. Chords show
/// their numeral in the session key, groups their substitution type and
/// depth. The selected node is marked with `*`.
pub fn render(session: &Session) -> String {
    let mut out = String::new();
    match session.key() {
        Some(key) => {
            let _ = writeln!(out, "key: {key}");
        }
        None => out.push_str("key: (none)\n"),
    }

    if session.progression().is_empty() {
        out.push_str("(empty progression)\n");
    }

    let selected = session.selected().map(|node| node.id());
    for node in session.progression().iter() {
        render_node(session, node, 0, selected, &mut out);
    }
    out
}

fn render_node(
    session: &Session,
    node: &Node,
    indent: usize,
    selected: Option<&NodeId>,
    out: &mut String,
) {
    let marker = if selected == Some(node.id()) { '*' } else { ' ' };
    let pad = "  ".repeat(indent);

    match node {
        Node::Chord(chord) => {
            let numeral = session
                .numeral(chord)
                .unwrap_or_else(|_| "-".to_string());
            let _ = writeln!(
                out,
                "{marker} {pad}{numeral:<6}{:<10}[{}]",
                chord.symbol(),
                chord.id
            );
        }
        Node::Group(group) => {
            let _ = writeln!(
                out,
                "{marker} {pad}{} (depth {})  [{}]",
                group.kind(),
                depth_of(node),
                group.id()
            );
            for child in group.children() {
                render_node(session, child, indent + 1, selected, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reharm::{rules, PitchTheory, SequentialIds};

    #[test]
    fn test_render_nested_tree() {
        let mut session = Session::new(PitchTheory, SequentialIds::new("n"));
        session.choose_key("C", "major").unwrap();
        let tonic = session.add_chord("C", "maj7").unwrap();
        session.request_substitution(&tonic, rules::V_I).unwrap();
        session.select(&tonic).unwrap();

        let expected = "\
key: C major
  V-I (depth 1)  [n2]
    V     G7        [n3]
*   I     Cmaj7     [n1]
";
        assert_eq!(render(&session), expected);
    }

    #[test]
    fn test_render_without_key() {
        let session = Session::new(PitchTheory, SequentialIds::new("n"));
        assert_eq!(render(&session), "key: (none)\n(empty progression)\n");
    }
}
