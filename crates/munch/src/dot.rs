//! Minimal Graphviz DOT writer for visualizing automata

use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt::{self, Display},
};

use indexmap::IndexMap;

macro_rules! attr {
    ($id:ident, $name:literal) => {
        #[doc = concat!("Set the `", $name, "` attribute")]
        pub fn $id<S: Into<Cow<'a, str>>>(&mut self, $id: S) -> &mut Self {
            self.attrs.insert($name, $id.into());
            self
        }
    };
}

/// Whether edges have a direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphType {
    /// A `graph` with `--` edges
    Undirected,
    /// A `digraph` with `->` edges
    Directed,
}

impl GraphType {
    fn edge_op(self) -> &'static str {
        match self {
            Self::Undirected => "--",
            Self::Directed => "->",
        }
    }
}

impl Display for GraphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Undirected => "graph",
            Self::Directed => "digraph",
        })
    }
}

type Attrs<'a> = BTreeMap<&'static str, Cow<'a, str>>;

fn write_attrs(f: &mut fmt::Formatter, attrs: &Attrs) -> fmt::Result {
    for (i, (key, val)) in attrs.iter().enumerate() {
        f.write_str(if i == 0 { "[" } else { "," })?;
        write!(f, "{key}={val:?}")?;
    }

    if attrs.is_empty() { Ok(()) } else { f.write_str("]") }
}

/// A graph document, written out by its `Display` impl
#[derive(Debug)]
pub struct Graph<'a> {
    ty: GraphType,
    attrs: Attrs<'a>,
    nodes: IndexMap<Cow<'a, str>, Node<'a>>,
    edges: IndexMap<(Cow<'a, str>, Cow<'a, str>), Vec<Edge<'a>>>,
}

impl<'a> Graph<'a> {
    attr!(label, "label");

    attr!(rankdir, "rankdir");

    /// An empty graph
    #[must_use]
    pub fn new(ty: GraphType) -> Self {
        Self {
            ty,
            attrs: BTreeMap::new(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
        }
    }

    /// The node with the given id, added if it does not exist yet
    #[inline]
    pub fn node<S: Into<Cow<'a, str>>>(&mut self, id: S) -> &mut Node<'a> {
        self.nodes.entry(id.into()).or_default()
    }

    /// Add an edge, creating either endpoint if needed.  Repeated edges
    /// between the same nodes are all kept.
    pub fn edge<L: Into<Cow<'a, str>>, R: Into<Cow<'a, str>>>(
        &mut self,
        l: L,
        r: R,
    ) -> &mut Edge<'a> {
        let l = l.into();
        let r = r.into();
        self.node(l.clone());
        self.node(r.clone());
        let edges = self.edges.entry((l, r)).or_default();
        edges.push(Edge::default());
        edges.last_mut().unwrap_or_else(|| unreachable!())
    }

    /// Lay out an automaton.  Each node is `(id, label, accepting, edges)`,
    /// with edges given as `(input, target id)`.
    pub(crate) fn state_machine<L, E: IntoIterator<Item = (L, u32)>>(
        nodes: impl IntoIterator<Item = (u32, Cow<'a, str>, bool, E)>,
        start: u32,
        fmt_input: impl Fn(L) -> Cow<'a, str>,
    ) -> Self {
        let mut graph = Self::new(GraphType::Directed);
        graph.rankdir("LR");

        for (id, label, accept, edges) in nodes {
            let id = Cow::from(id.to_string());
            let node = graph.node(id.clone()).label(label);
            if accept {
                node.border_count("2");
            }

            for (input, to) in edges {
                graph.edge(id.clone(), to.to_string()).label(fmt_input(input));
            }
        }

        let start_id = Cow::from("_start");
        graph
            .node(start_id.clone())
            .style("invis")
            .shape("point")
            .label("");
        graph.edge(start_id, start.to_string());

        graph
    }
}

impl Display for Graph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            ty,
            attrs,
            nodes,
            edges,
        } = self;

        write!(f, "{ty} {{")?;

        for (key, val) in attrs {
            write!(f, "{key}={val:?};")?;
        }

        for (id, Node { attrs }) in nodes {
            write!(f, "{id:?}")?;
            write_attrs(f, attrs)?;
            f.write_str(";")?;
        }

        for ((l, r), edges) in edges {
            for Edge { attrs } in edges {
                write!(f, "{l:?}{}{r:?}", ty.edge_op())?;
                write_attrs(f, attrs)?;
                f.write_str(";")?;
            }
        }

        f.write_str("}")
    }
}

/// Attributes of a single node
#[derive(Debug, Default)]
pub struct Node<'a> {
    attrs: Attrs<'a>,
}

impl<'a> Node<'a> {
    attr!(style, "style");

    attr!(shape, "shape");

    attr!(label, "label");

    attr!(border_count, "peripheries");
}

/// Attributes of a single edge
#[derive(Debug, Default)]
pub struct Edge<'a> {
    attrs: Attrs<'a>,
}

impl<'a> Edge<'a> {
    attr!(style, "style");

    attr!(label, "label");
}

#[cfg(test)]
mod test {
    use std::borrow::Cow;

    use super::{Graph, GraphType};
    use crate::re;

    #[test]
    fn writes_attributes() {
        let mut graph = Graph::new(GraphType::Undirected);
        graph.label("g");
        graph.node("a").shape("box").label("A");
        graph.edge("a", "b").style("dashed");

        assert_eq!(
            graph.to_string(),
            r#"graph {label="g";"a"[label="A",shape="box"];"b";"a"--"b"[style="dashed"];}"#,
        );
    }

    #[test]
    fn dfa_graph_hides_sink() {
        let dfa = re::parse("ab").unwrap().thompson().compile();
        let dot = dfa
            .dot(|c| Cow::Owned(c.to_string()), |n| format!("{n:?}").into())
            .to_string();

        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("\"_start\""));
        assert!(dot.contains("peripheries=\"2\""));
        // start, after 'a', after 'b', with the sink left out
        assert_eq!(dot.matches("label=\"a\"").count(), 1);
        assert_eq!(dot.matches("label=\"b\"").count(), 1);
        assert!(!dot.contains("label=\"{}\""));
    }

    #[test]
    fn nfa_graph_labels_epsilon() {
        let nfa = re::parse("a|b").unwrap().thompson();
        let dot = nfa
            .dot(|c| Cow::Owned(c.to_string()), |n| n.to_string().into())
            .to_string();

        assert_eq!(dot.matches("label=\"ϵ\"").count(), 2);
    }
}
