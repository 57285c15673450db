// Generic directed graph with dense node ids and Tarjan SCC discovery.
// Stores each node's payload by value rather than behind an owning
// pointer.

use std::collections::HashSet;

/// Dense, monotonically increasing node identifier assigned at insertion.
pub type NodeId = usize;

/// Edges are add-only during a single detection pass; the detector rebuilds
/// the graph each pass rather than mutating an existing one.
pub struct DirectedGraph<T> {
    payloads: Vec<T>,
    outgoing: Vec<HashSet<NodeId>>,
}

impl<T> DirectedGraph<T> {
    pub fn new() -> Self {
        Self {
            payloads: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn add_node(&mut self, payload: T) -> NodeId {
        self.payloads.push(payload);
        self.outgoing.push(HashSet::new());
        self.payloads.len() - 1
    }

    /// Idempotent per (from, to) pair.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.outgoing[from].insert(to);
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.outgoing[from].contains(&to)
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing[node].iter().copied()
    }

    pub fn payload(&self, node: NodeId) -> &T {
        &self.payloads[node]
    }

    pub fn size(&self) -> usize {
        self.payloads.len()
    }
}

impl<T> Default for DirectedGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Component id, dense in `[0, component_count())`. The reverse-topological
/// guarantee (component 0 is a sink in the condensation) falls out of
/// Tarjan's algorithm assigning ids in the order components finish.
pub type ComponentId = usize;

pub struct StronglyConnectedComponents {
    component_of: Vec<ComponentId>,
    components: Vec<Vec<NodeId>>,
}

struct TarjanState {
    index_counter: usize,
    index: Vec<Option<usize>>,
    low_link: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<NodeId>,
    components: Vec<Vec<NodeId>>,
}

impl StronglyConnectedComponents {
    /// Runs Tarjan's algorithm: depth-first with a stack of currently-active
    /// nodes, preorder numbering, and low-link propagation. O(V+E), single
    /// pass; results are immutable once computed.
    pub fn discover<T>(graph: &DirectedGraph<T>) -> Self {
        let n = graph.size();
        let mut state = TarjanState {
            index_counter: 0,
            index: vec![None; n],
            low_link: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            components: Vec::new(),
        };

        for node in 0..n {
            if state.index[node].is_none() {
                strong_connect(graph, node, &mut state);
            }
        }

        let mut component_of = vec![0; n];
        for (component_id, members) in state.components.iter().enumerate() {
            for &member in members {
                component_of[member] = component_id;
            }
        }

        Self {
            component_of,
            components: state.components,
        }
    }

    pub fn component_of(&self, node: NodeId) -> ComponentId {
        self.component_of[node]
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[Vec<NodeId>] {
        &self.components
    }
}

fn strong_connect<T>(graph: &DirectedGraph<T>, v: NodeId, state: &mut TarjanState) {
    state.index[v] = Some(state.index_counter);
    state.low_link[v] = state.index_counter;
    state.index_counter += 1;
    state.stack.push(v);
    state.on_stack[v] = true;

    for w in graph.neighbors(v) {
        if state.index[w].is_none() {
            strong_connect(graph, w, state);
            state.low_link[v] = state.low_link[v].min(state.low_link[w]);
        } else if state.on_stack[w] {
            state.low_link[v] = state.low_link[v].min(state.index[w].unwrap());
        }
    }

    if state.low_link[v] == state.index[v].unwrap() {
        let mut component = Vec::new();
        loop {
            let w = state.stack.pop().unwrap();
            state.on_stack[w] = false;
            component.push(w);
            if w == v {
                break;
            }
        }
        state.components.push(component);
    }
}
