// Copyright (c) 2026 the idpack authors.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! A small event-driven logic circuit built on the idpack containers.
//!
//! Gates are stateless; nodes carry the values. Each gate's connections
//! live in one partition of a [`PartitionStore`]: port 0 is the output
//! node, the rest are inputs. Each node's subscriber gates form a
//! partition of a second store. Dirty sets drive the update: changed
//! nodes wake their subscriber gates, gate evaluation requests node
//! changes, and the loop runs to a fixed point.

use idpack_core::id::Id;
use idpack_core::keyed::KeyedVec;
use idpack_registry::{GrowableIdRegistry, IdSet};
use idpack_store::PartitionStore;
use serde::Serialize;

macro_rules! circuit_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(u32);

        impl Id for $name {
            const NULL: Self = $name(u32::MAX);

            #[inline]
            fn from_index(index: usize) -> Self {
                $name(<u32 as Id>::from_index(index))
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::NULL
            }
        }
    };
}

circuit_id!(
    /// A gate, unique across the circuit.
    ElementId
);
circuit_id!(
    /// A gate's dense per-kind index; the dirty sets and gate descriptions
    /// are keyed by these.
    LocalId
);
circuit_id!(
    /// A wire carrying one logic value.
    NodeId
);

/// A logic level. Nodes default to low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Logic {
    #[default]
    Low,
    High,
}

/// Multi-input gate operation.
///
/// The two XOR readings both exist in the wild: `Xor` is high when
/// exactly one input is high (literal exclusive-or), `Xor2` is the
/// parity of the inputs (chained two-input XORs).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum GateOp {
    #[default]
    And,
    Or,
    Xor,
    Xor2,
}

/// A gate: an operation plus optional output inversion, which covers
/// NAND, NOR, XNOR and NOT without extra variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GateDesc {
    pub op: GateOp,
    pub invert: bool,
}

impl GateDesc {
    pub const NAND: Self = Self {
        op: GateOp::And,
        invert: true,
    };

    pub fn eval(&self, inputs: impl Iterator<Item = Logic>) -> Logic {
        let mut total = 0usize;
        let mut high = 0usize;
        for value in inputs {
            total += 1;
            if value == Logic::High {
                high += 1;
            }
        }
        let value = match self.op {
            GateOp::And => high == total,
            GateOp::Or => high > 0,
            GateOp::Xor => high == 1,
            GateOp::Xor2 => high % 2 == 1,
        };
        if value != self.invert {
            Logic::High
        } else {
            Logic::Low
        }
    }
}

/// Which gates exist, and the element <-> local id pairing.
#[derive(Debug, Default)]
pub struct Elements {
    pub ids: GrowableIdRegistry<ElementId>,
    pub local_ids: GrowableIdRegistry<LocalId>,
    pub elem_to_local: KeyedVec<ElementId, LocalId>,
    pub local_to_elem: KeyedVec<LocalId, ElementId>,
    pub gates: KeyedVec<LocalId, GateDesc>,
}

/// Which nodes exist and how they attach to gates.
///
/// `subscribers` holds, per node, the gates reading it. `connections`
/// holds, per gate, its ports: `[output node, input nodes...]`.
#[derive(Debug)]
pub struct Nodes {
    pub ids: GrowableIdRegistry<NodeId>,
    pub subscribers: PartitionStore<NodeId, ElementId>,
    pub publisher: KeyedVec<NodeId, ElementId>,
    pub connections: PartitionStore<ElementId, NodeId>,
}

/// A complete, immutable-after-build circuit.
#[derive(Debug)]
pub struct Circuit {
    pub elements: Elements,
    pub nodes: Nodes,
}

/// Pending node writes plus the set of nodes they touch.
#[derive(Debug, Default)]
pub struct NodeChanges {
    dirty: IdSet<NodeId>,
    new_values: KeyedVec<NodeId, Logic>,
}

impl NodeChanges {
    /// Request `node` take `value` on the next [`apply_node_changes`].
    pub fn assign(&mut self, node: NodeId, value: Logic) {
        self.dirty.insert(node);
        *self.new_values.entry(node) = value;
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }
}

/// Builds a [`Circuit`], growing the underlying stores as wiring is added.
///
/// All work-in-progress state lives in this value; nothing is global.
#[derive(Debug)]
pub struct CircuitBuilder {
    elements: Elements,
    nodes: Nodes,
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBuilder {
    pub fn new() -> Self {
        Self {
            elements: Elements::default(),
            nodes: Nodes {
                ids: GrowableIdRegistry::default(),
                subscribers: PartitionStore::new(0, 0),
                publisher: KeyedVec::new(),
                connections: PartitionStore::new(0, 0),
            },
        }
    }

    /// Add a gate with `inputs` input ports. Its ports start unwired.
    pub fn add_gate(&mut self, desc: GateDesc, inputs: usize) -> ElementId {
        let elem = self.elements.ids.create();
        let local = self.elements.local_ids.create();
        *self.elements.elem_to_local.entry(elem) = local;
        *self.elements.local_to_elem.entry(local) = elem;
        *self.elements.gates.entry(local) = desc;

        grow_for(&mut self.nodes.connections, elem, 1 + inputs);
        self.nodes
            .connections
            .emplace(elem, (0..1 + inputs).map(|_| NodeId::NULL))
            .expect("connection store grown beforehand");
        elem
    }

    /// Add a node published by `publisher`'s given port (or by nothing, for
    /// an external input) and subscribed to by each `(gate, input port)`.
    pub fn add_node(
        &mut self,
        publisher: Option<(ElementId, usize)>,
        subscribers: &[(ElementId, usize)],
    ) -> NodeId {
        let node = self.nodes.ids.create();

        let pub_elem = match publisher {
            Some((elem, port)) => {
                self.nodes.connections.get_mut(elem)[port] = node;
                elem
            }
            None => ElementId::NULL,
        };
        *self.nodes.publisher.entry(node) = pub_elem;

        grow_for(&mut self.nodes.subscribers, node, subscribers.len());
        self.nodes
            .subscribers
            .emplace(node, subscribers.iter().map(|&(elem, _)| elem))
            .expect("subscriber store grown beforehand");
        for &(elem, port) in subscribers {
            self.nodes.connections.get_mut(elem)[port] = node;
        }
        node
    }

    pub fn build(self) -> Circuit {
        Circuit {
            elements: self.elements,
            nodes: self.nodes,
        }
    }
}

/// Make room in `store` for a partition of `len` elements under `id`.
fn grow_for<I: Id, T>(store: &mut PartitionStore<I, T>, id: I, len: usize) {
    if id.index() >= store.ids_capacity() {
        store.reserve_ids((id.index() + 1).max(store.ids_capacity() * 2));
    }
    let trailing = store.data_capacity() - store.data_size() - store.interior_free_len();
    if trailing < len {
        let target = (store.data_size() + len).max(store.data_capacity() * 2).max(64);
        store.reserve_data(target);
    }
}

/// Evaluate every gate in `dirty` and stage output changes for nodes whose
/// value would differ. Returns whether anything was staged.
pub fn update_gates(
    dirty: &IdSet<LocalId>,
    circuit: &Circuit,
    values: &KeyedVec<NodeId, Logic>,
    changes: &mut NodeChanges,
) -> bool {
    let mut staged = false;
    for local in dirty.iter() {
        let elem = circuit.elements.local_to_elem[local];
        let desc = circuit.elements.gates[local];
        let ports = circuit.nodes.connections.get(elem);
        let (out, inputs) = match ports.split_first() {
            Some(split) => split,
            None => continue,
        };

        let result = desc.eval(inputs.iter().map(|&n| values[n]));
        if values[*out] != result {
            changes.assign(*out, result);
            staged = true;
        }
    }
    staged
}

/// Commit staged node values and wake the gates subscribed to them.
/// Returns whether any gate was woken.
pub fn apply_node_changes(
    changes: &mut NodeChanges,
    circuit: &Circuit,
    values: &mut KeyedVec<NodeId, Logic>,
    woken: &mut IdSet<LocalId>,
) -> bool {
    let mut any = false;
    for node in changes.dirty.iter() {
        *values.entry(node) = changes.new_values[node];
        for &elem in circuit.nodes.subscribers.get(node) {
            woken.insert(circuit.elements.elem_to_local[elem]);
            any = true;
        }
    }
    changes.dirty.clear();
    any
}

/// Run the update loop until no node changes remain. Returns the number of
/// gate-evaluation rounds taken.
///
/// # Panics
///
/// Panics after 1000 rounds; a circuit that has not settled by then is
/// oscillating.
pub fn settle(
    circuit: &Circuit,
    values: &mut KeyedVec<NodeId, Logic>,
    changes: &mut NodeChanges,
) -> usize {
    let mut dirty_gates: IdSet<LocalId> = IdSet::new();
    let mut rounds = 0;
    while !changes.is_empty() {
        apply_node_changes(changes, circuit, values, &mut dirty_gates);
        if dirty_gates.is_empty() {
            break;
        }
        update_gates(&dirty_gates, circuit, values, changes);
        dirty_gates.clear();
        rounds += 1;
        assert!(rounds < 1000, "circuit did not settle; oscillation?");
    }
    rounds
}
