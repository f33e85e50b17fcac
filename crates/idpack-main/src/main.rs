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

mod circuit;

use circuit::{
    settle, Circuit, CircuitBuilder, ElementId, GateDesc, GateOp, Logic, NodeChanges, NodeId,
};
use idpack_core::keyed::KeyedVec;
use idpack_store::PartitionStore;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::{fs::File, io::BufWriter, time::Instant};
use tracing_subscriber::EnvFilter;

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[derive(Debug, Clone, Serialize)]
struct TruthRow {
    a: bool,
    b: bool,
    out: bool,
    rounds: usize,
}

#[derive(Debug, Clone, Serialize)]
struct CircuitRunResult {
    seed: u64,
    inputs: usize,
    gates: usize,
    nodes: usize,
    toggles: usize,
    total_rounds: usize,
    elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
struct StoreChurnResult {
    seed: u64,
    ops: usize,
    pack_calls: usize,
    final_ids: usize,
    final_data: usize,
    interior_free_before_final_pack: usize,
    elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
struct RunReport {
    description: String,
    truth_table: Vec<TruthRow>,
    random_circuit: CircuitRunResult,
    store_churn: StoreChurnResult,
}

/// XOR out of four NANDs, the classic four-gate construction.
fn build_nand_xor() -> (Circuit, NodeId, NodeId, NodeId) {
    let mut builder = CircuitBuilder::new();
    let g0 = builder.add_gate(GateDesc::NAND, 2);
    let g1 = builder.add_gate(GateDesc::NAND, 2);
    let g2 = builder.add_gate(GateDesc::NAND, 2);
    let g3 = builder.add_gate(GateDesc::NAND, 2);

    let a = builder.add_node(None, &[(g0, 1), (g1, 1)]);
    let b = builder.add_node(None, &[(g0, 2), (g2, 1)]);
    let _m = builder.add_node(Some((g0, 0)), &[(g1, 2), (g2, 2)]);
    let _p = builder.add_node(Some((g1, 0)), &[(g3, 1)]);
    let _q = builder.add_node(Some((g2, 0)), &[(g3, 2)]);
    let out = builder.add_node(Some((g3, 0)), &[]);
    (builder.build(), a, b, out)
}

fn run_truth_table() -> Vec<TruthRow> {
    let (circuit, a, b, out) = build_nand_xor();
    let mut values: KeyedVec<NodeId, Logic> = KeyedVec::new();
    values.resize_default(circuit.nodes.ids.capacity());

    let mut rows = Vec::new();
    for (in_a, in_b) in [(false, false), (false, true), (true, false), (true, true)] {
        let mut changes = NodeChanges::default();
        changes.assign(a, if in_a { Logic::High } else { Logic::Low });
        changes.assign(b, if in_b { Logic::High } else { Logic::Low });
        let rounds = settle(&circuit, &mut values, &mut changes);
        rows.push(TruthRow {
            a: in_a,
            b: in_b,
            out: values[out] == Logic::High,
            rounds,
        });
    }
    rows
}

struct GatePlan {
    desc: GateDesc,
    /// Node indices feeding the input ports.
    inputs: Vec<usize>,
}

/// A random acyclic circuit: every gate reads only nodes defined before
/// its own output node, so it always settles.
fn build_random_circuit(
    seed: u64,
    n_inputs: usize,
    n_gates: usize,
) -> (Circuit, Vec<NodeId>, usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let ops = [GateOp::And, GateOp::Or, GateOp::Xor, GateOp::Xor2];
    let mut plans: Vec<GatePlan> = Vec::with_capacity(n_gates);
    for g in 0..n_gates {
        let available = n_inputs + g;
        let arity = rng.random_range(2..=3.min(available).max(2));
        let inputs = (0..arity).map(|_| rng.random_range(0..available)).collect();
        plans.push(GatePlan {
            desc: GateDesc {
                op: ops[rng.random_range(0..ops.len())],
                invert: rng.random_bool(0.5),
            },
            inputs,
        });
    }

    // Invert the plan: which (gate, port) pairs read each node.
    let total_nodes = n_inputs + n_gates;
    let mut readers: Vec<Vec<(usize, usize)>> = vec![Vec::new(); total_nodes];
    for (g, plan) in plans.iter().enumerate() {
        for (slot, &node_ix) in plan.inputs.iter().enumerate() {
            readers[node_ix].push((g, 1 + slot));
        }
    }

    let mut builder = CircuitBuilder::new();
    let elems: Vec<ElementId> = plans
        .iter()
        .map(|plan| builder.add_gate(plan.desc, plan.inputs.len()))
        .collect();

    let mut node_ids = Vec::with_capacity(total_nodes);
    for node_ix in 0..total_nodes {
        let publisher = (node_ix >= n_inputs).then(|| (elems[node_ix - n_inputs], 0));
        let subs: Vec<(ElementId, usize)> = readers[node_ix]
            .iter()
            .map(|&(g, port)| (elems[g], port))
            .collect();
        node_ids.push(builder.add_node(publisher, &subs));
    }

    let inputs = node_ids[..n_inputs].to_vec();
    (builder.build(), inputs, total_nodes)
}

fn run_random_circuit(seed: u64, n_inputs: usize, n_gates: usize, toggles: usize) -> CircuitRunResult {
    let started = Instant::now();
    let (circuit, inputs, total_nodes) = build_random_circuit(seed, n_inputs, n_gates);
    let mut values: KeyedVec<NodeId, Logic> = KeyedVec::new();
    values.resize_default(circuit.nodes.ids.capacity());

    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0xF11B);
    let mut total_rounds = 0;
    let mut changes = NodeChanges::default();

    // Drive all gates once from the all-low state.
    for &input in &inputs {
        changes.assign(input, Logic::Low);
    }
    total_rounds += settle(&circuit, &mut values, &mut changes);

    for _ in 0..toggles {
        let input = inputs[rng.random_range(0..inputs.len())];
        let flipped = match values[input] {
            Logic::Low => Logic::High,
            Logic::High => Logic::Low,
        };
        changes.assign(input, flipped);
        total_rounds += settle(&circuit, &mut values, &mut changes);
    }

    CircuitRunResult {
        seed,
        inputs: n_inputs,
        gates: n_gates,
        nodes: total_nodes,
        toggles,
        total_rounds,
        elapsed_ms: started.elapsed().as_millis(),
    }
}

/// Fragment and repack a store under random churn, the workload the
/// budgeted pack exists for.
fn run_store_churn(seed: u64, ops: usize) -> StoreChurnResult {
    let started = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut store: PartitionStore<u32, u64> = PartitionStore::new(256, 8192);
    let mut pack_calls = 0;

    for step in 0..ops {
        let id = rng.random_range(0..256u32);
        if store.contains(id) {
            store.erase(id);
        } else {
            let len = rng.random_range(1..24usize);
            let payload = (0..len).map(|i| i as u64 + u64::from(id));
            if store.emplace(id, payload).is_err() {
                store.pack(usize::MAX);
                pack_calls += 1;
            }
        }
        if step % 16 == 0 {
            store.pack(rng.random_range(0..64));
            pack_calls += 1;
        }
    }

    let interior_before = store.interior_free_len();
    store.pack(usize::MAX);
    pack_calls += 1;
    assert_eq!(store.interior_free_len(), 0);

    StoreChurnResult {
        seed,
        ops,
        pack_calls,
        final_ids: store.ids_count(),
        final_data: store.data_size(),
        interior_free_before_final_pack: interior_before,
        elapsed_ms: started.elapsed().as_millis(),
    }
}

fn main() {
    enable_tracing();

    let truth_table = run_truth_table();
    for row in &truth_table {
        assert_eq!(row.out, row.a ^ row.b, "NAND-built XOR disagrees");
    }

    let random_circuit = run_random_circuit(42, 16, 400, 2_000);
    let store_churn = run_store_churn(43, 50_000);

    let report = RunReport {
        description: "idpack demo: NAND-built XOR truth table, random acyclic circuit settling, \
                      and partition store churn with budgeted packing."
            .into(),
        truth_table,
        random_circuit,
        store_churn,
    };

    let file = File::create("idpack_report.json").expect("create idpack_report.json");
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report).expect("write json report");

    println!();
    println!("================== idpack demo done ==================");
    println!(
        "xor truth table: {:?}",
        report
            .truth_table
            .iter()
            .map(|r| u8::from(r.out))
            .collect::<Vec<_>>()
    );
    println!(
        "random circuit: {} gates settled {} toggles in {} rounds",
        report.random_circuit.gates,
        report.random_circuit.toggles,
        report.random_circuit.total_rounds
    );
    println!(
        "store churn: {} ops, {} pack calls, {} elements live",
        report.store_churn.ops, report.store_churn.pack_calls, report.store_churn.final_data
    );
    println!("Wrote: idpack_report.json");
}
