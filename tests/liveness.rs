//! Integration tests: liveness over parsed IR.

use ssa_liveness::analysis::{max_live, update_inst};
use ssa_liveness::entity::EntityRef;
use ssa_liveness::frontend::parse_function;
use ssa_liveness::{
    BitSetOptions, Block, FunctionBody, Liveness, LivenessOptions, OperandKind, SparseBitSet,
    Value,
};
use std::path::PathBuf;

fn get_irs() -> Vec<PathBuf> {
    let test_dir = std::env::current_dir().unwrap().join("tests").join("ir");
    let mut ret = vec![];
    for item in std::fs::read_dir(test_dir).unwrap() {
        let path = item.unwrap().path();
        if path.extension().and_then(|s| s.to_str()) == Some("ir") {
            ret.push(path);
        }
    }
    ret.sort(); // Deterministic test order.
    ret
}

fn load(name: &str) -> FunctionBody {
    let path = std::env::current_dir()
        .unwrap()
        .join("tests")
        .join("ir")
        .join(name);
    parse_function(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn v(n: usize) -> Value {
    Value::new(n)
}

fn b(n: usize) -> Block {
    Block::new(n)
}

/// The set flowing backward out of `block` along its `edge`-th incoming
/// edge.
fn edge_set(body: &FunctionBody, liveness: &Liveness, block: Block, edge: usize) -> SparseBitSet {
    let mut live = liveness.live_in(block).clone();
    let def = &body.blocks[block];
    for phi in def.phis() {
        live.remove(phi.dests[0].as_u32());
    }
    for phi in def.phis() {
        if let Some(value) = phi.srcs[edge].as_value() {
            live.insert(value.as_u32());
        }
    }
    live
}

/// Check that the results are the least fixed point of the dataflow
/// equations: every live-out is exactly the union of what flows back
/// along its outgoing edges, and every live-in is its block's live-out
/// stepped backward through the block.
fn check_fixed_point(body: &FunctionBody, liveness: &Liveness) {
    let capacity = body.num_values as u32;
    for (block, def) in body.blocks.entries() {
        let mut expected_out = SparseBitSet::new(capacity);
        for &succ in &def.succs {
            for (edge, &pred) in body.blocks[succ].preds.iter().enumerate() {
                if pred == block {
                    expected_out.union_with(&edge_set(body, liveness, succ, edge));
                }
            }
        }
        assert_eq!(
            &expected_out,
            liveness.live_out(block),
            "live-out of {}",
            block
        );

        let mut scratch = body.clone();
        let mut expected_in = liveness.live_out(block).clone();
        for inst in (def.num_phis()..def.insts.len()).rev() {
            update_inst(&mut expected_in, &mut scratch, block, inst);
        }
        assert_eq!(&expected_in, liveness.live_in(block), "live-in of {}", block);
    }
}

#[test]
fn fixed_point_on_all_inputs() {
    let _ = env_logger::try_init();
    for path in get_irs() {
        log::debug!("checking {}", path.display());
        let mut body = parse_function(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let liveness = Liveness::compute(&mut body);
        check_fixed_point(&body, &liveness);
    }
}

#[test]
fn dense_and_sparse_agree_on_all_inputs() {
    let _ = env_logger::try_init();
    let options = LivenessOptions {
        bitset: BitSetOptions::always_dense(),
    };
    for path in get_irs() {
        let text = std::fs::read_to_string(&path).unwrap();
        let mut sparse_body = parse_function(&text).unwrap();
        let mut dense_body = parse_function(&text).unwrap();
        let sparse = Liveness::compute(&mut sparse_body);
        let dense = Liveness::compute_with_options(&mut dense_body, &options);
        for block in sparse_body.blocks.iter() {
            assert_eq!(sparse.live_in(block), dense.live_in(block));
            assert_eq!(sparse.live_out(block), dense.live_out(block));
        }
        assert_eq!(
            format!("{}", sparse_body.display("").with_liveness(&sparse)),
            format!("{}", dense_body.display("").with_liveness(&dense))
        );
    }
}

#[test]
fn straight_line_value_crosses_middle_block() {
    let mut body = load("straight.ir");
    let liveness = Liveness::compute(&mut body);
    let x = v(0);
    assert!(liveness.is_live_out(b(0), x));
    assert!(liveness.is_live_in(b(1), x));
    assert!(liveness.is_live_out(b(1), x));
    assert!(liveness.is_live_in(b(2), x));
    assert!(!liveness.is_live_out(b(2), x));

    let kills: Vec<bool> = body
        .blocks
        .values()
        .flat_map(|def| def.insts.iter())
        .flat_map(|inst| inst.srcs.iter())
        .filter(|src| src.kind == OperandKind::Value(x))
        .map(|src| src.kill)
        .collect();
    assert_eq!(kills, vec![true]);
}

#[test]
fn diamond_phi_sources_are_per_edge() {
    let mut body = load("diamond.ir");
    let liveness = Liveness::compute(&mut body);
    let (x, y, p, q) = (v(2), v(3), v(4), v(5));

    assert!(liveness.is_live_out(b(1), x));
    assert!(!liveness.is_live_out(b(2), x));
    assert!(liveness.is_live_out(b(2), y));
    assert!(!liveness.is_live_out(b(1), y));
    for block in vec![b(1), b(2)] {
        assert!(!liveness.is_live_out(block, p));
        assert!(!liveness.is_live_out(block, q));
    }
    // `v1` feeds the second φ from block1 only; block2 passes undef.
    assert!(liveness.is_live_out(b(1), v(1)));
    assert!(!liveness.is_live_out(b(2), v(1)));
    // Both arms read `v1`, so it is live out of the entry.
    assert!(liveness.is_live_out(b(0), v(1)));
    assert!(!liveness.is_live_out(b(0), v(0)));

    let phis = &body.blocks[b(3)].insts[..2];
    assert!(phis.iter().flat_map(|phi| phi.srcs.iter()).all(|src| !src.kill));
    let text = format!("{}", body.display("").with_liveness(&liveness));
    assert!(text.contains("    ret *v4, *v5\n"), "{}", text);
    assert!(text.contains("    ; live-out: {v1, v2}\n"), "{}", text);
}

#[test]
fn loop_values_live_around_back_edge() {
    let mut body = load("loop.ir");
    let liveness = Liveness::compute(&mut body);
    let n = v(0);
    for block in vec![b(1), b(2)] {
        assert!(liveness.is_live_in(block, n), "{} live into {}", n, block);
        assert!(liveness.is_live_out(block, n), "{} live out of {}", n, block);
    }
    // The loop exit only needs the sum.
    assert_eq!(liveness.live_in(b(3)).iter().collect::<Vec<_>>(), vec![3]);
    // Carried values flow along the back edge, not into the header.
    assert!(liveness.is_live_out(b(2), v(5)));
    assert!(liveness.is_live_out(b(2), v(6)));
    assert!(!liveness.is_live_in(b(1), v(5)));
    assert!(liveness.is_live_out(b(0), v(1)));
    assert!(!liveness.is_live_out(b(2), v(1)));
    assert!(liveness.iterations() > body.blocks.len());
}

#[test]
fn nested_loops_converge() {
    let mut body = load("nested.ir");
    let liveness = Liveness::compute(&mut body);
    check_fixed_point(&body, &liveness);
    // `v1` is read after both loops, so it stays live through all of
    // them.
    for block in 1..5 {
        assert!(liveness.is_live_in(b(block), v(1)));
        assert!(liveness.is_live_out(b(block), v(1)));
    }
    assert!(liveness.is_live_out(b(4), v(5)));
    assert!(liveness.is_live_in(b(5), v(5)));
    assert!(liveness.live_out(b(5)).is_empty());
}

#[test]
fn scattered_values_use_several_buckets() {
    let mut body = load("scattered.ir");
    let liveness = Liveness::compute(&mut body);
    let out0: Vec<u32> = liveness.live_out(b(0)).iter().collect();
    assert_eq!(out0, vec![19, 422, 16383]);
    assert_eq!(liveness.live_out(b(0)).count(), 3);
    assert!(liveness.live_out(b(0)).node_count() >= 2);
    assert_eq!(
        liveness.live_out(b(1)).iter().collect::<Vec<_>>(),
        vec![422, 65535]
    );
    assert_eq!(
        liveness.live_out(b(2)).iter().collect::<Vec<_>>(),
        vec![422, 65539]
    );
    assert_eq!(max_live(&liveness, &body), 3);
}

#[test]
fn compute_all_matches_sequential() {
    let mut funcs: Vec<FunctionBody> = get_irs()
        .iter()
        .map(|path| parse_function(&std::fs::read_to_string(path).unwrap()).unwrap())
        .collect();
    let mut sequential = funcs.clone();
    let parallel = Liveness::compute_all(&mut funcs, &LivenessOptions::default());
    assert_eq!(parallel.len(), funcs.len());
    for ((body, seq_body), par) in funcs.iter().zip(sequential.iter_mut()).zip(parallel.iter()) {
        let seq = Liveness::compute(seq_body);
        for block in body.blocks.iter() {
            assert_eq!(seq.live_in(block), par.live_in(block));
            assert_eq!(seq.live_out(block), par.live_out(block));
        }
    }
}

#[test]
fn repeated_edge_feeds_both_phi_sources() {
    let mut body = load("repeated_edge.ir");
    let liveness = Liveness::compute(&mut body);
    check_fixed_point(&body, &liveness);
    assert_eq!(
        liveness.live_out(b(0)).iter().collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert!(!liveness.is_live_out(b(0), v(2)));
    let phi = &body.blocks[b(1)].insts[0];
    assert!(phi.srcs.iter().all(|src| !src.kill));
}
