#![no_main]
use libfuzzer_sys::fuzz_target;

use ssa_liveness::frontend::parse_function;
use ssa_liveness::{BitSetOptions, Liveness, LivenessOptions};

fuzz_target!(|text: &str| {
    let _ = env_logger::try_init();
    let mut sparse_body = match parse_function(text) {
        Ok(body) => body,
        Err(_) => return,
    };
    // Flat sets cost one bit per value per block.
    if sparse_body.num_values > 1 << 16 {
        return;
    }
    let mut dense_body = sparse_body.clone();

    let sparse = Liveness::compute(&mut sparse_body);
    let options = LivenessOptions {
        bitset: BitSetOptions::always_dense(),
    };
    let dense = Liveness::compute_with_options(&mut dense_body, &options);

    for block in sparse_body.blocks.iter() {
        assert_eq!(sparse.live_in(block), dense.live_in(block));
        assert_eq!(sparse.live_out(block), dense.live_out(block));
    }
    for (a, b) in sparse_body.blocks.values().zip(dense_body.blocks.values()) {
        for (x, y) in a.insts.iter().zip(b.insts.iter()) {
            assert_eq!(x.srcs, y.srcs);
        }
    }
});
