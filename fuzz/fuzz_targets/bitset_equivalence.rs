#![no_main]
use libfuzzer_sys::fuzz_target;

use ssa_liveness::fuzzing::{check_dense_sparse_equivalence, BitSetCase};

fuzz_target!(|case: BitSetCase| {
    let _ = env_logger::try_init();
    check_dense_sparse_equivalence(&case);
});
