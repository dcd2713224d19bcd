#![no_main]
use libfuzzer_sys::fuzz_target;

use ssa_liveness::frontend::parse_function;

fuzz_target!(|text: &str| {
    let _ = env_logger::try_init();
    if let Ok(body) = parse_function(text) {
        let printed = format!("{}", body.display(""));
        let reparsed = parse_function(&printed).unwrap();
        assert_eq!(printed, format!("{}", reparsed.display("")));
    }
});
