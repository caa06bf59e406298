use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=F_CPU");

    // The calculations are meaningless without the real CPU clock, so there is no default
    if env::var("F_CPU").is_err() {
        panic!("F_CPU is not set. Set it to the CPU clock in Hz, e.g. F_CPU=16000000");
    }
}
