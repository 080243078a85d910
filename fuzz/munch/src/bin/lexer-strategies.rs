use fuzz_munch::Input;

fn main() {
    afl::fuzz!(|data: Input| data.run_differential());
}
