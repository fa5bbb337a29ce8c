//! Machine construction options.

/// Configuration for creating an [`crate::Lc3`] instance.
///
/// Defaults: privilege checks on, memory randomized from OS entropy,
/// 10 ms tick, 100 000-step budget, PC at the start of user space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lc3Config {
    /// Disable all bounds/privilege checking (supervisor region and
    /// non-device high memory become plain RAM).
    pub ignore_privilege: bool,
    /// Fill memory with pseudo-random noise before installing the
    /// supervisor image, instead of zeroes.
    pub randomize: bool,
    /// Seed for the randomized fill. `None` seeds from the OS, `Some`
    /// gives a reproducible image.
    pub seed: Option<u64>,
    /// Milliseconds between steps in timer-driven mode (`run_tick`).
    pub tick_rate: u64,
    /// Maximum steps per `run()` before declaring a runaway program.
    pub execution_limit: u64,
    /// Initial program counter.
    pub start_pc: u16,
}

impl Default for Lc3Config {
    fn default() -> Self {
        Self {
            ignore_privilege: false,
            randomize: true,
            seed: None,
            tick_rate: 10,
            execution_limit: 100_000,
            start_pc: 0x3000,
        }
    }
}
