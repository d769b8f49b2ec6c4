//! Benchmarks for low-level DSP primitives.

mod envelope;
mod filter;
mod gain;
mod noise;

pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use gain::bench_gain;
pub use noise::bench_noise;
