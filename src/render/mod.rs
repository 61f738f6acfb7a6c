pub mod cpu;
pub mod fit;
pub mod frame;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod renderer;
pub(crate) mod sample;
