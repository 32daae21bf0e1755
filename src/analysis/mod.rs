//! REV accounting, pore size distributions and the multi-scale pipeline

/// Multi-scale orchestration and result sinks
pub mod pipeline;
/// Equivalent-sphere pore size distributions
pub mod psd;
/// Representative elementary volume trace
pub mod rev;
