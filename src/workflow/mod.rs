pub mod instrument_ctx;
pub mod instrument_flow;

pub use instrument_ctx::InstrumentCtx;
pub use instrument_flow::{FlowOutcome, InstrumentFlow};
