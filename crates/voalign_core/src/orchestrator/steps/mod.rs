//! Pipeline step implementations.
//!
//! Each step handles one leg of the run's state machine.

mod encode;
mod media;
mod resample;
mod script;
mod synthesize;

pub use encode::EncodeStep;
pub use media::MediaStep;
pub use resample::ResampleStep;
pub use script::ScriptStep;
pub use synthesize::SynthesizeStep;
