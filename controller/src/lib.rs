pub mod apf;
pub mod artifact;
pub mod mission;
pub mod sequencer;
