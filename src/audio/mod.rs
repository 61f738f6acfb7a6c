pub mod ducking;
pub mod gain;
pub mod track;
