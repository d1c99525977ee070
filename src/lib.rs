//! Rules engine for Xiangqi and its hidden-piece (Cờ Úp) variant, where every
//! piece except the generals starts face-down and moves by the kind the
//! canonical opening layout places on its square until it is flipped.

pub mod board;
pub mod display_format;
pub mod location;
pub mod piece;
pub mod selector;
