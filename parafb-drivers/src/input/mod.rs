//! Pointer event generation

pub mod pointer;

pub use pointer::PointerEmitter;
