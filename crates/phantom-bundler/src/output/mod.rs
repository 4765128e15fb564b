//! Writing build output to disk.

pub mod writer;
