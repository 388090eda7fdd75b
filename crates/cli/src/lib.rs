//! Notobuilder CLI library.

pub mod cli;
