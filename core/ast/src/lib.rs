#![warn(clippy::pedantic)]
//! Syntax tree for AngelScript sources.
//!
//! The analyzer never tokenizes or parses: it is handed a [`nodes::Script`]
//! built from the fixed grammar below. [`builder::Builder`] is the
//! construction surface for front-ends and tests.
pub mod builder;
pub mod nodes;
pub(crate) mod nodes_impl;
