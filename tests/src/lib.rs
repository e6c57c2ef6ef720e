//! This crate contains the end to end analyzer tests. Every test builds a
//! script with the AST builder, hoists and analyzes it against the
//! predefined `array`/`string` declarations and inspects the diagnostics
//! and analysis info.

#[cfg(test)]
mod analyzer;
