//! The syntax tree handed over by the parser. The front end only reads it.

pub mod ast;
