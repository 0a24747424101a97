//! Integration tests for the compiler

pub mod helpers;

pub mod declarations;
pub mod expressions;
