//! Tests for the verification engine

#[cfg(test)]
pub(crate) mod mocks;
