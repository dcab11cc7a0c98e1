//! Cross-crate integration tests for reactnet. See `tests/`.
