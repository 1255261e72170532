//! Course repository tests against the in-memory store

mod write_tests;
