//! Crate-level tests that span several modules.


mod view_model_test;
