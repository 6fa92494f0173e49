//! Unit tests for marketplace domain types and operation services.

mod support;

mod domain_tests;
mod task_lifecycle_tests;
