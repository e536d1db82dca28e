//! Integration test modules.

mod common;

mod cascade_test;
mod friendship_test;
mod personal_best_test;
mod session_lifecycle_test;
mod sharing_test;
