//! Unit test modules.

mod personal_best_math_test;
mod validation_test;
