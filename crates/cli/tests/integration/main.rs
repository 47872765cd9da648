mod apply_tests;
mod common;
mod edit_tests;
mod restore_tests;
