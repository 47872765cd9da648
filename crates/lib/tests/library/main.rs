mod common;
mod engine_tests;
mod scenario_tests;
