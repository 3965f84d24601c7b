mod discovery_tests;
mod support;
