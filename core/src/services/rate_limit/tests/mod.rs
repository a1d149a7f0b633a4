mod mocks;
mod sweeper_tests;
