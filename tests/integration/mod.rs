//! Integration tests for appsettings

mod add_default;
mod cli;
mod reload;
