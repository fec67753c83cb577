//! CLI domain: parse, route and output only.

mod output;
mod parse;
mod route;

pub use output::{
    format_sources_json, format_sources_text, format_value_json, format_value_text, map_error,
};
pub use parse::{Cli, Commands, ForwardedArgs};
pub use route::RunContext;
