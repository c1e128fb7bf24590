// Application layer: the query commands exposed by the CLI.

pub mod commands;
