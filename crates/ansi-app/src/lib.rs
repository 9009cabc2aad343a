/// Application layer for ansimage: render context, CLI, hot reload and
/// output sinks.

pub mod app;
pub mod cli;
pub mod context;
pub mod debounce;
pub mod hotreload;
pub mod measure;
pub mod pipeline;
pub mod preview;
