// Library exports for the Battlesnake move engine
// This allows the server, the replay tool and the tests to share the core logic

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod escape;
pub mod frontier;
pub mod grid;
pub mod path;
pub mod replay;
pub mod search;
pub mod types;
