pub mod cli;
pub mod http;
pub mod network;
pub mod report;
pub mod utils;

pub use cli::*;
pub use http::*;
pub use network::*;
pub use report::*;
pub use utils::*;
