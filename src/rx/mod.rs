pub mod audit;
pub mod client;
pub mod config;
pub mod credential;
pub mod export;
pub mod history;
pub mod locale;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod paths;
pub mod prompt;
pub mod render;
pub mod risk;
pub mod session;
pub mod util;
