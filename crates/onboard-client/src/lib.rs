pub mod http;
pub mod render;
pub mod token;

pub use http::HttpBackend;
pub use token::TokenFile;
