// Adapters layer: concrete implementations of the domain ports (http, identity).

pub mod http;
pub mod identity;
