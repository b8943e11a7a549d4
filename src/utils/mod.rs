pub mod config;
pub mod fetch;
pub mod httpclient;
pub mod numeric;
