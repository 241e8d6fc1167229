pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod distance;
pub mod input;
pub mod output;
pub mod scoring;

#[cfg(test)]
pub(crate) mod test_support;
