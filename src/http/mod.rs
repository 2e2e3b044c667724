pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod testing;
