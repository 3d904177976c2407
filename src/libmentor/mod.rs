pub mod backend;
pub mod parser;
pub mod pool;
pub mod question;
pub mod scores;
pub mod session;
pub mod source;
pub mod tutor;

#[cfg(test)]
pub(crate) mod testing;
