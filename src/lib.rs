pub mod arq;
pub mod error;
pub mod net;
pub mod scenario;
pub mod sim;
pub mod timer;
pub mod viz;

#[cfg(test)]
mod test;
