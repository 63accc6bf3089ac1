pub mod channels;
pub mod runtime;

#[cfg(test)]
pub(crate) mod test_server;
