pub mod assemblyai_client;
#[cfg(test)]
pub(crate) mod test_upstream;
