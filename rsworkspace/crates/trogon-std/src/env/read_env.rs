use std::env::VarError;
use std::str::FromStr;

pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, VarError>;
}

/// Reads `key` and parses it, treating a missing or unparseable value as absent.
pub fn read_parsed<E: ReadEnv, T: FromStr>(env: &E, key: &str) -> Option<T> {
    env.var(key).ok().and_then(|raw| raw.trim().parse().ok())
}
