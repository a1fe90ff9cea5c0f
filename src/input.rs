use std::fs;
use std::io::{self, Read};

use serde_json::Value;

use crate::error::{Error, Result};

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|source| Error::Io { path: "<stdin>".into(), source })?;
    Ok(buf)
}

/// Reads the message the opener would post: a JSON object from `path`, or
/// from stdin when `path` is `-`.
pub fn read_payload(path: &str) -> Result<Value> {
    let raw = if path == "-" {
        read_stdin()?
    } else {
        fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_string(),
            source,
        })?
    };
    Ok(serde_json::from_str(&raw)?)
}
