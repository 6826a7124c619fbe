//! Host boundary
//!
//! A single-argument call that returns either the serialized record or
//! `{"Error": "<message>"}`, never both. Faults inside the pipeline are
//! contained here and reported as `panicked`.

use crate::config::Options;
use crate::error::{Error, InterpretError};
use crate::interpreter::interpret_with;
use crate::parser::{RecordParser, TreeProvider};
use crate::serializer::{serialize_record, GenericMap};
use crate::value::Record;
use serde_json::Value as JsonValue;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Key present only in failure results
pub const ERROR_KEY: &str = "Error";

/// Message reported when the pipeline panics
pub const PANICKED: &str = "panicked";

/// Text → record with the built-in parser and default options
pub fn convert(input: &str) -> Result<Record, Error> {
    convert_with(&RecordParser, input, &Options::default())
}

/// Text → record through any tree provider
pub fn convert_with<P: TreeProvider + ?Sized>(
    provider: &P,
    input: &str,
    options: &Options,
) -> Result<Record, Error> {
    let tree = provider.parse_tree(input, options)?;
    Ok(interpret_with(&tree, options)?)
}

/// `{"Error": message}`
pub fn error_map(message: impl Into<String>) -> GenericMap {
    let mut map = GenericMap::new();
    map.insert(ERROR_KEY.into(), JsonValue::String(message.into()));
    map
}

pub fn is_error(map: &GenericMap) -> bool {
    map.contains_key(ERROR_KEY)
}

/// Run `f`, turning a panic into an internal interpreter error.
///
/// The process-wide panic hook still runs first, so the default hook prints
/// the panic message to stderr. Hosts that want silence install their own
/// hook with [`std::panic::set_hook`]; swapping it here would race with
/// other threads.
///
/// A stack overflow aborts rather than panics; [`Options::max_depth`] is
/// capped so the recursive parser and interpreter cannot reach one.
fn contain<T>(f: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => {
            warn!("record interpretation panicked");
            Err(InterpretError::internal(PANICKED).into())
        }
    }
}

/// Convert one log line into its boundary map
pub fn handle_line(input: &str) -> GenericMap {
    handle_line_with(&RecordParser, input, &Options::from_env())
}

pub fn handle_line_with<P: TreeProvider + ?Sized>(
    provider: &P,
    input: &str,
    options: &Options,
) -> GenericMap {
    match contain(|| convert_with(provider, input, options).map(|r| serialize_record(&r))) {
        Ok(map) => map,
        Err(e) => {
            debug!(error = %e, "log line rejected");
            error_map(e.to_string())
        }
    }
}

/// Boundary entry point taking the caller's raw argument list
pub fn handle_call(args: &[JsonValue]) -> GenericMap {
    handle_call_with(&RecordParser, args, &Options::from_env())
}

pub fn handle_call_with<P: TreeProvider + ?Sized>(
    provider: &P,
    args: &[JsonValue],
    options: &Options,
) -> GenericMap {
    match args {
        [JsonValue::String(input)] => handle_line_with(provider, input, options),
        [_] => error_map("bad call, arg must be a string"),
        _ => error_map("bad call, need one argument"),
    }
}
