//! Processing pipeline configuration

use crate::Args;
use std::{num::NonZeroUsize, sync::Arc};

/// Final process configuration
///
/// This is the result of digesting validated [`Args`]. Please refer to
/// [`Args`] to know more about common fields.
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Config {
    /// Input event dumps, as local paths or http(s) URLs
    pub inputs: Box<[Box<str>]>,

    // Other fields have the same meaning as in Args
    pub output: Box<str>,
    pub memory_chunk: NonZeroUsize,
}
//
impl Config {
    /// Determine process configuration from initialization products
    pub(crate) fn new(args: Args) -> Arc<Self> {
        let Args {
            inputs,
            output,
            memory_chunk,
        } = args;
        Arc::new(Self {
            inputs: inputs.into(),
            output,
            memory_chunk,
        })
    }
}
