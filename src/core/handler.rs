//! Handler trait for log output destinations

use super::{error::Result, record::Record};
use std::sync::Arc;

/// A sink that renders or ships records
///
/// Handlers are shared between loggers and called from many threads at
/// once, so they take `&self` and synchronize internally.
pub trait Handler: Send + Sync {
    fn handle(&self, record: &Record) -> Result<()>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn handle(&self, record: &Record) -> Result<()> {
        (**self).handle(record)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn handle(&self, record: &Record) -> Result<()> {
        (**self).handle(record)
    }
}
