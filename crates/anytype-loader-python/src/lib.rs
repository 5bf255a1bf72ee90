//! Python bindings for anytype-loader via PyO3.
//!
//! Exposes the loader as a LangChain-shaped class: `load()` and `aload()`
//! return lists of `Document` objects with `page_content` and `metadata`;
//! `lazy_load()` and `alazy_load()` yield them one at a time.

use pyo3::prelude::*;

mod loader;
mod types;

/// The main Python module: `anytype_loader._anytype_loader`
#[pymodule]
fn _anytype_loader(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<loader::PyAnytypeLoader>()?;
    m.add_class::<loader::PyDocumentIterator>()?;
    m.add_class::<loader::PyAsyncDocumentIterator>()?;
    m.add_class::<types::PyDocument>()?;
    Ok(())
}
