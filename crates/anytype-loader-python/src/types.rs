//! Python wrapper types for anytype-loader domain objects.

use anytype_loader::{Document, ErrorKind, LoaderError, MetadataValue};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

/// A loaded document: `page_content` plus a flat `metadata` dict.
#[pyclass(name = "Document")]
#[derive(Clone)]
pub struct PyDocument {
    inner: Document,
}

impl From<Document> for PyDocument {
    fn from(inner: Document) -> Self {
        Self { inner }
    }
}

#[pymethods]
impl PyDocument {
    #[getter]
    fn page_content(&self) -> &str {
        self.inner.content()
    }

    /// Metadata as a new dict. Values are str, bool, or list of str.
    #[getter]
    fn metadata<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for (key, value) in self.inner.metadata() {
            match value {
                MetadataValue::Text(text) => dict.set_item(key.as_str(), text.as_str())?,
                MetadataValue::Flag(flag) => dict.set_item(key.as_str(), *flag)?,
                MetadataValue::List(items) => dict.set_item(key.as_str(), items.clone())?,
            }
        }
        Ok(dict)
    }

    fn __repr__(&self) -> String {
        format!(
            "Document(id='{}', page_content_length={})",
            self.inner.text("id").unwrap_or(""),
            self.inner.content().len(),
        )
    }
}

/// Bad options and unknown spaces surface as `ValueError`; everything
/// else as `RuntimeError`.
pub(crate) fn to_py_err(error: LoaderError) -> PyErr {
    match error.kind() {
        ErrorKind::Configuration | ErrorKind::SpaceResolution => {
            PyValueError::new_err(error.to_string())
        }
        _ => PyRuntimeError::new_err(error.to_string()),
    }
}
