//! The Python-facing loader class.

use crate::types::{to_py_err, PyDocument};
use anytype_loader::{AnytypeLoader, Document, DocumentIter, LoaderError, LoaderOptions};
use futures::stream::{BoxStream, StreamExt};
use pyo3::exceptions::PyStopAsyncIteration;
use pyo3::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Loads objects from Anytype spaces as documents.
///
/// Args:
///     url: Base URL of the Anytype API, e.g. "http://127.0.0.1:31009"
///     api_key: Anytype API key
///     space_id: Id of the space to load (exclusive with space_names)
///     space_names: Names of the spaces to load (exclusive with space_id)
///     page_size: Objects requested per listing page (default 50)
///     query: Full-text query; switches listing to search
///     max_concurrency: Concurrent object fetches in `aload` (default 10)
#[pyclass(name = "AnytypeLoader")]
pub struct PyAnytypeLoader {
    inner: Arc<AnytypeLoader>,
}

#[pymethods]
impl PyAnytypeLoader {
    #[new]
    #[pyo3(signature = (
        url,
        api_key,
        space_id = None,
        space_names = None,
        page_size = 50,
        query = None,
        max_concurrency = 10,
    ))]
    fn new(
        url: &str,
        api_key: &str,
        space_id: Option<String>,
        space_names: Option<Vec<String>>,
        page_size: usize,
        query: Option<String>,
        max_concurrency: usize,
    ) -> PyResult<Self> {
        let options = LoaderOptions {
            url: Some(url.to_string()),
            api_key: Some(api_key.to_string()),
            space_id,
            space_names,
            page_size,
            query,
            max_concurrency,
            ..LoaderOptions::default()
        };
        let loader = AnytypeLoader::from_options(options).map_err(to_py_err)?;

        Ok(Self {
            inner: Arc::new(loader),
        })
    }

    /// Load every document with blocking requests. Releases the GIL while
    /// loading.
    fn load(&self, py: Python<'_>) -> PyResult<Vec<PyDocument>> {
        let loader = Arc::clone(&self.inner);
        let documents = py.allow_threads(move || loader.load()).map_err(to_py_err)?;
        Ok(documents.into_iter().map(PyDocument::from).collect())
    }

    /// Iterate documents with blocking requests, one object per step.
    /// Releases the GIL while each document is fetched.
    fn lazy_load(&self) -> PyDocumentIterator {
        PyDocumentIterator {
            inner: Arc::clone(&self.inner).lazy_load_owned(),
        }
    }

    /// Async iterator over documents, fetched with bounded concurrency
    /// and yielded in listing order.
    fn alazy_load(&self) -> PyAsyncDocumentIterator {
        PyAsyncDocumentIterator {
            inner: Arc::new(Mutex::new(Arc::clone(&self.inner).alazy_load_owned())),
        }
    }

    /// Load every document with bounded concurrent requests.
    ///
    /// Returns an awaitable resolving to a list of documents.
    fn aload<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        let loader = Arc::clone(&self.inner);
        pyo3_async_runtimes::tokio::future_into_py(py, async move {
            let documents = loader.aload().await.map_err(to_py_err)?;
            Ok(documents
                .into_iter()
                .map(PyDocument::from)
                .collect::<Vec<_>>())
        })
    }

    /// Release pooled connections. Safe to call more than once.
    fn close(&self) {
        self.inner.close();
    }

    /// Awaitable counterpart of `close`.
    fn aclose<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        let loader = Arc::clone(&self.inner);
        pyo3_async_runtimes::tokio::future_into_py(py, async move {
            loader.close();
            Ok(())
        })
    }

    fn __aenter__<'py>(slf: Py<Self>, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        pyo3_async_runtimes::tokio::future_into_py(py, async move { Ok(slf) })
    }

    #[pyo3(signature = (_exc_type = None, _exc_value = None, _traceback = None))]
    fn __aexit__<'py>(
        &self,
        py: Python<'py>,
        _exc_type: Option<&Bound<'py, PyAny>>,
        _exc_value: Option<&Bound<'py, PyAny>>,
        _traceback: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<Bound<'py, PyAny>> {
        let loader = Arc::clone(&self.inner);
        pyo3_async_runtimes::tokio::future_into_py(py, async move {
            loader.close();
            Ok(false)
        })
    }

    fn __enter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    #[pyo3(signature = (_exc_type = None, _exc_value = None, _traceback = None))]
    fn __exit__(
        &self,
        _exc_type: Option<&Bound<'_, PyAny>>,
        _exc_value: Option<&Bound<'_, PyAny>>,
        _traceback: Option<&Bound<'_, PyAny>>,
    ) -> bool {
        self.inner.close();
        false
    }

    fn __repr__(&self) -> String {
        format!("AnytypeLoader(url='{}')", self.inner.config().base_url)
    }
}

/// Iterator returned by `AnytypeLoader.lazy_load()`.
#[pyclass(name = "DocumentIterator")]
pub struct PyDocumentIterator {
    inner: DocumentIter<Arc<AnytypeLoader>>,
}

#[pymethods]
impl PyDocumentIterator {
    fn __iter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    fn __next__(&mut self, py: Python<'_>) -> PyResult<Option<PyDocument>> {
        let documents = &mut self.inner;
        match py.allow_threads(move || documents.next()) {
            Some(Ok(document)) => Ok(Some(PyDocument::from(document))),
            Some(Err(e)) => Err(to_py_err(e)),
            None => Ok(None),
        }
    }
}

type SharedStream = Arc<Mutex<BoxStream<'static, Result<Document, LoaderError>>>>;

/// Async iterator returned by `AnytypeLoader.alazy_load()`.
#[pyclass(name = "AsyncDocumentIterator")]
pub struct PyAsyncDocumentIterator {
    inner: SharedStream,
}

#[pymethods]
impl PyAsyncDocumentIterator {
    fn __aiter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    fn __anext__<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        let documents = Arc::clone(&self.inner);
        pyo3_async_runtimes::tokio::future_into_py(py, async move {
            match documents.lock().await.next().await {
                Some(Ok(document)) => Ok(PyDocument::from(document)),
                Some(Err(e)) => Err(to_py_err(e)),
                None => Err(PyStopAsyncIteration::new_err("no more documents")),
            }
        })
    }
}
