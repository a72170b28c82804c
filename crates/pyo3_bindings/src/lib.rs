//! PyO3 bindings for the TRACE cleaner.
//!
//! Exposes the Rust cleaning pipeline to Python analytics code:
//! - `clean_trace` for one-shot cleaning of a list of row dicts
//! - `TraceCleaner` for repeated runs with a fixed configuration and access
//!   to the cleaning report

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat};

use trace_cleaning::{CleaningReport, OutputFormatter, TraceCleaner as RustTraceCleaner};
use trace_core::{CleanTrade as RustCleanTrade, Config as RustConfig, Error as RustError};
use trace_ingestion::{MessageStore, RawTradeMessage};

// ============================================================================
// Python-exposed Types
// ============================================================================

/// One row of the clean TRACE ledger.
#[pyclass]
#[derive(Clone)]
pub struct CleanTrade {
    #[pyo3(get)]
    pub cusip_id: String,
    /// Execution date as `YYYY-MM-DD`.
    #[pyo3(get)]
    pub trd_exctn_dt: String,
    /// Execution time as `HH:MM:SS`.
    #[pyo3(get)]
    pub trd_exctn_tm: String,
    #[pyo3(get)]
    pub rptd_pr: f64,
    #[pyo3(get)]
    pub entrd_vol_qt: f64,
    #[pyo3(get)]
    pub yld_pt: Option<f64>,
    #[pyo3(get)]
    pub rpt_side_cd: String,
    #[pyo3(get)]
    pub cntra_mp_id: String,
}

#[pymethods]
impl CleanTrade {
    fn __repr__(&self) -> String {
        format!(
            "CleanTrade(cusip_id={}, trd_exctn_dt={}, trd_exctn_tm={}, rptd_pr={}, entrd_vol_qt={}, rpt_side_cd={}, cntra_mp_id={})",
            self.cusip_id,
            self.trd_exctn_dt,
            self.trd_exctn_tm,
            self.rptd_pr,
            self.entrd_vol_qt,
            self.rpt_side_cd,
            self.cntra_mp_id
        )
    }
}

impl From<RustCleanTrade> for CleanTrade {
    fn from(t: RustCleanTrade) -> Self {
        CleanTrade {
            cusip_id: t.cusip,
            trd_exctn_dt: t.exec_date.to_string(),
            trd_exctn_tm: t.exec_time,
            rptd_pr: t.price,
            entrd_vol_qt: t.volume,
            yld_pt: t.yield_pct,
            rpt_side_cd: t.side,
            cntra_mp_id: t.counterparty,
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn to_py_err(err: RustError) -> PyErr {
    match err {
        RustError::Schema(_) | RustError::Config(_) | RustError::Json(_) => {
            PyValueError::new_err(err.to_string())
        }
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn parse_config(config_json: Option<&str>) -> PyResult<RustConfig> {
    match config_json {
        Some(json) => RustConfig::from_json_str(json).map_err(to_py_err),
        None => Ok(RustConfig::default()),
    }
}

/// Render one dict value the way it would appear in a CSV export. `None`
/// and float NaN are missing; pandas `NaT` and `NA` render as missing
/// markers and are blanked by the schema.
fn cell_text(value: &Bound<'_, PyAny>) -> PyResult<Option<String>> {
    if value.is_none() {
        Ok(None)
    } else if let Ok(float) = value.downcast::<PyFloat>() {
        let float = float.value();
        Ok((!float.is_nan()).then(|| float.to_string()))
    } else if value.is_instance_of::<PyBool>() {
        let flag: bool = value.extract()?;
        Ok(Some(if flag { "Y" } else { "N" }.to_string()))
    } else {
        Ok(Some(value.str()?.to_string()))
    }
}

/// Build a message store from row dicts keyed by TRACE column name.
fn store_from_rows(rows: &[Bound<'_, PyDict>]) -> PyResult<MessageStore> {
    let mut raw = Vec::with_capacity(rows.len());
    for row in rows {
        let mut record = RawTradeMessage::default();
        for (key, value) in row.iter() {
            let column: String = key.extract()?;
            record.set(&column, cell_text(&value)?);
        }
        raw.push(record);
    }
    MessageStore::from_raw(raw).map_err(to_py_err)
}

// ============================================================================
// Engine Classes
// ============================================================================

/// Cleaner with a fixed configuration.
#[pyclass(name = "TraceCleaner")]
pub struct PyTraceCleaner {
    inner: RustTraceCleaner,
    last_report: Option<CleaningReport>,
}

impl PyTraceCleaner {
    fn run(&mut self, py: Python<'_>, store: MessageStore) -> PyResult<Vec<CleanTrade>> {
        let inner = &self.inner;
        let reconciliation = py
            .allow_threads(|| inner.reconcile(&store))
            .map_err(to_py_err)?;
        let rows = OutputFormatter::new().format(&reconciliation.ledger);
        self.last_report = Some(reconciliation.report);
        Ok(rows.into_iter().map(CleanTrade::from).collect())
    }
}

#[pymethods]
impl PyTraceCleaner {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = parse_config(config_json)?;
        Ok(PyTraceCleaner {
            inner: RustTraceCleaner::new(config).map_err(to_py_err)?,
            last_report: None,
        })
    }

    /// Clean a list of row dicts.
    fn clean(&mut self, py: Python<'_>, rows: Vec<Bound<'_, PyDict>>) -> PyResult<Vec<CleanTrade>> {
        let store = store_from_rows(&rows)?;
        self.run(py, store)
    }

    /// Clean a CSV export on disk.
    fn clean_csv(&mut self, py: Python<'_>, path: &str) -> PyResult<Vec<CleanTrade>> {
        let store = MessageStore::read_csv_path(path).map_err(to_py_err)?;
        self.run(py, store)
    }

    /// Report of the last run as a JSON string, if any run has completed.
    fn report_json(&self) -> PyResult<Option<String>> {
        self.last_report
            .as_ref()
            .map(|report| serde_json::to_string(report).map_err(|e| PyRuntimeError::new_err(e.to_string())))
            .transpose()
    }
}

/// Clean a list of TRACE row dicts with an optional JSON configuration.
#[pyfunction]
#[pyo3(signature = (rows, config_json=None))]
fn clean_trace(
    py: Python<'_>,
    rows: Vec<Bound<'_, PyDict>>,
    config_json: Option<&str>,
) -> PyResult<Vec<CleanTrade>> {
    let cleaner = RustTraceCleaner::new(parse_config(config_json)?).map_err(to_py_err)?;
    let store = store_from_rows(&rows)?;
    let rows = py.allow_threads(|| cleaner.clean(&store)).map_err(to_py_err)?;
    Ok(rows.into_iter().map(CleanTrade::from).collect())
}

// ============================================================================
// Module Definition
// ============================================================================

/// TRACE cleaner - Rust implementation of the bond trade report cleaner.
#[pymodule]
fn trace_cleaner(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<CleanTrade>()?;
    m.add_class::<PyTraceCleaner>()?;
    m.add_function(wrap_pyfunction!(clean_trace, m)?)?;
    Ok(())
}
