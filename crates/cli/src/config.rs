use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlbench_dispatch::{DispatchError, MAX_RETRY_LIMIT, delay_for};

/// Settings rejected before any call goes out.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("bench.api_port must be non-zero")]
    InvalidPort,

    #[error("analysis.max_details must be at least 1 when stats are saved")]
    NoDetails,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Contents of `appsettings.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub common: CommonSettings,
    pub bench: BenchSettings,
    pub analysis: AnalysisSettings,
    pub describe: DescribeSettings,
}

impl AppSettings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        crate::io::read_json(path)
            .with_context(|| format!("Failed to load app settings: {}", path.display()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonSettings {
    /// Probe the agent before a bench run.
    pub run_test: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchSettings {
    pub dataset_path: PathBuf,
    pub api_hostname: String,
    pub api_port: u16,
    pub output_folder: PathBuf,
    pub report_filename_prefix: String,
    pub use_easy_question: bool,
    /// Requests per minute, or -1 for no throttling.
    pub api_max_rpm: i64,
    pub retry_limit: u32,
    pub request_timeout_secs: u64,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("dataset.json"),
            api_hostname: "localhost".to_string(),
            api_port: 5000,
            output_folder: PathBuf::from("reports"),
            report_filename_prefix: "bench".to_string(),
            use_easy_question: false,
            api_max_rpm: 10,
            retry_limit: 2,
            request_timeout_secs: 120,
        }
    }
}

impl BenchSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        non_empty_path(&self.dataset_path, "bench.dataset_path")?;
        non_empty_path(&self.output_folder, "bench.output_folder")?;
        if self.api_hostname.trim().is_empty() {
            return Err(SettingsError::Empty("bench.api_hostname"));
        }
        if self.api_port == 0 {
            return Err(SettingsError::InvalidPort);
        }
        validate_limits(self.api_max_rpm, self.retry_limit)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.api_hostname, self.api_port)
    }

    /// `<output_folder>/<prefix>_<run_id>.json`
    pub fn report_path(&self, run_id: &str) -> PathBuf {
        self.output_folder
            .join(format!("{}_{run_id}.json", self.report_filename_prefix))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub bench_report_path: PathBuf,
    pub sqlite_db_path: PathBuf,
    pub save_stats_file: bool,
    pub max_details: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            bench_report_path: PathBuf::new(),
            sqlite_db_path: PathBuf::from("chinook.db"),
            save_stats_file: true,
            max_details: 100,
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        non_empty_path(&self.bench_report_path, "analysis.bench_report_path")?;
        non_empty_path(&self.sqlite_db_path, "analysis.sqlite_db_path")?;
        if self.save_stats_file && self.max_details == 0 {
            return Err(SettingsError::NoDetails);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DescribeSettings {
    pub metadata_folder: PathBuf,
    pub model: String,
    pub api_base_url: String,
    pub max_rpm: i64,
    pub retry_limit: u32,
    pub report_filename: String,
}

impl Default for DescribeSettings {
    fn default() -> Self {
        Self {
            metadata_folder: PathBuf::from("metadata"),
            model: "gemini-2.5-flash".to_string(),
            api_base_url: crate::gemini::DEFAULT_BASE_URL.to_string(),
            max_rpm: 10,
            retry_limit: 3,
            report_filename: "descriptions".to_string(),
        }
    }
}

impl DescribeSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        non_empty_path(&self.metadata_folder, "describe.metadata_folder")?;
        if self.model.trim().is_empty() {
            return Err(SettingsError::Empty("describe.model"));
        }
        if self.report_filename.trim().is_empty() {
            return Err(SettingsError::Empty("describe.report_filename"));
        }
        validate_limits(self.max_rpm, self.retry_limit)
    }

    /// `<metadata_folder>/<report_filename>.llm.json`
    pub fn report_path(&self) -> PathBuf {
        self.metadata_folder
            .join(format!("{}{}", self.report_filename, crate::io::DESCRIPTION_SUFFIX))
    }
}

fn non_empty_path(path: &Path, name: &'static str) -> Result<(), SettingsError> {
    if path.as_os_str().is_empty() {
        Err(SettingsError::Empty(name))
    } else {
        Ok(())
    }
}

fn validate_limits(max_rpm: i64, retry_limit: u32) -> Result<(), SettingsError> {
    delay_for(max_rpm)?;
    if retry_limit > MAX_RETRY_LIMIT {
        return Err(DispatchError::InvalidRetryLimit {
            limit: retry_limit,
            max: MAX_RETRY_LIMIT,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let settings = AppSettings::default();
        settings.bench.validate().unwrap();
        settings.describe.validate().unwrap();
    }

    #[test]
    fn partial_file_fills_defaults() {
        let settings: AppSettings = serde_json::from_str(
            r#"{"bench": {"api_port": 8080, "api_max_rpm": -1}, "analysis": {"bench_report_path": "r.json"}}"#,
        )
        .unwrap();
        assert_eq!(settings.bench.api_port, 8080);
        assert_eq!(settings.bench.api_hostname, "localhost");
        assert_eq!(settings.bench.base_url(), "http://localhost:8080");
        settings.bench.validate().unwrap();
        settings.analysis.validate().unwrap();
    }

    #[test]
    fn rejects_bad_rate_limits() {
        for rpm in [0, -2, -60] {
            let bench = BenchSettings {
                api_max_rpm: rpm,
                ..BenchSettings::default()
            };
            assert!(matches!(
                bench.validate(),
                Err(SettingsError::Dispatch(DispatchError::InvalidRateLimit(r))) if r == rpm
            ));
        }
    }

    #[test]
    fn rejects_retry_limit_above_ceiling() {
        let describe = DescribeSettings {
            retry_limit: MAX_RETRY_LIMIT + 1,
            ..DescribeSettings::default()
        };
        assert!(matches!(
            describe.validate(),
            Err(SettingsError::Dispatch(DispatchError::InvalidRetryLimit { .. }))
        ));
    }

    #[test]
    fn rejects_empty_paths() {
        let analysis = AnalysisSettings::default();
        assert!(matches!(
            analysis.validate(),
            Err(SettingsError::Empty("analysis.bench_report_path"))
        ));

        let bench = BenchSettings {
            api_hostname: " ".to_string(),
            ..BenchSettings::default()
        };
        assert!(matches!(bench.validate(), Err(SettingsError::Empty("bench.api_hostname"))));
    }

    #[test]
    fn report_paths() {
        let bench = BenchSettings::default();
        assert_eq!(bench.report_path("01J"), PathBuf::from("reports/bench_01J.json"));
        let describe = DescribeSettings::default();
        assert_eq!(describe.report_path(), PathBuf::from("metadata/descriptions.llm.json"));
    }
}
