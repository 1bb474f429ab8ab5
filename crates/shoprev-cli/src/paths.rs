//! Artifact locations under the configured output directory.

use std::path::PathBuf;

use shoprev_core::AppConfig;

pub fn raw_orders(config: &AppConfig) -> PathBuf {
    config.output_dir.join("raw_orders.json")
}

pub fn clean_orders(config: &AppConfig) -> PathBuf {
    config.output_dir.join("clean_orders.csv")
}

pub fn summary(config: &AppConfig) -> PathBuf {
    config.output_dir.join("summary.csv")
}

pub fn daily(config: &AppConfig) -> PathBuf {
    config.output_dir.join("daily.csv")
}

pub fn top_units(config: &AppConfig) -> PathBuf {
    config.output_dir.join("top_units.csv")
}

pub fn top_revenue(config: &AppConfig) -> PathBuf {
    config.output_dir.join("top_revenue.csv")
}

pub fn ensure_output_dir(config: &AppConfig) -> std::io::Result<()> {
    std::fs::create_dir_all(&config.output_dir)
}
