use std::fs;
use std::sync::OnceLock;

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs a Prometheus recorder when a textfile target is configured.
/// Without one, the `metrics` macros stay no-ops.
pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if settings.telemetry().prometheus_textfile.is_none() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

/// Writes the rendered metrics for a node-exporter textfile collector.
/// The file is replaced through a rename of a sibling temp file.
pub(crate) fn write_textfile(settings: &Settings) -> anyhow::Result<()> {
    let Some(path) = settings.telemetry().prometheus_textfile.as_ref() else {
        return Ok(());
    };
    let Some(rendered) = render() else {
        return Ok(());
    };

    let tmp = path.with_extension("prom.tmp");
    fs::write(&tmp, rendered)
        .with_context(|| format!("Failed to write metrics to {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move metrics into {}", path.display()))?;

    tracing::debug!(path = %path.display(), "Wrote Prometheus textfile");

    Ok(())
}
