//! Transform command - rebuild the transformed table and enforce the quality gate

use anyhow::Result;
use ledgerflow_core::LogEvent;

use super::{build_context, get_logger, load_config, log_event};
use crate::output;

pub fn run(valid_year: Option<i32>, threshold: Option<f64>, json: bool) -> Result<()> {
    let logger = get_logger();

    let mut config = load_config()?;
    if let Some(year) = valid_year {
        config.valid_year = year;
    }
    if let Some(fraction) = threshold {
        config.invalid_threshold = fraction;
    }

    let ctx = build_context(config)?;

    match ctx.transform_service.transform() {
        Ok(result) => {
            log_event(&logger, LogEvent::new("transform_completed").with_command("transform"));

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            output::success(&format!(
                "Transformed {} row(s), {} invalid ({:.2}%)",
                result.total_rows,
                result.invalid_rows,
                result.invalid_fraction * 100.0
            ));
            Ok(())
        }
        Err(e) => {
            let event = if e.is_quality_gate() {
                "quality_gate_failed"
            } else {
                "transform_failed"
            };
            log_event(
                &logger,
                LogEvent::new(event)
                    .with_command("transform")
                    .with_error(e.to_string()),
            );
            Err(e.into())
        }
    }
}
