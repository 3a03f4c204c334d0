//! `utask mode`: explain the execution-mode decision.

use crate::cli::ModeArgs;
use crate::config::Config;
use crate::error::{DispatchError, Result};
use crate::execution_mode::ModeReport;

pub(super) fn cmd_mode(config: &Config, args: ModeArgs) -> Result<()> {
    let env = super::environment(config);
    let report = ModeReport::evaluate(&env);

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| DispatchError::UserError(format!("failed to encode report: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    println!("Execution mode: {}", report.mode);
    println!("  production:      {}", report.production);
    println!("  remote flag:     {}", report.remote_flag);
    println!(
        "  platform:        {} (remote requires {})",
        report.platform, report.remote_platform
    );
    Ok(())
}
