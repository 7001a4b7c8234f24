//! Plain-text run report.
//!
//! Summary fields whose preconditions are unmet (no trades, no losers, ...)
//! are left out entirely rather than printed as zero.

use crate::runner::BacktestResult;

const RULE: &str = "========================================\n";

/// Render the end-of-run report.
pub fn render_report(result: &BacktestResult) -> String {
    let mut out = String::with_capacity(1024);
    let state = &result.outcome.state;
    let summary = &result.outcome.summary;

    out.push_str(RULE);
    out.push_str("   MEAN REVERSION BACKTEST\n");
    out.push_str(RULE);
    out.push_str(&format!("Data:              {}\n", result.source));
    out.push_str(&format!("SMA Period:        {}\n", result.params.window));
    out.push_str(&format!(
        "Std Multiplier:    {:.2}\n",
        result.params.multiplier
    ));
    out.push_str(&format!(
        "Bars:              {} ({} evaluated, {} rows skipped)\n",
        result.bar_count, result.outcome.bars_evaluated, result.skipped_rows
    ));
    if let (Some(first), Some(last)) = (&result.first_timestamp, &result.last_timestamp) {
        out.push_str(&format!("Range:             {first} to {last}\n"));
    }
    out.push_str(RULE);
    out.push('\n');

    out.push_str("Trading Statistics:\n");
    out.push_str(&format!("  Total Trades:      {}\n", state.total_trades));
    out.push_str(&format!("  Winning Trades:    {}\n", state.winning_trades));
    out.push_str(&format!("  Losing Trades:     {}\n", state.losing_trades));
    out.push('\n');

    out.push_str("Performance Metrics:\n");
    out.push_str(&format!("  Total P&L:         ${:.2}\n", state.running_pnl));
    out.push_str(&format!("  Max Drawdown:      ${:.2}\n", state.max_drawdown));
    if let Some(win_rate) = summary.win_rate {
        out.push_str(&format!("  Win Rate:          {win_rate:.2}%\n"));
    }
    if let Some(avg_win) = summary.avg_win {
        out.push_str(&format!("  Average Win:       ${avg_win:.2}\n"));
    }
    if let Some(avg_loss) = summary.avg_loss {
        out.push_str(&format!("  Average Loss:      ${avg_loss:.2}\n"));
    }
    if let Some(pf) = summary.profit_factor {
        out.push_str(&format!("  Profit Factor:     {pf:.2}\n"));
    }

    if let (Some(side), Some(entry)) = (state.position.side(), state.position.entry_price()) {
        out.push('\n');
        out.push_str(&format!("Open Position:       {side} from ${entry:.2}"));
        if let Some(unrealized) = result.outcome.open_position_pnl() {
            out.push_str(&format!(" (unrealized ${unrealized:.2}, not in metrics)"));
        }
        out.push('\n');
    }

    if result.has_synthetic() {
        out.push_str("\nWARNING: Results based on SYNTHETIC data\n");
    }

    out.push('\n');
    out.push_str(RULE);
    out
}
