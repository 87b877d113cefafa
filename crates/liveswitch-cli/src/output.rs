use liveswitch_core::FleetReport;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let line = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(headers.iter().map(|h| h.to_string()).collect());
    out.push_str(&line(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        out.push_str(&line(row.clone()));
    }
    out
}

/// Per-channel table, unreachable regions, then the summary line.
pub fn render_report(report: &FleetReport) -> String {
    let rows: Vec<Vec<String>> = report
        .results
        .iter()
        .map(|r| {
            let status = match (&r.succeeded, &r.failure) {
                (true, _) => "ok".to_string(),
                (false, Some(kind)) => format!("failed ({})", kind.as_str()),
                (false, None) => "failed".to_string(),
            };
            vec![
                r.group.clone(),
                r.region.clone(),
                r.channel_id.clone(),
                status,
                r.error_detail.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut out = render_table(&["GROUP", "REGION", "CHANNEL", "STATUS", "DETAIL"], &rows);
    for g in &report.group_errors {
        out.push_str(&format!(
            "region {} unreachable for group {}: {}\n",
            g.region, g.group, g.detail
        ));
    }
    out.push_str(&report.summary());
    out.push('\n');
    out
}
