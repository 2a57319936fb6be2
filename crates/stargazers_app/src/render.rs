use stargazers_core::{AppViewModel, Phase, StargazerRow};

const MISSING: &str = "-";
const HEADERS: [&str; 8] = [
    "#",
    "Username",
    "Followers",
    "Top Starred Repo",
    "Stars",
    "Language",
    "Watchers",
    "Forks",
];

/// One-line status for stderr while an aggregation is running.
pub fn status_line(view: &AppViewModel) -> Option<String> {
    if let Some(err) = &view.validation_error {
        return Some(format!("Invalid target {:?}: {}", view.input, err));
    }
    let target = view.target.as_ref()?;
    let line = match view.phase {
        Phase::Idle => return None,
        Phase::Fetching | Phase::Merging => format!(
            "Loading {}... {} stargazers after {} pages",
            target,
            view.rows.len(),
            view.pages_merged
        ),
        Phase::Complete => format!(
            "Done {}: {} stargazers with a top repository ({} skipped, {} pages)",
            target,
            view.rows.len(),
            view.skipped,
            view.pages_merged
        ),
        Phase::Error => format!(
            "Stopped {}: {} (partial result, {} stargazers)",
            target,
            view.failure
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown failure".to_string()),
            view.rows.len()
        ),
    };
    Some(line)
}

pub fn table(view: &AppViewModel, top: Option<usize>) -> String {
    let rows: Vec<[String; 8]> = visible_rows(view, top)
        .iter()
        .enumerate()
        .map(|(index, row)| cells(index + 1, row))
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(ToOwned::to_owned), &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    if view.partial {
        out.push_str("(partial result: aggregation stopped before the last page)\n");
    }
    out
}

pub fn json(view: &AppViewModel, top: Option<usize>) -> serde_json::Result<String> {
    let mut view = view.clone();
    if let Some(top) = top {
        view.rows.truncate(top);
    }
    serde_json::to_string_pretty(&view)
}

fn visible_rows(view: &AppViewModel, top: Option<usize>) -> &[StargazerRow] {
    let len = top.map_or(view.rows.len(), |top| top.min(view.rows.len()));
    &view.rows[..len]
}

fn cells(rank: usize, row: &StargazerRow) -> [String; 8] {
    [
        rank.to_string(),
        row.login.clone(),
        count(row.followers),
        row.repo_url
            .clone()
            .or_else(|| row.repo_name.clone())
            .unwrap_or_else(|| MISSING.to_string()),
        count(row.stars),
        row.language.clone().unwrap_or_else(|| MISSING.to_string()),
        count(row.watchers),
        count(row.forks),
    ]
}

fn count(value: Option<u64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |value| value.to_string())
}

fn push_line(out: &mut String, cells: &[String; 8], widths: &[usize; 8]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}
