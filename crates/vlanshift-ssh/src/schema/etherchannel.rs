// `show etherchannel summary`
//
// Member lists wrap onto continuation lines indented under the `Ports`
// column, so rows are assembled across lines. Everything above the
// `Group  Port-channel` header (flag legend, counters) is skipped.

use super::Row;

pub(super) fn parse(output: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut current: Option<Row> = None;
    let mut in_table = false;

    for line in output.lines() {
        if !in_table {
            in_table = line.trim_start().starts_with("Group") && line.contains("Port-channel");
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = tokens.first() else {
            continue;
        };

        if first.chars().all(|c| c.is_ascii_digit()) {
            if let Some(row) = current.take() {
                rows.push(row);
            }
            current = start_row(&tokens);
        } else if let Some(row) = current.as_mut() {
            if tokens.iter().all(|t| split_member(t).is_some()) {
                push_members(row, &tokens);
            }
        }
    }
    rows.extend(current);
    rows
}

fn start_row(tokens: &[&str]) -> Option<Row> {
    let (group, rest) = tokens.split_first()?;
    let (po, rest) = rest.split_first()?;
    let (po_name, po_status) = split_member(po).unwrap_or((*po, ""));

    let mut row = Row::new()
        .with_text("group", *group)
        .with_text("po_name", po_name)
        .with_text("po_status", po_status)
        .with_list("interfaces", Vec::new())
        .with_list("interfaces_status", Vec::new());

    let members = match rest.split_first() {
        Some((protocol, members)) if split_member(protocol).is_none() => {
            row.set_text("protocol", *protocol);
            members
        }
        _ => {
            row.set_text("protocol", "");
            rest
        }
    };
    push_members(&mut row, members);
    Some(row)
}

fn push_members(row: &mut Row, tokens: &[&str]) {
    for (name, status) in tokens.iter().filter_map(|t| split_member(t)) {
        row.push_list("interfaces", name);
        row.push_list("interfaces_status", status);
    }
}

/// `Te1/1/1(P)` -> (`Te1/1/1`, `P`).
fn split_member(token: &str) -> Option<(&str, &str)> {
    let (name, flags) = token.strip_suffix(')')?.split_once('(')?;
    (!name.is_empty()).then_some((name, flags))
}
