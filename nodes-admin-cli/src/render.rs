//! Plain-text rendering of tables and metric cards

use nodes_admin_lib::console::MetricCard;
use nodes_admin_lib::table::CellValue;
use nodes_admin_lib::table::DataTable;
use nodes_admin_lib::table::Direction;
use unicode_width::UnicodeWidthStr;

const GAP: &str = "  ";

/// Renders the visible columns and rows as aligned text, with a row count.
pub fn table<R>(table: &DataTable<R>) -> String {
    let columns = table.visible_columns();
    let headers: Vec<String> = columns
        .iter()
        .map(|column| {
            let arrow = table
                .sort()
                .iter()
                .find(|(id, _)| id == column.id())
                .map(|(_, direction)| match direction {
                    Direction::Asc => " ↑",
                    Direction::Desc => " ↓",
                })
                .unwrap_or("");
            format!("{}{}", column.header(), arrow)
        })
        .collect();

    let visible = table.visible_rows();
    let cells: Vec<Vec<String>> = visible
        .iter()
        .map(|row| columns.iter().map(|c| cell(&c.value(row))).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in &cells {
        for (width, text) in widths.iter_mut().zip(row) {
            *width = (*width).max(text.width());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out.push_str(&format!("{} of {} rows", visible.len(), table.rows().len()));
    if table.is_filtered() {
        out.push_str(" (filtered)");
    }
    out.push('\n');
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(text, width)| pad(text, *width))
        .collect();
    out.push_str(line.join(GAP).trim_end());
    out.push('\n');
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn cell(value: &CellValue) -> String {
    match value {
        CellValue::Null => "-".to_string(),
        CellValue::Bool(true) => "yes".to_string(),
        CellValue::Bool(false) => "no".to_string(),
        CellValue::Timestamp(ts) => ts.format("%Y-%m-%d").to_string(),
        other => other.display(),
    }
}

/// Renders dashboard cards, one per line; the spacer becomes a blank line.
pub fn cards(cards: &[MetricCard]) -> String {
    let header_width = cards.iter().map(|c| c.header.width()).max().unwrap_or(0);
    let value_width = cards.iter().map(|c| c.value.width()).max().unwrap_or(0);

    let mut out = String::new();
    for card in cards {
        if card.is_spacer() {
            out.push('\n');
            continue;
        }
        let mut line = format!(
            "{}{}{:>vw$}{}{}",
            pad(&card.header, header_width),
            GAP,
            card.value,
            GAP,
            card.description,
            vw = value_width
        );
        if let Some(orcid) = card.orcid {
            line.push_str(&format!(" (ORCID {})", orcid));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use nodes_admin_lib::console::metric_cards;
    use nodes_admin_lib::console::users_table;
    use nodes_admin_lib::model::Analytics;
    use nodes_admin_lib::model::UserProfile;
    use nodes_admin_lib::table::FilterValue;

    use super::*;

    fn users() -> Vec<UserProfile> {
        vec![
            UserProfile {
                id: 1,
                name: "Ada".to_string(),
                email: "ada@example.org".to_string(),
                is_admin: true,
                ..Default::default()
            },
            UserProfile {
                id: 2,
                name: "Bartholomew".to_string(),
                email: "bart@example.org".to_string(),
                orcid: Some("0000-0002-1825-0097".to_string()),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_table_alignment() {
        let mut t = users_table(users());
        t.set_sort("name", Direction::Asc);
        let out = table(&t);
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("Name ↑"));
        assert!(lines[1].starts_with("-----------  "));
        assert!(lines[2].starts_with("Ada          ada@example.org"));
        assert!(lines[3].contains("0000-0002-1825-0097"));
        assert!(lines[2].contains("yes"));
        assert_eq!(lines[4], "2 of 2 rows");
    }

    #[test]
    fn test_filtered_count() {
        let mut t = users_table(users());
        t.set_filter("isAdmin", FilterValue::facets(["false"]));
        let out = table(&t);
        assert!(out.ends_with("1 of 2 rows (filtered)\n"));
        assert!(!out.contains("Ada"));
    }

    #[test]
    fn test_cards() {
        let analytics = Analytics {
            new_users_today: 12,
            new_orcid_users_today: 4,
            ..Default::default()
        };
        let out = cards(&metric_cards(&analytics));
        let first = out.lines().next().unwrap();
        assert!(first.starts_with("New users"));
        assert!(first.contains("+12"));
        assert!(first.ends_with("Today (ORCID 4)"));
        assert!(out.contains("\n\n"));
        assert!(out.contains("0B  Today"));
    }
}
