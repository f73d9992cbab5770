// sentiment_chart.rs
use crate::review_table::{ReviewTable, SENTIMENT_COLUMN};
use crate::sentiment_analyzer::{NEGATIVE, NEUTRAL, POSITIVE};
use crate::user_interaction::{print_insight_level_2, print_list_level_2};

/// Fixed display precedence for the breakdown.
pub const SENTIMENT_ORDER: [&str; 3] = [POSITIVE, NEUTRAL, NEGATIVE];

const BAR_WIDTH: usize = 40;

fn sentiment_color(label: &str) -> &'static str {
    match label {
        POSITIVE => "\x1b[1;32m",
        NEGATIVE => "\x1b[1;31m",
        _ => "\x1b[1;90m",
    }
}

/// Label frequencies for the filtered rows, restricted to labels actually
/// present, in the fixed precedence Positive, Neutral, Negative.
pub fn sentiment_counts(table: &ReviewTable) -> Vec<(String, usize)> {
    let raw_counts = table.value_counts(SENTIMENT_COLUMN);

    SENTIMENT_ORDER
        .iter()
        .filter_map(|label| {
            raw_counts
                .iter()
                .find(|(value, _)| value == label)
                .map(|(value, count)| (value.clone(), *count))
        })
        .collect()
}

fn bar_length(count: usize, max_count: usize) -> usize {
    if max_count == 0 || count == 0 {
        return 0;
    }
    // Largest bucket spans the full width; anything non-zero shows at
    // least one block
    ((count * BAR_WIDTH) / max_count).max(1)
}

pub fn render_bar_chart(counts: &[(String, usize)]) -> String {
    let reset = "\x1b[0m";
    let max_count = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);

    let mut chart = String::new();
    for (label, count) in counts {
        let bar = "\u{2588}".repeat(bar_length(*count, max_count));
        chart.push_str(&format!(
            "  {:<9}{}{}{} {}\n",
            label,
            sentiment_color(label),
            bar,
            reset,
            count
        ));
    }
    chart
}

/// Prints the per-product breakdown: a count table line per label and the
/// categorical bar chart underneath.
pub fn show_breakdown(filtered: &ReviewTable, product: &str) {
    if filtered.column_index(SENTIMENT_COLUMN).is_none() {
        print_insight_level_2("No Sentiment column yet. Run ANALYZE SENTIMENT first.");
        return;
    }

    let counts = sentiment_counts(filtered);
    if counts.is_empty() {
        print_insight_level_2("Nothing to chart for this selection.");
        return;
    }

    print_insight_level_2(&format!("Sentiment Breakdown for {}", product));

    let count_lines: Vec<String> = counts
        .iter()
        .map(|(label, count)| format!("{}: {} review(s)", label, count))
        .collect();
    let count_line_slices: Vec<&str> = count_lines.iter().map(AsRef::as_ref).collect();
    print_list_level_2(&count_line_slices);

    println!();
    print!("{}", render_bar_chart(&counts));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled_table(labels: &[&str]) -> ReviewTable {
        let mut csv = String::from("PRODUCT,SUMMARY,Sentiment\n");
        for label in labels {
            csv.push_str(&format!("Widget,some text,{}\n", label));
        }
        ReviewTable::from_csv_str(&csv).unwrap()
    }

    #[test]
    fn counts_follow_fixed_precedence() {
        let table = labelled_table(&["Negative", "Positive", "Negative", "Neutral"]);
        assert_eq!(
            sentiment_counts(&table),
            vec![
                ("Positive".to_string(), 1),
                ("Neutral".to_string(), 1),
                ("Negative".to_string(), 2)
            ]
        );
    }

    #[test]
    fn counts_only_include_labels_present() {
        let table = labelled_table(&["Positive", "Positive"]);
        assert_eq!(sentiment_counts(&table), vec![("Positive".to_string(), 2)]);

        let empty = labelled_table(&[]);
        assert!(sentiment_counts(&empty).is_empty());
    }

    #[test]
    fn bars_scale_to_the_largest_bucket() {
        assert_eq!(bar_length(8, 8), BAR_WIDTH);
        assert_eq!(bar_length(4, 8), BAR_WIDTH / 2);
        assert_eq!(bar_length(1, 1000), 1);
        assert_eq!(bar_length(0, 8), 0);
        assert_eq!(bar_length(0, 0), 0);
    }

    #[test]
    fn chart_renders_one_line_per_label_in_order() {
        let table = labelled_table(&["Negative", "Positive", "Negative"]);
        let chart = render_bar_chart(&sentiment_counts(&table));

        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Positive"));
        assert!(lines[1].contains("Negative"));

        // Negative is the larger bucket, so its bar is the longer one
        let blocks = |line: &str| line.matches('\u{2588}').count();
        assert_eq!(blocks(lines[1]), BAR_WIDTH);
        assert!(blocks(lines[0]) < blocks(lines[1]));
    }
}
