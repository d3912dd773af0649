// Property tests for paragraph splitting, greedy wrapping and canvas height.
use journal_canvas::compositor::wrap::{split_paragraphs, wrap_columns};
use journal_canvas::compositor::{Compositor, StyleConfig, WrapMode, PARAGRAPH_SPACING};
use proptest::prelude::*;

fn words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z,.!']{1,24}", 0..60)
}

proptest! {
    #[test]
    fn wrapping_never_splits_words(words in words(), columns in 5usize..80) {
        let paragraph = words.join(" ");
        let lines = wrap_columns(&paragraph, columns);

        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
        let original: Vec<&str> = words.iter().map(String::as_str).collect();
        prop_assert_eq!(rejoined, original);
    }

    #[test]
    fn lines_fit_unless_a_single_long_word(words in words(), columns in 5usize..80) {
        let paragraph = words.join(" ");
        for line in wrap_columns(&paragraph, columns) {
            let width = line.chars().count();
            if width > columns {
                prop_assert!(!line.contains(' '), "overlong multi-word line: {:?}", line);
            }
        }
    }

    #[test]
    fn greedy_packing_leaves_no_room_for_the_next_word(words in words(), columns in 5usize..80) {
        let paragraph = words.join(" ");
        let lines = wrap_columns(&paragraph, columns);
        for pair in lines.windows(2) {
            let next_word = pair[1].split(' ').next().unwrap_or_default();
            let joined = pair[0].chars().count() + 1 + next_word.chars().count();
            prop_assert!(joined > columns);
        }
    }

    #[test]
    fn paragraph_gaps_are_count_minus_one(paragraphs in prop::collection::vec(words(), 1..6)) {
        let text = paragraphs
            .iter()
            .map(|w| w.join(" "))
            .collect::<Vec<_>>()
            .join("\n\n");
        prop_assert_eq!(split_paragraphs(&text).len(), paragraphs.len());

        let style = StyleConfig::default();
        let plan = Compositor::default().measure(&text, &style).expect("measure");
        let m = plan.metrics;

        prop_assert_eq!(m.paragraph_gaps(), paragraphs.len() - 1);
        let expected = m.line_height * (m.line_count.max(1) as u32)
            + PARAGRAPH_SPACING * (paragraphs.len() as u32 - 1)
            + 2 * style.padding;
        prop_assert_eq!(m.height, expected);
        prop_assert!(m.height >= 2 * style.padding + m.line_height);
    }

    #[test]
    fn column_budget_is_configurable(words in words(), columns in 5usize..40) {
        let paragraph = words.join(" ");
        let style = StyleConfig {
            wrap: WrapMode::Columns(columns),
            ..Default::default()
        };
        let plan = Compositor::default().measure(&paragraph, &style).expect("measure");
        prop_assert_eq!(plan.paragraphs[0].clone(), wrap_columns(&paragraph, columns));
    }
}
