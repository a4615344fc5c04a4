use super::*;

/// Fixed-metric measurer: every word is 100px wide and each joining space
/// adds 10px.
fn fixed_measure(s: &str) -> ReelResult<f64> {
    let words = s.split_whitespace().count() as f64;
    if words == 0.0 {
        return Ok(0.0);
    }
    Ok(words * 100.0 + (words - 1.0) * 10.0)
}

#[test]
fn greedy_wrap_packs_deterministically() {
    // 8 words at 100px + 10px spacing against a 430px line: exactly 4 words
    // fit per line (430px), a fifth (540px) spills.
    let text = "one two three four five six seven eight";
    let lines = wrap_greedy(text, 430.0, &mut fixed_measure).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "one two three four");
    assert_eq!(lines[1], "five six seven eight");
}

#[test]
fn single_word_never_splits() {
    let lines = wrap_greedy("supercalifragilistic", 50.0, &mut fixed_measure).unwrap();
    assert_eq!(lines, vec!["supercalifragilistic".to_string()]);
}

#[test]
fn wide_word_flushes_current_line() {
    let mut measure = |s: &str| -> ReelResult<f64> {
        Ok(s.split_whitespace()
            .map(|w| if w == "wide" { 500.0 } else { 80.0 })
            .sum::<f64>())
    };
    let lines = wrap_greedy("a b wide c", 200.0, &mut measure).unwrap();
    assert_eq!(lines, vec!["a b", "wide", "c"]);
}

#[test]
fn empty_text_wraps_to_no_lines() {
    assert!(wrap_greedy("", 430.0, &mut fixed_measure).unwrap().is_empty());
    assert!(
        wrap_greedy("   ", 430.0, &mut fixed_measure)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn block_metrics_stack_lines_with_spacing() {
    let mut measure = |s: &str| -> ReelResult<(f64, f64)> { Ok((fixed_measure(s)?, 80.0)) };
    let block = layout_block(
        vec!["one two".to_string(), "three".to_string()],
        10.0,
        &mut measure,
    )
    .unwrap();
    assert_eq!(block.lines.len(), 2);
    assert_eq!(block.max_line_width, 210.0);
    assert_eq!(block.total_height, 80.0 + 10.0 + 80.0);
}

#[test]
fn single_line_block_has_no_spacing() {
    let mut measure = |s: &str| -> ReelResult<(f64, f64)> { Ok((fixed_measure(s)?, 80.0)) };
    let block = layout_block(vec!["solo".to_string()], 10.0, &mut measure).unwrap();
    assert_eq!(block.total_height, 80.0);
}
