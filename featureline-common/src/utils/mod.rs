/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 03/09/2026
Last Modified: 20/09/2026
License: MIT
*/

use std::time::Instant;

/// Returns a formatted string of elapsed time, e.g.
/// `1min 34.852s`
pub fn get_formatted_elapsed_time(instant: Instant) -> String {
    let dur = instant.elapsed();
    let minutes = dur.as_secs() / 60;
    let sub_sec = dur.as_secs() % 60;
    let sub_milli = dur.subsec_millis();
    if minutes > 0 {
        return format!("{}min {}.{:03}s", minutes, sub_sec, sub_milli);
    }
    format!("{}.{:03}s", sub_sec, sub_milli)
}

/// Percentage of `total` reached after `i` of them have been processed.
pub fn progress_percent(i: usize, total: usize) -> usize {
    if total == 0 {
        return 100;
    }
    (100f64 * (i + 1) as f64 / total as f64) as usize
}

pub fn wrapped_print(val: &str, width: usize) {
    println!("{}", wrapped_text(val, width));
}

/// Re-flows each paragraph of `val` to lines no longer than `width`.
pub fn wrapped_text(val: &str, width: usize) -> String {
    let paragraphs: Vec<&str> = val.split("\n\n").collect();
    let mut ret = String::new();
    for (i, paragraph) in paragraphs.iter().enumerate() {
        let s = paragraph.replace('\n', " ");
        let mut line = String::new();
        for word in s.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
            } else if line.len() + word.len() + 1 <= width {
                line.push(' ');
                line.push_str(word);
            } else {
                ret.push_str(&format!("{}\n", line));
                line = word.to_string();
            }
        }
        ret.push_str(&line);
        if i < paragraphs.len() - 1 {
            ret.push_str("\n\n");
        }
    }
    ret
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrapped_text() {
        let text = "Closes gaps between the endpoints\nof nearby lines.\n\nSecond paragraph.";
        assert_eq!(
            wrapped_text(text, 20),
            "Closes gaps between\nthe endpoints of\nnearby lines.\n\nSecond paragraph."
        );
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 4), 25);
        assert_eq!(progress_percent(3, 4), 100);
        assert_eq!(progress_percent(0, 0), 100);
    }
}
