use crate::error::MsortError;
use std::path::Path;

/// Hard capacity on the number of input integers. Inherited from the
/// original workload; exceeding it is a validation error, never a
/// silent truncation.
pub const MAX_ITEMS: usize = 4096;

/// First padding sentinel; padding values count up from here.
pub const PAD_BASE: i64 = 9000;

/// Read whitespace/newline-delimited integers from `path`.
pub fn read_items(path: &Path) -> Result<Vec<i64>, MsortError> {
    let text = std::fs::read_to_string(path)?;
    let mut items = Vec::new();
    for token in text.split_whitespace() {
        items.push(token.parse::<i64>()?);
        if items.len() > MAX_ITEMS {
            return Err(MsortError::InputTooLarge {
                found: items.len(),
                max: MAX_ITEMS,
            });
        }
    }
    if items.is_empty() {
        return Err(MsortError::EmptyInput);
    }
    Ok(items)
}

/// Pad `items` up to the next power of two with the sentinels
/// `9000, 9001, 9002, ...` and return the original length, so the
/// caller can print only the real items afterwards. Padding is by
/// count, not value comparison; sentinels sit above the workload's
/// valid input range. A length that is already a power of two is left
/// untouched.
pub fn pad_to_power_of_two(items: &mut Vec<i64>) -> usize {
    let count = items.len();
    if count == 0 {
        return 0;
    }
    let target = count.next_power_of_two();
    for i in 0..(target - count) {
        items.push(PAD_BASE + i as i64);
    }
    count
}

/// Render the first `count` items, ten per line, space-separated.
pub fn format_rows(items: &[i64], count: usize) -> String {
    let mut out = String::new();
    for row in items[..count.min(items.len())].chunks(10) {
        for value in row {
            out.push_str(&value.to_string());
            out.push(' ');
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("msort_input_test_{}", name));
        std::fs::write(&path, contents).expect("failed to write temp file");
        path
    }

    #[test]
    fn test_read_items_splits_on_any_whitespace() {
        let path = temp_file("whitespace.txt", "5 3\n8\t1\n  2 ");
        let items = read_items(&path).expect("read_items failed");
        assert_eq!(items, vec![5, 3, 8, 1, 2]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_items_rejects_garbage_and_empty() {
        let path = temp_file("garbage.txt", "5 three 8");
        assert!(matches!(
            read_items(&path),
            Err(MsortError::ParseInput(_))
        ));
        let _ = std::fs::remove_file(&path);

        let path = temp_file("empty.txt", "  \n ");
        assert!(matches!(read_items(&path), Err(MsortError::EmptyInput)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_items_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("msort_input_test_does_not_exist.txt");
        assert!(matches!(read_items(&path), Err(MsortError::Io(_))));
    }

    #[test]
    fn test_read_items_enforces_capacity() {
        let contents: String = (0..=MAX_ITEMS).map(|i| format!("{} ", i)).collect();
        let path = temp_file("too_big.txt", &contents);
        assert!(matches!(
            read_items(&path),
            Err(MsortError::InputTooLarge { max: MAX_ITEMS, .. })
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_pad_appends_sentinels_to_next_power_of_two() {
        let mut items = vec![4, 2, 9, 1, 7];
        let count = pad_to_power_of_two(&mut items);
        assert_eq!(count, 5);
        assert_eq!(items, vec![4, 2, 9, 1, 7, 9000, 9001, 9002]);
    }

    #[test]
    fn test_pad_leaves_power_of_two_lengths_alone() {
        let mut items = vec![3, 1, 2, 4];
        assert_eq!(pad_to_power_of_two(&mut items), 4);
        assert_eq!(items, vec![3, 1, 2, 4]);

        let mut empty: Vec<i64> = vec![];
        assert_eq!(pad_to_power_of_two(&mut empty), 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_format_rows_is_ten_per_line() {
        let items: Vec<i64> = (1..=23).collect();
        let out = format_rows(&items, 23);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "1 2 3 4 5 6 7 8 9 10 ");
        assert_eq!(lines[2], "21 22 23 ");
    }

    #[test]
    fn test_format_rows_truncates_to_count() {
        let items = vec![1, 2, 3, 9000, 9001];
        assert_eq!(format_rows(&items, 3), "1 2 3 \n");
    }
}
