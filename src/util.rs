/*!

  Utils for tests and demos.

*/

/// Compare rendered tables or circuits as strings up to indentation.
#[macro_export]
macro_rules! assert_table_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                assert_eq!(
                    left_val.lines().count(),
                    right_val.lines().count(),
                    "line counts differ"
                );
                for (left_line, right_line) in left_val.lines().zip(right_val.lines()) {
                    assert_eq!(left_line.trim(), right_line.trim());
                }
            }
        }
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                assert_eq!(
                    left_val.lines().count(),
                    right_val.lines().count(),
                    std::format_args!($($arg)+)
                );
                for (left_line, right_line) in left_val.lines().zip(right_val.lines()) {
                    assert_eq!(
                        left_line.trim(),
                        right_line.trim(),
                        std::format_args!($($arg)+)
                    );
                }
            }
        }
    };
}

/// Format a signal [Identifier](crate::circuit::Identifier) like `format!`.
#[macro_export]
macro_rules! format_id {
    ($($arg:tt)*) => {
        $crate::circuit::Identifier::new(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn format_id() {
        let id = format_id!("in_{}", 3);
        assert_eq!(id.get_name(), "in_3");
        assert!(crate::circuit::Identifier::is_valid(id.get_name()));
    }

    #[test]
    fn indentation_is_ignored() {
        assert_table_eq!("a\n  b\n", "  a\nb");
    }
}
