//! Turns raw list-query parameters into bounded offset/limit and ORDER BY
//! fragments.

use crate::values::{Pagination, Sorts};

/// `(offset, limit)` for the requested page, with the clamps of
/// [`Pagination::new`] applied.
pub fn paginate(page: i64, size: i64, max_size: i64) -> (i64, i64) {
    let p = Pagination::new(page, size, max_size);
    (p.offset(), p.limit())
}

/// One `"{prefix.}{field} {ASC|DESC}"` fragment per well-formed directive in
/// `list`. Field names are not checked against any column list.
pub fn order_values(list: &str, prefix: Option<&str>) -> Vec<String> {
    Sorts::parse(list).fragments(prefix)
}

/// The fragments joined with `", "`; empty when nothing is sortable, in which
/// case no ORDER BY should be emitted.
pub fn order_clause(list: &str, prefix: Option<&str>) -> String {
    order_values(list, prefix).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_below_one_is_first_page() {
        for page in [0, -1, i64::MIN] {
            assert_eq!(paginate(page, 80, 0), paginate(1, 80, 0));
        }
    }

    #[test]
    fn zero_size_reaches_ceiling() {
        assert_eq!(paginate(1, 0, 0), (0, 500));
    }

    #[test]
    fn small_size_raised_to_floor() {
        assert_eq!(paginate(2, 10, 0), (50, 50));
    }

    #[test]
    fn offset_follows_page() {
        assert_eq!(paginate(4, 100, 0), (300, 100));
        assert_eq!(paginate(2, 900, 300), (300, 300));
    }

    #[test]
    fn order_drops_malformed_middle_segment() {
        assert_eq!(
            order_clause("+id,name,+created_at", Some("users")),
            "users.id ASC, users.created_at ASC"
        );
    }

    #[test]
    fn order_of_empty_list_is_empty() {
        assert_eq!(order_clause("", Some("")), "");
        assert!(order_values("", None).is_empty());
    }

    #[test]
    fn order_without_prefix() {
        assert_eq!(
            order_values("-lastname,+firstname", None),
            vec!["lastname DESC", "firstname ASC"]
        );
    }
}
