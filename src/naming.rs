//! Natural (human) ordering for gallery filenames.
//!
//! Photographers number their files without zero padding, so plain byte
//! order puts `10.jpg` before `2.jpg`. Natural order splits each name into
//! runs of digits and non-digits and compares digit runs by numeric value:
//!
//! ```text
//! byte order:     img1.jpg  img10.jpg  img2.jpg
//! natural order:  img1.jpg  img2.jpg   img10.jpg
//! ```
//!
//! Comparison is case-sensitive. When two names are equal under natural
//! order (`007.jpg` vs `7.jpg`) the one with fewer leading zeros sorts first,
//! and byte order breaks any remaining tie so the result is a total order.

use std::cmp::Ordering;

/// Split off the leading run of ASCII digits.
fn split_digits(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Compare two digit runs by value without overflowing on long runs.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
}

/// Compare two names in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut x, mut y) = (a, b);
    let mut zero_padding = Ordering::Equal;

    loop {
        match (x.chars().next(), y.chars().next()) {
            (None, None) => return zero_padding.then_with(|| a.cmp(b)),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(c), Some(d)) if c.is_ascii_digit() && d.is_ascii_digit() => {
                let (run_x, rest_x) = split_digits(x);
                let (run_y, rest_y) = split_digits(y);
                let ord = cmp_digits(run_x, run_y);
                if ord != Ordering::Equal {
                    return ord;
                }
                if zero_padding == Ordering::Equal {
                    zero_padding = run_x.len().cmp(&run_y.len());
                }
                x = rest_x;
                y = rest_y;
            }
            (Some(c), Some(d)) => {
                if c != d {
                    return c.cmp(&d);
                }
                x = &x[c.len_utf8()..];
                y = &y[d.len_utf8()..];
            }
        }
    }
}

/// Sort names in place by [`natural_cmp`].
pub fn natural_sort<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        natural_sort(&mut v);
        v
    }

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(
            sorted(&["img2.jpg", "img10.jpg", "img1.jpg"]),
            vec!["img1.jpg", "img2.jpg", "img10.jpg"]
        );
    }

    #[test]
    fn bare_numbers() {
        assert_eq!(
            sorted(&["10.jpg", "2.jpg", "1.jpg", "100.jpg", "20.jpg"]),
            vec!["1.jpg", "2.jpg", "10.jpg", "20.jpg", "100.jpg"]
        );
    }

    #[test]
    fn multiple_digit_runs() {
        assert_eq!(
            sorted(&["day2-shot10.jpg", "day10-shot1.jpg", "day2-shot9.jpg"]),
            vec!["day2-shot9.jpg", "day2-shot10.jpg", "day10-shot1.jpg"]
        );
    }

    #[test]
    fn case_sensitive_text() {
        // Uppercase sorts before lowercase, as in byte order.
        assert_eq!(sorted(&["b1.jpg", "B1.jpg"]), vec!["B1.jpg", "b1.jpg"]);
    }

    #[test]
    fn digits_before_letters() {
        assert_eq!(sorted(&["a.jpg", "1.jpg"]), vec!["1.jpg", "a.jpg"]);
    }

    #[test]
    fn separator_before_digit() {
        assert_eq!(sorted(&["img1.jpg", "img.jpg"]), vec!["img.jpg", "img1.jpg"]);
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(natural_cmp("img", "img1"), Ordering::Less);
        assert_eq!(natural_cmp("img1.jpg", "img1.jpg"), Ordering::Equal);
    }

    #[test]
    fn leading_zeros_tie_break() {
        assert_eq!(
            sorted(&["007.jpg", "7.jpg", "08.jpg"]),
            vec!["7.jpg", "007.jpg", "08.jpg"]
        );
    }

    #[test]
    fn very_long_digit_runs_do_not_overflow() {
        let big = "123456789012345678901234567890.jpg";
        let bigger = "923456789012345678901234567890.jpg";
        assert_eq!(natural_cmp(big, bigger), Ordering::Less);
        assert_eq!(natural_cmp("9.jpg", big), Ordering::Less);
    }

    #[test]
    fn non_ascii_names() {
        assert_eq!(
            sorted(&["café10.jpg", "café9.jpg"]),
            vec!["café9.jpg", "café10.jpg"]
        );
    }
}
