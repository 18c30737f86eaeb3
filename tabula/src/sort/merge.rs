//! Stable merge sort tolerant of comparators that are not total orders.
//!
//! `slice::sort_by` may panic when a comparator violates total ordering,
//! and the built-in number and version comparators do.

use std::cmp::Ordering;

/// Sorts `items` with `compare`, keeping equal elements in input order.
///
/// The left element wins every merge step unless it compares `Greater`.
pub(crate) fn stable_sort_by<T, F>(items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = stable_sort_by(left, compare);
    let right = stable_sort_by(right, compare);
    merge(left, right, compare)
}

fn merge<T, F>(left: Vec<T>, right: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(l, r) != Ordering::Greater,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        merged.extend(next);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_and_keeps_ties_in_order() {
        let items = vec![(3, 'a'), (1, 'b'), (3, 'c'), (2, 'd'), (1, 'e')];
        let sorted = stable_sort_by(items, &mut |a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
        assert_eq!(
            sorted,
            vec![(1, 'b'), (1, 'e'), (2, 'd'), (3, 'a'), (3, 'c')]
        );
    }

    #[test]
    fn test_inconsistent_comparator_does_not_panic() {
        let items: Vec<i32> = (0..50).collect();
        let sorted = stable_sort_by(items, &mut |_: &i32, _: &i32| Ordering::Less);
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());

        let items: Vec<i32> = (0..7).collect();
        let sorted = stable_sort_by(items, &mut |_: &i32, _: &i32| Ordering::Greater);
        assert_eq!(sorted.len(), 7);
    }
}
