//! Standard bracket seeding order.

/// Seeds in bracket order for a power-of-two `size`.
///
/// Adjacent pairs form the opening matches. Seed 1 meets the lowest seed,
/// seed 2 the next lowest, and the two top seeds sit in opposite halves so
/// they can only meet in the final.
pub fn seeding_order(size: u32) -> Vec<u32> {
    let mut order = vec![1];
    let mut current = 1;
    while current < size {
        current *= 2;
        order = order
            .iter()
            .flat_map(|&seed| [seed, current + 1 - seed])
            .collect();
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeding_order_small() {
        assert_eq!(seeding_order(1), vec![1]);
        assert_eq!(seeding_order(2), vec![1, 2]);
        assert_eq!(seeding_order(4), vec![1, 4, 2, 3]);
        assert_eq!(seeding_order(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
    }

    #[test]
    fn test_seeding_order_sixteen() {
        assert_eq!(
            seeding_order(16),
            vec![1, 16, 8, 9, 4, 13, 5, 12, 2, 15, 7, 10, 3, 14, 6, 11]
        );
    }

    #[test]
    fn test_opening_pairs_sum() {
        for size in [4u32, 8, 16, 32, 64] {
            let order = seeding_order(size);
            assert_eq!(order.len(), size as usize);
            assert!(order.chunks(2).all(|pair| pair[0] + pair[1] == size + 1));
        }
    }
}
