use rand::Rng;

/// Display colors a new collection can be given.
pub const PALETTE: [&str; 8] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4", "#84CC16", "#F97316",
];

pub fn random_color<R: Rng>(rng: &mut R) -> &'static str {
    PALETTE[rng.random_range(0..PALETTE.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_colors_come_from_palette() {
        let mut rng = StdRng::seed_from_u64(7);
        let seen: HashSet<&str> = (0..200).map(|_| random_color(&mut rng)).collect();
        assert!(seen.iter().all(|c| PALETTE.contains(c)));
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_same_seed_same_color() {
        let a = random_color(&mut StdRng::seed_from_u64(42));
        let b = random_color(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
