use flowgen_types::Rng;

use crate::error::Error;

/// Draw an index with probability `w_i / Σw`. All-zero weights mean nothing
/// is admissible. Single pass, stable under zero entries.
pub fn weighted_choice(weights: &[f64], rng: &mut Rng) -> Result<usize, Error> {
    let sum: f64 = weights.iter().sum();
    if sum == 0.0 {
        return Err(Error::NoCandidate);
    }
    let mut r = rng.next_f64(0.0, sum);
    for (index, weight) in weights.iter().enumerate() {
        r -= weight;
        if r <= 0.0 {
            return Ok(index);
        }
    }
    Ok(weights.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_all_zero() {
        let mut rng = Rng::new(1);
        assert_eq!(weighted_choice(&[0.0, 0.0], &mut rng), Err(Error::NoCandidate));
        assert_eq!(weighted_choice(&[], &mut rng), Err(Error::NoCandidate));
    }

    #[test]
    fn zero_entries_are_never_drawn() {
        let mut rng = Rng::new(2);
        for _ in 0..200 {
            let index = weighted_choice(&[0.0, 1.0, 0.0, 2.0], &mut rng).unwrap();
            assert!(index == 1 || index == 3);
        }
    }

    #[test]
    fn single_positive_weight_wins() {
        let mut rng = Rng::new(3);
        for _ in 0..20 {
            assert_eq!(weighted_choice(&[0.0, 0.0, 5.0], &mut rng).unwrap(), 2);
        }
    }
}
