use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{sleep, Duration};

/// Picks a delay in `[min_delay, max_delay]`; a reversed or empty range means exactly `min_delay`.
pub fn pick_delay(min_delay: u64, max_delay: u64) -> u64 {
    if min_delay >= max_delay {
        return min_delay;
    }

    let mut rng = StdRng::from_entropy();
    rng.gen_range(min_delay..=max_delay)
}

pub async fn generate_random_delay(min_delay: u64, max_delay: u64) {
    let delay = pick_delay(min_delay, max_delay);
    if delay == 0 {
        return;
    }

    println!("Delay: {} milliseconds", delay);
    sleep(Duration::from_millis(delay)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_within_bounds() {
        for _ in 0..200 {
            let delay = pick_delay(500, 800);
            assert!((500..=800).contains(&delay));
        }
    }

    #[test]
    fn degenerate_ranges_use_the_minimum() {
        assert_eq!(pick_delay(1000, 1000), 1000);
        assert_eq!(pick_delay(900, 100), 900);
        assert_eq!(pick_delay(0, 0), 0);
    }
}
