mod id;

pub use id::*;

use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Milliseconds since the unix epoch.
pub type Timestamp = i64;

/// Returns the current time as a [Timestamp].
pub fn now() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

/// Returns a random uppercase alphanumeric string.
pub fn random_code(length: usize) -> String {
    let mut rng = thread_rng();

    std::iter::repeat(())
        .map(|_| rng.sample(Alphanumeric) as char)
        .map(|c| c.to_ascii_uppercase())
        .take(length)
        .collect()
}

#[cfg(test)]
mod test {
    use super::random_code;

    #[test]
    fn random_code_is_uppercase() {
        let code = random_code(6);

        assert_eq!(code.len(), 6);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
