//! Content deduplication using xxhash.

use xxhash_rust::xxh3::xxh3_64;

/// Computes a content hash for deduplication.
#[must_use]
pub fn content_hash(text: &str) -> u64 {
    xxh3_64(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_content_same_hash() {
        let text = "Aadhaar enrolment is free of cost.";
        assert_eq!(content_hash(text), content_hash(text));
    }

    #[test]
    fn different_content_different_hash() {
        assert_ne!(
            content_hash("Aadhaar enrolment is free."),
            content_hash("Aadhaar update has a fee.")
        );
    }
}
