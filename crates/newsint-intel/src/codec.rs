//! Fingerprint vector codec: fixed-dimension float vectors to and from the
//! opaque byte blobs stored in the `articles.embedding` column.

/// Fingerprint dimension of the embedding model (all-MiniLM class).
///
/// A deployment-time invariant: changing the model dimension invalidates
/// every stored blob.
pub const EMBEDDING_DIM: usize = 384;

/// The all-zero fallback fingerprint.
///
/// A zero vector signals an upstream embedding failure; the similarity
/// scorer treats it as matching nothing.
#[must_use]
pub fn zero_vector() -> Vec<f32> {
    vec![0.0; EMBEDDING_DIM]
}

/// Serialize a fingerprint to its storage blob (little-endian f32s).
#[must_use]
pub fn serialize_vector(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Deserialize a storage blob back into a fingerprint.
///
/// Exact inverse of [`serialize_vector`] for well-formed input. A blob of
/// any other length is corrupt; it decodes to the zero vector (logged) so
/// downstream similarity comparisons stay total.
#[must_use]
pub fn deserialize_vector(bytes: &[u8]) -> Vec<f32> {
    if bytes.len() != EMBEDDING_DIM * 4 {
        tracing::warn!(
            len = bytes.len(),
            expected = EMBEDDING_DIM * 4,
            "corrupt embedding blob, substituting zero vector"
        );
        return zero_vector();
    }

    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_exact() {
        #[allow(clippy::cast_precision_loss)]
        let vector: Vec<f32> = (0..EMBEDDING_DIM)
            .map(|i| (i as f32) * 0.031 - 3.7)
            .collect();

        let decoded = deserialize_vector(&serialize_vector(&vector));
        assert_eq!(decoded, vector, "round trip must be bit-exact");
    }

    #[test]
    fn round_trip_preserves_special_values() {
        let mut vector = zero_vector();
        vector[0] = f32::MIN_POSITIVE;
        vector[1] = -0.0;
        vector[2] = f32::MAX;

        let decoded = deserialize_vector(&serialize_vector(&vector));
        assert_eq!(decoded.len(), EMBEDDING_DIM);
        assert_eq!(decoded[0], f32::MIN_POSITIVE);
        assert_eq!(decoded[2], f32::MAX);
    }

    #[test]
    fn corrupt_blob_decodes_to_zero_vector() {
        assert_eq!(deserialize_vector(&[]), zero_vector());
        assert_eq!(deserialize_vector(&[1, 2, 3]), zero_vector());
        // Right alignment, wrong dimension.
        assert_eq!(deserialize_vector(&[0_u8; 16]), zero_vector());
    }

    #[test]
    fn serialized_length_is_four_bytes_per_component() {
        let blob = serialize_vector(&zero_vector());
        assert_eq!(blob.len(), EMBEDDING_DIM * 4);
    }
}
