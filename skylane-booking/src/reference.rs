use rand::Rng;

const REFERENCE_LEN: usize = 8;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates the customer-facing booking reference: 8 uppercase
/// alphanumeric characters, 36^8 possible values. Collisions are handled
/// by the checkout's bounded retry, not here.
pub fn new_booking_reference() -> String {
    let mut rng = rand::thread_rng();
    (0..REFERENCE_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_shape() {
        for _ in 0..100 {
            let reference = new_booking_reference();
            assert_eq!(reference.len(), 8);
            assert!(reference
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }
}
