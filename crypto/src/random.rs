use rand::Rng;
use zeroize::Zeroizing;

/// Generate a random code of `length` ASCII digits.
///
/// Used for system-issued temporary PINs; the buffer is wiped on drop.
pub fn generate_numeric_code(length: usize) -> Zeroizing<String> {
    let mut rng = rand::thread_rng();
    let mut code = Zeroizing::new(String::with_capacity(length));
    for _ in 0..length {
        let digit: u8 = rng.gen_range(0..10);
        code.push(char::from(b'0' + digit));
    }
    code
}
