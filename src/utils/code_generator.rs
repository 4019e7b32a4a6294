use rand::Rng;

/// Source of one-time passcodes.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform 6-digit codes, zero padded (`000000..=999999`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        generate_six_digit_code()
    }
}

pub fn generate_six_digit_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..=999_999u32))
}

/// Returns one fixed code; lets tests know the code that was "sent".
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FixedCodeGenerator(pub String);

#[cfg(test)]
impl CodeGenerator for FixedCodeGenerator {
    fn generate(&self) -> String {
        self.0.clone()
    }
}

/// Exactly six ASCII digits.
pub fn is_six_digit_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_six_digit_code() {
        for _ in 0..100 {
            let code = generate_six_digit_code();
            assert_eq!(code.len(), 6);
            assert!(is_six_digit_code(&code));
        }
    }

    #[test]
    fn test_fixed_generator() {
        let generator = FixedCodeGenerator("012345".to_string());
        assert_eq!(generator.generate(), "012345");
    }

    #[test]
    fn test_is_six_digit_code() {
        assert!(is_six_digit_code("000000"));
        assert!(is_six_digit_code("123456"));
        assert!(!is_six_digit_code("12345"));
        assert!(!is_six_digit_code("1234567"));
        assert!(!is_six_digit_code("12a456"));
        assert!(!is_six_digit_code("１２３４５６"));
    }
}
