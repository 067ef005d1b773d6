use crate::token::{generate_otp_code, generate_session_token};

use std::collections::HashSet;

use googletest::assert_that;
use googletest::prelude::eq;
use proptest::prelude::*;

#[test]
fn given_many_tokens_when_generated_then_pairwise_distinct() {
    let tokens: HashSet<String> = (0..1000).map(|_| generate_session_token()).collect();

    assert_that!(tokens.len(), eq(1000));
}

#[test]
fn given_token_when_generated_then_url_safe_43_chars() {
    let token = generate_session_token();

    assert_that!(token.len(), eq(43));
    assert!(
        token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    );
}

proptest! {
    #[test]
    fn given_any_draw_when_generating_otp_then_six_digits_in_range(_seed in any::<u8>()) {
        let code = generate_otp_code();
        let value: u32 = code.parse().unwrap();

        prop_assert_eq!(code.len(), 6);
        prop_assert!((100_000..=999_999).contains(&value));
    }
}
