use serde::{Deserialize, Serialize};

/// A credential-exchange response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    /// The opaque bearer token.
    pub access_token: String,

    /// The token scheme, `"bearer"` in practice.
    pub token_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_parses() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc.def.ghi", "token_type": "bearer"}"#)
                .unwrap();
        assert_eq!(response.access_token, "abc.def.ghi");
        assert_eq!(response.token_type, "bearer");
    }
}
