//! HMAC-SHA256 request signing.
//!
//! The exchange signs the form-encoded parameter string exactly as it is sent
//! on the wire, so [`encode_query`] is shared with the transport. Secrets are
//! never logged or included in error messages.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;

use crate::Result;
use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

/// Name of the parameter carrying the signature. Never part of the signed payload.
pub const SIGNATURE_PARAM: &str = "signature";

/// Encodes `params` as `application/x-www-form-urlencoded`, keeping caller order.
#[must_use]
pub fn encode_query(params: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

/// Signs the encoded form of `params` with `secret`.
///
/// Returns the lowercase hex HMAC-SHA256 digest. The caller supplies the
/// timestamp parameter; `params` must not already contain a signature.
pub fn sign(params: &[(String, String)], secret: &str) -> Result<String> {
    sign_payload(&encode_query(params), secret)
}

pub(crate) fn sign_payload(payload: &str, secret: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::config(format!("invalid signing key: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed(params: &[(String, String)], secret: &str) -> String {
        sign(params, secret).expect("signature")
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn reproduces_documented_vector() {
        let params = pairs(&[
            ("symbol", "LTCBTC"),
            ("side", "BUY"),
            ("type", "LIMIT"),
            ("timeInForce", "GTC"),
            ("quantity", "1"),
            ("price", "0.1"),
            ("recvWindow", "5000"),
            ("timestamp", "1499827319559"),
        ]);
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

        assert_eq!(
            signed(&params, secret),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let params = pairs(&[("symbol", "BTCUSDT"), ("timestamp", "1000")]);
        assert_eq!(signed(&params, "secret"), signed(&params, "secret"));
    }

    #[test]
    fn single_character_edits_change_signature() {
        let base = pairs(&[("symbol", "BTCUSDT"), ("quantity", "0.2"), ("timestamp", "1000")]);
        let reference = signed(&base, "secret");

        for (idx, _) in base.iter().enumerate() {
            let mut edited = base.clone();
            edited[idx].1.push('1');
            assert_ne!(signed(&edited, "secret"), reference, "edit of param {idx}");
        }
        assert_ne!(signed(&base, "secret2"), reference, "secret edit");
    }

    #[test]
    fn parameter_order_is_significant() {
        let a = pairs(&[("a", "1"), ("b", "2")]);
        let b = pairs(&[("b", "2"), ("a", "1")]);
        assert_ne!(signed(&a, "k"), signed(&b, "k"));
    }

    #[test]
    fn signature_is_lowercase_hex() {
        let sig = signed(&pairs(&[("k", "v")]), "secret");
        assert_eq!(sig.len(), 64);
        assert!(
            sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
            "{sig}"
        );
    }

    #[test]
    fn encoding_escapes_reserved_characters() {
        let params = pairs(&[("clientId", "a b&c=d"), ("timestamp", "1")]);
        assert_eq!(encode_query(&params), "clientId=a+b%26c%3Dd&timestamp=1");
    }

    #[test]
    fn empty_params_sign_the_empty_string() {
        assert_eq!(signed(&[], "secret"), sign_payload("", "secret").expect("signature"));
    }
}
