use der::Encode;
use sha2::{Digest, Sha256};

/// Compute SHA-256 hex digest of a byte slice.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex_encode(&hasher.finalize())
}

/// SHA-256 fingerprint over the DER encoding of a certificate or CRL.
pub fn fingerprint<T: Encode>(value: &T) -> Result<String, der::Error> {
    Ok(sha256_hex(&value.to_der()?))
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::Decode;
    use x509_cert::Certificate;

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn fingerprint_matches_file_digest() {
        let der = include_bytes!("../tests/fixtures/root.cer");
        let cert = Certificate::from_der(der).unwrap();
        assert_eq!(fingerprint(&cert).unwrap(), sha256_hex(der));
    }
}
