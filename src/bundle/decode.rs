// decode.rs — Certificate, CRL and XML decoding for bundle fixtures
//
// Both components are built explicitly from the harness configuration and
// handed to the loader; there is no process-wide decoder state.
//
// Certificates and CRLs are accepted as DER or PEM (labels CERTIFICATE and
// X509 CRL). Text before the first PEM block, later blocks and bytes after
// the first DER value are ignored. Each file is read in one call and its
// handle is closed before decoding starts.
//
// Signature documents may be in any encoding an XML parser would accept
// from a byte stream; they are decoded to UTF-8 before parsing.

use der::{Decode, DecodeOwned, SliceReader};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::fs;
use std::path::Path;
use x509_cert::crl::CertificateList;
use x509_cert::Certificate;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult, MaterialKind};

const PEM_CERTIFICATE_LABEL: &str = "CERTIFICATE";
const PEM_CRL_LABEL: &str = "X509 CRL";
const PEM_BEGIN: &[u8] = b"-----BEGIN ";
const PEM_END: &[u8] = b"-----END ";

#[derive(Debug, Clone)]
pub struct CertificateDecoder {
    _private: (),
}

impl CertificateDecoder {
    pub fn new(config: &HarnessConfig) -> HarnessResult<Self> {
        if config.certificate_extensions.is_empty() {
            return Err(HarnessError::CertificateDecoderUnavailable(
                "no certificate extensions configured".to_string(),
            ));
        }
        if config.crl_extensions.is_empty() {
            return Err(HarnessError::CertificateDecoderUnavailable(
                "no CRL extensions configured".to_string(),
            ));
        }
        Ok(CertificateDecoder { _private: () })
    }

    pub fn read_certificate(&self, path: &Path) -> HarnessResult<Certificate> {
        let bytes = fs::read(path).map_err(|e| HarnessError::io(path, e))?;
        self.decode_certificate(&bytes)
            .map_err(|detail| HarnessError::Decoding {
                path: path.to_path_buf(),
                kind: MaterialKind::Certificate,
                detail,
            })
    }

    pub fn read_crl(&self, path: &Path) -> HarnessResult<CertificateList> {
        let bytes = fs::read(path).map_err(|e| HarnessError::io(path, e))?;
        self.decode_crl(&bytes).map_err(|detail| HarnessError::Decoding {
            path: path.to_path_buf(),
            kind: MaterialKind::Crl,
            detail,
        })
    }

    pub fn decode_certificate(&self, bytes: &[u8]) -> Result<Certificate, String> {
        decode_material(bytes, PEM_CERTIFICATE_LABEL)
    }

    pub fn decode_crl(&self, bytes: &[u8]) -> Result<CertificateList, String> {
        decode_material(bytes, PEM_CRL_LABEL)
    }
}

fn decode_material<T: DecodeOwned>(bytes: &[u8], pem_label: &str) -> Result<T, String> {
    match find(bytes, PEM_BEGIN) {
        Some(begin) => {
            let der_bytes = pem_to_der(first_pem_block(&bytes[begin..]), pem_label)?;
            decode_first_value(&der_bytes)
        }
        None => decode_first_value(bytes),
    }
}

fn decode_first_value<T: DecodeOwned>(der_bytes: &[u8]) -> Result<T, String> {
    let mut reader = SliceReader::new(der_bytes).map_err(|e| e.to_string())?;
    <T as Decode>::decode(&mut reader).map_err(|e| e.to_string())
}

/// Cut `pem` (starting at a BEGIN boundary) after its first END boundary.
fn first_pem_block(pem: &[u8]) -> &[u8] {
    let Some(end) = find(pem, PEM_END) else {
        return pem;
    };
    let label_start = end + PEM_END.len();
    match find(&pem[label_start..], b"-----") {
        Some(close) => &pem[..label_start + close + 5],
        None => pem,
    }
}

fn pem_to_der(pem: &[u8], expected_label: &str) -> Result<Vec<u8>, String> {
    use pem_rfc7468::Decoder;

    let mut decoder = Decoder::new(pem).map_err(|e| format!("invalid PEM: {}", e))?;
    let label = decoder.type_label();
    if label != expected_label {
        return Err(format!(
            "unexpected PEM label {:?}, expected {:?}",
            label, expected_label
        ));
    }

    let mut der_bytes = vec![0u8; decoder.remaining_len()];
    let len = decoder
        .decode(&mut der_bytes)
        .map_err(|e| format!("invalid PEM: {}", e))?
        .len();
    der_bytes.truncate(len);
    Ok(der_bytes)
}

/// Namespace-aware XML parser for signature documents.
#[derive(Debug, Clone)]
pub struct DocumentParser {
    nodes_limit: u32,
}

impl DocumentParser {
    pub fn new(config: &HarnessConfig) -> HarnessResult<Self> {
        if config.max_document_nodes == 0 {
            return Err(HarnessError::DocumentParserUnavailable(
                "max_document_nodes must be greater than zero".to_string(),
            ));
        }
        Ok(DocumentParser {
            nodes_limit: config.max_document_nodes,
        })
    }

    /// Read a signature document and decode it to text.
    pub fn read_document(&self, path: &Path) -> HarnessResult<String> {
        let bytes = fs::read(path).map_err(|e| HarnessError::io(path, e))?;
        self.decode_text(&bytes)
            .map_err(|detail| HarnessError::DocumentParse {
                path: path.to_path_buf(),
                detail,
            })
    }

    /// Decode raw document bytes.
    ///
    /// The encoding comes from the byte order mark if there is one, then
    /// from the first bytes of a BOM-less UTF-16 document, then from the
    /// `encoding` of the XML declaration. Otherwise the bytes must be UTF-8.
    /// Labels follow the WHATWG table, so ISO-8859-1 decodes as windows-1252.
    pub fn decode_text(&self, bytes: &[u8]) -> Result<String, String> {
        let (encoding, body) = match Encoding::for_bom(bytes) {
            Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
            None => (sniff_encoding(bytes)?, bytes),
        };
        encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .map(|text| text.into_owned())
            .ok_or_else(|| format!("document is not valid {}", encoding.name()))
    }

    pub fn parse<'a>(&self, path: &Path, text: &'a str) -> HarnessResult<roxmltree::Document<'a>> {
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;
        options.nodes_limit = self.nodes_limit;

        roxmltree::Document::parse_with_options(text, options).map_err(|e| {
            HarnessError::DocumentParse {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }
        })
    }
}

fn sniff_encoding(bytes: &[u8]) -> Result<&'static Encoding, String> {
    if bytes.starts_with(b"<\0?\0") {
        return Ok(UTF_16LE);
    }
    if bytes.starts_with(b"\0<\0?") {
        return Ok(UTF_16BE);
    }
    let Some(label) = declared_encoding(bytes) else {
        return Ok(UTF_8);
    };
    match Encoding::for_label(label) {
        // 8-bit body under a UTF-16 label: read as UTF-8
        Some(encoding) if encoding == UTF_16LE || encoding == UTF_16BE => Ok(UTF_8),
        Some(encoding) => Ok(encoding),
        None => Err(format!(
            "unsupported encoding {:?}",
            String::from_utf8_lossy(label)
        )),
    }
}

/// The `encoding` value of an ASCII-compatible XML declaration.
fn declared_encoding(bytes: &[u8]) -> Option<&[u8]> {
    if !bytes.starts_with(b"<?xml") {
        return None;
    }
    let declaration = &bytes[..find(bytes, b"?>")?];
    let rest = &declaration[find(declaration, b"encoding")? + b"encoding".len()..];
    let rest = skip_whitespace(rest);
    if rest.first() != Some(&b'=') {
        return None;
    }
    let rest = skip_whitespace(&rest[1..]);
    let quote = *rest.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value = &rest[1..];
    let len = value.iter().position(|&b| b == quote)?;
    Some(&value[..len])
}

fn skip_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT_DER: &[u8] = include_bytes!("../../tests/fixtures/root.cer");
    const ROOT_PEM: &[u8] = include_bytes!("../../tests/fixtures/root-pem.crt");
    const CRL_DER: &[u8] = include_bytes!("../../tests/fixtures/revoked.crl");
    const SIG_LATIN1: &[u8] = include_bytes!("../../tests/fixtures/sig-latin1.xml");
    const SIG_UTF16: &[u8] = include_bytes!("../../tests/fixtures/sig-utf16.xml");

    fn decoder() -> CertificateDecoder {
        CertificateDecoder::new(&HarnessConfig::default()).unwrap()
    }

    #[test]
    fn decodes_der_certificate() {
        let cert = decoder().decode_certificate(ROOT_DER).unwrap();
        let subject = cert.tbs_certificate.subject.to_string();
        assert!(subject.contains("Interop Test Root"), "subject was {subject}");
    }

    #[test]
    fn pem_and_der_decode_to_the_same_certificate() {
        let der = decoder().decode_certificate(ROOT_DER).unwrap();
        let pem = decoder().decode_certificate(ROOT_PEM).unwrap();
        assert_eq!(der, pem);
    }

    #[test]
    fn decodes_der_crl() {
        let crl = decoder().decode_crl(CRL_DER).unwrap();
        let revoked = crl.tbs_cert_list.revoked_certificates.unwrap_or_default();
        assert_eq!(revoked.len(), 1);
    }

    #[test]
    fn certificate_bytes_are_not_a_crl() {
        assert!(decoder().decode_crl(ROOT_DER).is_err());
    }

    #[test]
    fn pem_label_must_match() {
        let err = decoder().decode_crl(ROOT_PEM).unwrap_err();
        assert!(err.contains("unexpected PEM label"), "{err}");
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(decoder().decode_certificate(b"not a certificate").is_err());
        assert!(decoder().decode_certificate(b"").is_err());
    }

    #[test]
    fn text_before_pem_block_is_skipped() {
        let mut bundle = b"Bag Attributes\n    localKeyID: 01 00 00 00\n".to_vec();
        bundle.extend_from_slice(ROOT_PEM);
        let cert = decoder().decode_certificate(&bundle).unwrap();
        assert_eq!(cert, decoder().decode_certificate(ROOT_DER).unwrap());
    }

    #[test]
    fn only_the_first_pem_block_is_decoded() {
        let mut chain = ROOT_PEM.to_vec();
        chain.extend_from_slice(b"-----BEGIN X509 CRL-----\nnot base64\n-----END X509 CRL-----\n");
        let cert = decoder().decode_certificate(&chain).unwrap();
        assert_eq!(cert, decoder().decode_certificate(ROOT_DER).unwrap());
    }

    #[test]
    fn trailing_bytes_after_der_value_are_ignored() {
        let mut padded = ROOT_DER.to_vec();
        padded.extend_from_slice(b"\x00\x00trailer");
        let cert = decoder().decode_certificate(&padded).unwrap();
        assert_eq!(cert, decoder().decode_certificate(ROOT_DER).unwrap());

        let mut padded_crl = CRL_DER.to_vec();
        padded_crl.push(0);
        assert!(decoder().decode_crl(&padded_crl).is_ok());
    }

    #[test]
    fn read_errors_carry_path_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.crl");
        fs::write(&path, b"\x30\x03\x02\x01").unwrap();

        match decoder().read_crl(&path) {
            Err(HarnessError::Decoding { path: p, kind, .. }) => {
                assert_eq!(p, path);
                assert_eq!(kind, MaterialKind::Crl);
            }
            other => panic!("expected Decoding error, got {other:?}"),
        }
    }

    #[test]
    fn decoder_requires_extensions() {
        let config = HarnessConfig {
            crl_extensions: vec![],
            ..HarnessConfig::default()
        };
        assert!(matches!(
            CertificateDecoder::new(&config),
            Err(HarnessError::CertificateDecoderUnavailable(_))
        ));
    }

    #[test]
    fn parser_enforces_node_limit() {
        let config = HarnessConfig {
            max_document_nodes: 3,
            ..HarnessConfig::default()
        };
        let parser = DocumentParser::new(&config).unwrap();
        let text = "<a><b/><c/><d/><e/></a>";
        assert!(matches!(
            parser.parse(Path::new("big.xml"), text),
            Err(HarnessError::DocumentParse { .. })
        ));
    }

    #[test]
    fn parser_requires_positive_limit() {
        let config = HarnessConfig {
            max_document_nodes: 0,
            ..HarnessConfig::default()
        };
        assert!(matches!(
            DocumentParser::new(&config),
            Err(HarnessError::DocumentParserUnavailable(_))
        ));
    }

    #[test]
    fn parser_rejects_malformed_xml() {
        let parser = DocumentParser::new(&HarnessConfig::default()).unwrap();
        assert!(parser.parse(Path::new("bad.xml"), "<open>").is_err());
        assert!(parser.parse(Path::new("ok.xml"), "<closed/>").is_ok());
    }

    fn parser() -> DocumentParser {
        DocumentParser::new(&HarnessConfig::default()).unwrap()
    }

    #[test]
    fn decodes_declared_latin1() {
        let text = parser().decode_text(SIG_LATIN1).unwrap();
        assert!(text.contains("signed contént"));
        let doc = parser().parse(Path::new("sig-latin1.xml"), &text).unwrap();
        assert_eq!(doc.root_element().tag_name().name(), "root");
    }

    #[test]
    fn decodes_utf16_with_bom() {
        let text = parser().decode_text(SIG_UTF16).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("signed contént"));
        assert!(parser().parse(Path::new("sig-utf16.xml"), &text).is_ok());
    }

    #[test]
    fn decodes_utf16be_without_bom() {
        let be: Vec<u8> = "<?xml version=\"1.0\"?><a>é</a>"
            .encode_utf16()
            .flat_map(|unit| unit.to_be_bytes())
            .collect();
        assert_eq!(parser().decode_text(&be).unwrap(), "<?xml version=\"1.0\"?><a>é</a>");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let text = parser().decode_text(b"\xEF\xBB\xBF<a/>").unwrap();
        assert_eq!(text, "<a/>");
    }

    #[test]
    fn undeclared_non_utf8_is_rejected() {
        let err = parser().decode_text(b"<a>caf\xE9</a>").unwrap_err();
        assert!(err.contains("UTF-8"), "{err}");
    }

    #[test]
    fn unknown_declared_encoding_is_rejected() {
        let err = parser()
            .decode_text(b"<?xml version='1.0' encoding='x-klingon'?><a/>")
            .unwrap_err();
        assert!(err.contains("x-klingon"), "{err}");
    }

    #[test]
    fn undecodable_document_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig.xml");
        fs::write(&path, b"<a>caf\xE9</a>").unwrap();

        match parser().read_document(&path) {
            Err(HarnessError::DocumentParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected DocumentParse, got {other:?}"),
        }
    }
}
