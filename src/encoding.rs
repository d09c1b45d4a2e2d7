/// Byte-encoder/decoder collaborator for the text operations. Injected by
/// callers; the file layer never owns or configures one beyond the UTF-8
/// default.
pub trait TextEncoding {
    fn encode(&self, text: &str) -> Vec<u8>;
    fn decode(&self, bytes: &[u8]) -> String;
}

/// Default encoding. Decoding is lossy: undecodable sequences become
/// replacement characters rather than errors, matching how text decoders
/// behave on the platform this crate targets.
#[derive(Debug, Default, Clone, Copy)]
pub struct Utf8;

impl TextEncoding for Utf8 {
    fn encode(&self, text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    fn decode(&self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Little-endian UTF-16, the native wide-string encoding of the Win32 API.
#[derive(Debug, Default, Clone, Copy)]
pub struct Utf16Le;

impl TextEncoding for Utf16Le {
    fn encode(&self, text: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    }
}
