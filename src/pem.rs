//! PEM envelope scanning and encoding shared by all codecs.
//!
//! Blocks are located in arbitrary input, so that leading text and
//! concatenated documents can be handled, and each block is then decoded by
//! the lenient [`pem`](::pem) parser. It accepts any base64 line width and
//! RFC 1421 headers. Encoding goes through [`pem_rfc7468`], which always
//! produces the canonical form.

use std::io::Write;

use base64ct::LineEnding;

use crate::errors::PkiError;

const PRE_ENCAPSULATION_BOUNDARY: &[u8] = b"-----BEGIN ";
const POST_ENCAPSULATION_BOUNDARY: &[u8] = b"-----END ";
const ENCAPSULATION_BOUNDARY_DELIMITER: &[u8] = b"-----";

/// A single decoded PEM block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block {
    label: String,
    contents: Vec<u8>,
}

impl Block {
    /// The label from the encapsulation boundaries, e.g. `CERTIFICATE`.
    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    /// Take the decoded contents, provided the block carries `label`.
    pub(crate) fn into_contents(self, label: &str) -> Result<Vec<u8>, PkiError> {
        if self.label != label {
            return Err(PkiError::UnexpectedBlockType(self.label));
        }
        Ok(self.contents)
    }

    /// Split the block into its label and decoded contents.
    pub(crate) fn into_parts(self) -> (String, Vec<u8>) {
        (self.label, self.contents)
    }
}

/// Find and decode the next PEM block in `input`.
///
/// Anything before the block is skipped, as is any candidate block which
/// fails to decode. Returns the block along with the input following its
/// post-encapsulation boundary line, or `None` when no block remains.
pub(crate) fn decode(input: &[u8]) -> Option<(Block, &[u8])> {
    let mut offset = 0;
    while let Some(start) = find_boundary(input, offset) {
        if let Some((block, len)) = decode_block(&input[start..]) {
            return Some((block, &input[start + len..]));
        }
        offset = start + PRE_ENCAPSULATION_BOUNDARY.len();
    }
    None
}

/// Encode `contents` as a PEM block with `label` and write it to `out`.
///
/// Output uses 64 column base64 lines and LF line endings, with a
/// trailing newline after the post-encapsulation boundary.
pub(crate) fn encode<W>(out: &mut W, label: &str, contents: &[u8]) -> Result<(), PkiError>
where
    W: Write + ?Sized,
{
    let document = pem_rfc7468::encode_string(label, LineEnding::LF, contents)?;
    out.write_all(document.as_bytes())?;
    Ok(())
}

/// Offset of the next pre-encapsulation boundary at or after `offset`
/// which starts a line.
fn find_boundary(input: &[u8], mut offset: usize) -> Option<usize> {
    while let Some(pos) = find(&input[offset..], PRE_ENCAPSULATION_BOUNDARY) {
        let start = offset + pos;
        if start == 0 || input[start - 1] == b'\n' {
            return Some(start);
        }
        offset = start + PRE_ENCAPSULATION_BOUNDARY.len();
    }
    None
}

/// Decode the block at the start of `candidate`, returning it with the
/// number of bytes it spans (including the line ending after the
/// post-encapsulation boundary).
fn decode_block(candidate: &[u8]) -> Option<(Block, usize)> {
    let header_len = candidate
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(candidate.len());

    let label = trim_line(&candidate[..header_len])
        .strip_prefix(PRE_ENCAPSULATION_BOUNDARY)?
        .strip_suffix(ENCAPSULATION_BOUNDARY_DELIMITER)?;

    let mut post_boundary = POST_ENCAPSULATION_BOUNDARY.to_vec();
    post_boundary.extend_from_slice(label);
    post_boundary.extend_from_slice(ENCAPSULATION_BOUNDARY_DELIMITER);

    let end = header_len + find(&candidate[header_len..], &post_boundary)? + post_boundary.len();

    match ::pem::parse(&candidate[..end]) {
        Ok(document) => {
            let block = Block {
                label: document.tag().to_owned(),
                contents: document.into_contents(),
            };
            tracing::trace!(
                label = %block.label,
                len = block.contents.len(),
                "decoded PEM block"
            );
            Some((block, end + line_ending_len(&candidate[end..])))
        }
        Err(error) => {
            tracing::trace!(
                label = %String::from_utf8_lossy(label),
                %error,
                "skipping PEM block which failed to decode"
            );
            None
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn trim_line(line: &[u8]) -> &[u8] {
    let len = line
        .iter()
        .rposition(|b| !matches!(b, b' ' | b'\t' | b'\r'))
        .map_or(0, |pos| pos + 1);
    &line[..len]
}

fn line_ending_len(rest: &[u8]) -> usize {
    if rest.starts_with(b"\r\n") {
        2
    } else if rest.starts_with(b"\n") {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const HELLO: &str = "-----BEGIN TEST-----\naGVsbG8=\n-----END TEST-----\n";

    #[test]
    fn encode_wraps_with_trailing_newline() {
        let mut buf = Vec::new();
        encode(&mut buf, "TEST", b"hello").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), HELLO);
    }

    #[test]
    fn encode_wraps_base64_at_64_columns() {
        let mut buf = Vec::new();
        encode(&mut buf, "TEST", &[0u8; 100]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1].len(), 64);
        assert_eq!(lines[2].len(), 64);
        assert_eq!(lines[3].len(), 8);
        assert!(!text.contains('\r'));
    }

    #[test]
    fn decode_skips_leading_text() {
        let input = format!("Subject: example\n{HELLO}trailing");
        let (block, rest) = decode(input.as_bytes()).unwrap();

        assert_eq!(block.label(), "TEST");
        assert_eq!(block.into_parts().1, b"hello");
        assert_eq!(rest, b"trailing");
    }

    #[test]
    fn decode_consumes_crlf_after_block() {
        let input = HELLO.replace('\n', "\r\n");
        let (block, rest) = decode(input.as_bytes()).unwrap();

        assert_eq!(block.label(), "TEST");
        assert!(rest.is_empty());
    }

    #[test]
    fn decode_concatenated_blocks() {
        let input = format!("{HELLO}{}", HELLO.replace("TEST", "OTHER"));
        let (first, rest) = decode(input.as_bytes()).unwrap();
        let (second, rest) = decode(rest).unwrap();

        assert_eq!(first.label(), "TEST");
        assert_eq!(second.label(), "OTHER");
        assert!(decode(rest).is_none());
    }

    #[test]
    fn decode_any_line_width() {
        let body = "aGVsbG8gd29ybGQsIHRoaXMgaXMgYSBsb25nZXIgcGF5bG9hZCB0aGF0IHdyYXBzIGF0IDc2IGNv\nbHVtbnM=";
        let input = format!("-----BEGIN TEST-----\n{body}\n-----END TEST-----\n");
        let (block, rest) = decode(input.as_bytes()).unwrap();

        assert_eq!(
            block.into_parts().1,
            b"hello world, this is a longer payload that wraps at 76 columns"
        );
        assert!(rest.is_empty());
    }

    #[test]
    fn decode_keeps_block_with_headers() {
        let input = "-----BEGIN TEST-----\nProc-Type: 4,ENCRYPTED\nDEK-Info: AES-128-CBC,00112233445566778899AABBCCDDEEFF\n\naGVsbG8=\n-----END TEST-----\n";
        let (block, rest) = decode(input.as_bytes()).unwrap();

        assert_eq!(block.label(), "TEST");
        assert_eq!(block.into_parts().1, b"hello");
        assert!(rest.is_empty());
    }

    #[test]
    fn decode_skips_malformed_block() {
        let input = format!(
            "-----BEGIN TEST-----\n!!!!\n-----END TEST-----\n{}",
            HELLO.replace("TEST", "OTHER")
        );
        let (block, _) = decode(input.as_bytes()).unwrap();
        assert_eq!(block.label(), "OTHER");
    }

    #[test]
    fn decode_requires_boundary_at_line_start() {
        let input = format!("prefix {HELLO}");
        assert!(decode(input.as_bytes()).is_none());
    }

    #[test]
    fn decode_requires_matching_post_boundary() {
        let input = HELLO.replace("END TEST", "END OTHER");
        assert!(decode(input.as_bytes()).is_none());
    }

    #[test]
    fn decode_nothing() {
        assert!(decode(b"").is_none());
        assert!(decode(b"\x30\x82\x02\x1b").is_none());
    }

    #[test]
    fn unexpected_label() {
        let (block, _) = decode(HELLO.as_bytes()).unwrap();
        match block.into_contents("CERTIFICATE") {
            Err(PkiError::UnexpectedBlockType(label)) => assert_eq!(label, "TEST"),
            other => panic!("expected UnexpectedBlockType, got {other:?}"),
        }
    }
}
