//! Wire renditions of a [`Bundle`]: a JSON payload with base64 audio, and a
//! `multipart/mixed` body that can be sent buffered or in chunks.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Serialize, Serializer};

use crate::bundle::{Bundle, PublicEqMetadata, RenderedAudio};
use crate::ranges::RangeCatalog;

pub const MULTIPART_BOUNDARY: &str = "MULTIPARTBOUNDARY1234567890";

/// Chunk size used when streaming a multipart body.
pub const STREAM_CHUNK_SIZE: usize = 8192;

/// Header sent with every rendition; rounds must never be cached.
pub const CACHE_CONTROL: &str = "no-store";

fn as_base64<T: AsRef<[u8]>, S: Serializer>(data: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data.as_ref()))
}

#[derive(Debug, Serialize)]
pub struct PartPayload<'a> {
    pub filename: &'a str,
    pub mime: &'a str,
    #[serde(serialize_with = "as_base64")]
    pub data: &'a [u8],
}

impl<'a> From<&'a RenderedAudio> for PartPayload<'a> {
    fn from(audio: &'a RenderedAudio) -> Self {
        Self {
            filename: &audio.filename,
            mime: &audio.mime,
            data: &audio.data,
        }
    }
}

/// JSON body of `GET /bundle`.
#[derive(Debug, Serialize)]
pub struct BundlePayload<'a> {
    pub original: PartPayload<'a>,
    pub filtered: PartPayload<'a>,
    pub eq: &'a PublicEqMetadata,
    pub ranges: &'a RangeCatalog,
}

impl<'a> BundlePayload<'a> {
    pub fn new(bundle: &'a Bundle, ranges: &'a RangeCatalog) -> Self {
        Self {
            original: PartPayload::from(&bundle.original),
            filtered: PartPayload::from(&bundle.filtered),
            eq: &bundle.eq,
            ranges,
        }
    }
}

/// A two-part `multipart/mixed` body: the original, then the boosted copy.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    segments: Vec<Vec<u8>>,
}

impl MultipartBody {
    pub fn new(bundle: &Bundle) -> Self {
        let eq_header = format!(
            "X-Parametric-EQ: gain_db={}; Q={}\r\n",
            bundle.eq.gain_db, bundle.eq.q
        );
        let mut segments = Vec::with_capacity(7);
        segments.push(part_header("original", &bundle.original, ""));
        segments.push(bundle.original.data.clone());
        segments.push(b"\r\n".to_vec());
        segments.push(part_header("eq_boosted", &bundle.filtered, &eq_header));
        segments.push(bundle.filtered.data.clone());
        segments.push(b"\r\n".to_vec());
        segments.push(format!("--{MULTIPART_BOUNDARY}--\r\n").into_bytes());
        Self { segments }
    }

    pub fn content_type() -> String {
        format!("multipart/mixed; boundary={MULTIPART_BOUNDARY}")
    }

    /// Total body length in bytes.
    pub fn len(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole body in one buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.segments.concat()
    }

    /// The body as a sequence of chunks no larger than `chunk_size`.
    ///
    /// Part headers and trailers are yielded as their own chunks; audio data is
    /// split into `chunk_size` pieces.
    pub fn chunks(&self, chunk_size: usize) -> impl Iterator<Item = Vec<u8>> + '_ {
        let chunk_size = chunk_size.max(1);
        self.segments
            .iter()
            .flat_map(move |seg| seg.chunks(chunk_size).map(<[u8]>::to_vec))
    }

    pub fn into_chunks(self, chunk_size: usize) -> Vec<Vec<u8>> {
        self.chunks(chunk_size).collect()
    }
}

fn part_header(name: &str, audio: &RenderedAudio, extra: &str) -> Vec<u8> {
    format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Type: {}\r\n\
         Content-Disposition: inline; name=\"{name}\"; filename=\"{}\"\r\n\
         {extra}\
         Content-Length: {}\r\n\r\n",
        audio.mime,
        audio.filename,
        audio.data.len()
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::tests::test_generator;

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn json_payload_shape() {
        let generator = test_generator(8);
        let bundle = generator.generate_with_target(2, 650.0).unwrap();
        let json = serde_json::to_value(BundlePayload::new(&bundle, generator.catalog())).unwrap();

        assert_eq!(json["original"]["mime"], "audio/wav");
        assert_eq!(json["filtered"]["filename"], bundle.filtered.filename.as_str());
        let data = json["filtered"]["data"].as_str().unwrap();
        assert_eq!(STANDARD.decode(data).unwrap(), bundle.filtered.data);
        assert_eq!(json["ranges"].as_array().unwrap().len(), 5);
        assert_eq!(json["eq"]["Q"], 1.5);
    }

    #[test]
    fn json_payload_never_reveals_target() {
        let generator = test_generator(8);
        let bundle = generator.generate_with_target(2, 650.0).unwrap();
        let mut value = serde_json::to_value(BundlePayload::new(&bundle, generator.catalog())).unwrap();
        // Audio bytes are opaque base64; only the descriptive fields matter here
        value["original"]["data"].take();
        value["filtered"]["data"].take();
        let json = value.to_string();
        assert!(!json.contains("650"));
        assert!(!json.contains("center"));
        assert!(!json.contains("target"));
    }

    #[test]
    fn multipart_layout() {
        let generator = test_generator(4);
        let bundle = generator.generate_with_target(3, 1234.5).unwrap();
        let body = MultipartBody::new(&bundle).to_bytes();

        let open = format!("--{MULTIPART_BOUNDARY}\r\n");
        assert!(body.starts_with(open.as_bytes()));
        assert!(body.ends_with(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes()));

        let first_len = format!("Content-Length: {}\r\n\r\n", bundle.original.data.len());
        let at = find(&body, first_len.as_bytes()).unwrap() + first_len.len();
        assert_eq!(&body[at..at + bundle.original.data.len()], bundle.original.data.as_slice());

        assert!(find(&body, b"name=\"eq_boosted\"").is_some());
        assert!(find(&body, b"X-Parametric-EQ: gain_db=20; Q=1.5\r\n").is_some());
        assert!(find(&body, b"1234.5").is_none());
        assert!(find(&body, b"center_hz").is_none());
    }

    #[test]
    fn chunks_reassemble_to_body() {
        let bundle = test_generator(4).generate().unwrap();
        let body = MultipartBody::new(&bundle);
        let chunks = body.clone().into_chunks(STREAM_CHUNK_SIZE);
        assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= STREAM_CHUNK_SIZE));
        assert_eq!(chunks.concat(), body.to_bytes());
        assert_eq!(body.len(), body.to_bytes().len());
    }

    #[test]
    fn content_type_names_boundary() {
        assert_eq!(
            MultipartBody::content_type(),
            "multipart/mixed; boundary=MULTIPARTBOUNDARY1234567890"
        );
    }
}
