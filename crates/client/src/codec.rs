use std::io::{Read, Write};

use serde::{de::DeserializeOwned, Serialize};
use snafu::{ResultExt, Snafu};

/// Writes the items of one `copy`, one payload file per item.
pub trait PayloadProducer {
    fn count(&self) -> usize;

    /// Either one type per item, or one type shared by every item.
    fn mime_types(&self) -> Vec<mime::Mime>;

    /// # Errors
    fn write(&self, index: usize, sink: &mut dyn Write) -> Result<(), Error>;
}

/// Decodes the items returned by `paste`.
pub trait PayloadConsumer {
    type Item;

    /// Items whose type is not accepted are not opened at all.
    fn accepts(&self, mime: &mime::Mime) -> bool {
        let _ = mime;
        true
    }

    /// # Errors
    fn read(&self, source: &mut dyn Read) -> Result<Self::Item, Error>;
}

/// One serde value as a single-item payload, encoded with `bincode`.
///
/// ```
/// use clipmux_client::{DefaultCodec, PayloadProducer};
///
/// let codec = DefaultCodec::new(42_u32);
/// assert_eq!(codec.count(), 1);
/// assert_eq!(DefaultCodec::<u32>::decoder().count(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct DefaultCodec<T> {
    value: Option<T>,
    mime: mime::Mime,
}

impl<T> DefaultCodec<T> {
    #[inline]
    pub const fn new(value: T) -> Self {
        Self { value: Some(value), mime: mime::APPLICATION_OCTET_STREAM }
    }

    /// A codec with nothing to write, accepting items of any type.
    #[inline]
    #[must_use]
    pub const fn decoder() -> Self { Self { value: None, mime: mime::STAR_STAR } }

    #[inline]
    #[must_use]
    pub fn with_mime(mut self, mime: mime::Mime) -> Self {
        self.mime = mime;
        self
    }

    #[inline]
    pub const fn value(&self) -> Option<&T> { self.value.as_ref() }

    #[inline]
    pub fn into_value(self) -> Option<T> { self.value }
}

impl<T: Serialize> PayloadProducer for DefaultCodec<T> {
    fn count(&self) -> usize { usize::from(self.value.is_some()) }

    fn mime_types(&self) -> Vec<mime::Mime> { vec![self.mime.clone()] }

    fn write(&self, index: usize, sink: &mut dyn Write) -> Result<(), Error> {
        match (index, &self.value) {
            (0, Some(value)) => encode(index, value, sink),
            _ => Err(Error::IndexOutOfRange { index, count: self.count() }),
        }
    }
}

impl<T: DeserializeOwned> PayloadConsumer for DefaultCodec<T> {
    type Item = T;

    fn accepts(&self, mime: &mime::Mime) -> bool { clipmux_base::mime_matches(&self.mime, mime) }

    fn read(&self, source: &mut dyn Read) -> Result<T, Error> { decode(source) }
}

/// An ordered list of serde values, one item per value.
#[derive(Clone, Debug)]
pub struct BatchCodec<T> {
    values: Vec<T>,
    mime: mime::Mime,
}

impl<T> BatchCodec<T> {
    #[inline]
    pub const fn new(values: Vec<T>) -> Self {
        Self { values, mime: mime::APPLICATION_OCTET_STREAM }
    }

    #[inline]
    #[must_use]
    pub const fn decoder() -> Self { Self { values: Vec::new(), mime: mime::STAR_STAR } }

    #[inline]
    #[must_use]
    pub fn with_mime(mut self, mime: mime::Mime) -> Self {
        self.mime = mime;
        self
    }

    #[inline]
    pub fn values(&self) -> &[T] { &self.values }
}

impl<T: Serialize> PayloadProducer for BatchCodec<T> {
    fn count(&self) -> usize { self.values.len() }

    fn mime_types(&self) -> Vec<mime::Mime> { vec![self.mime.clone()] }

    fn write(&self, index: usize, sink: &mut dyn Write) -> Result<(), Error> {
        let value = self
            .values
            .get(index)
            .ok_or(Error::IndexOutOfRange { index, count: self.values.len() })?;
        encode(index, value, sink)
    }
}

impl<T: DeserializeOwned> PayloadConsumer for BatchCodec<T> {
    type Item = T;

    fn accepts(&self, mime: &mime::Mime) -> bool { clipmux_base::mime_matches(&self.mime, mime) }

    fn read(&self, source: &mut dyn Read) -> Result<T, Error> { decode(source) }
}

/// Returns the raw bytes of every item of a matching type.
#[derive(Clone, Debug)]
pub struct RawConsumer {
    mime: mime::Mime,
}

impl Default for RawConsumer {
    fn default() -> Self { Self::new() }
}

impl RawConsumer {
    #[inline]
    #[must_use]
    pub const fn new() -> Self { Self { mime: mime::STAR_STAR } }

    #[inline]
    #[must_use]
    pub fn with_mime(mut self, mime: mime::Mime) -> Self {
        self.mime = mime;
        self
    }
}

impl PayloadConsumer for RawConsumer {
    type Item = Vec<u8>;

    fn accepts(&self, mime: &mime::Mime) -> bool { clipmux_base::mime_matches(&self.mime, mime) }

    fn read(&self, source: &mut dyn Read) -> Result<Vec<u8>, Error> {
        let mut content = Vec::new();
        let _ = source.read_to_end(&mut content).context(IoSnafu)?;
        Ok(content)
    }
}

/// Raw byte buffers, one item per buffer, all of the same type.
#[derive(Clone, Debug)]
pub struct RawProducer<B> {
    buffers: Vec<B>,
    mime: mime::Mime,
}

impl<B: AsRef<[u8]>> RawProducer<B> {
    #[inline]
    pub const fn new(buffers: Vec<B>, mime: mime::Mime) -> Self {
        Self { buffers, mime }
    }
}

impl<B: AsRef<[u8]>> PayloadProducer for RawProducer<B> {
    fn count(&self) -> usize { self.buffers.len() }

    fn mime_types(&self) -> Vec<mime::Mime> { vec![self.mime.clone()] }

    fn write(&self, index: usize, sink: &mut dyn Write) -> Result<(), Error> {
        let buffer = self
            .buffers
            .get(index)
            .ok_or(Error::IndexOutOfRange { index, count: self.buffers.len() })?;
        sink.write_all(buffer.as_ref()).context(IoSnafu)
    }
}

fn encode<T: Serialize>(index: usize, value: &T, sink: &mut dyn Write) -> Result<(), Error> {
    bincode::serialize_into(sink, value).context(EncodeSnafu { index })
}

fn decode<T: DeserializeOwned>(source: &mut dyn Read) -> Result<T, Error> {
    bincode::deserialize_from(source).context(DecodeSnafu)
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Could not encode item {index}, error: {source}"))]
    Encode { index: usize, source: bincode::Error },

    #[snafu(display("Could not decode item, error: {source}"))]
    Decode { source: bincode::Error },

    #[snafu(display("Item {index} is out of range, count: {count}"))]
    IndexOutOfRange { index: usize, count: usize },

    #[snafu(display("{source}"))]
    Io { source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::{
        BatchCodec, DefaultCodec, Error, PayloadConsumer, PayloadProducer, RawConsumer,
        RawProducer,
    };

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_default_codec() {
        let codec = DefaultCodec::new(Point { x: 1, y: -2 });
        let mut buffer = Vec::new();
        codec.write(0, &mut buffer).unwrap();
        assert!(matches!(codec.write(1, &mut Vec::new()), Err(Error::IndexOutOfRange { .. })));

        let decoded = DefaultCodec::<Point>::decoder().read(&mut buffer.as_slice()).unwrap();
        assert_eq!(decoded, Point { x: 1, y: -2 });
    }

    #[test]
    fn test_decode_truncated_payload() {
        let mut buffer = Vec::new();
        DefaultCodec::new("a longer string".to_string()).write(0, &mut buffer).unwrap();
        buffer.truncate(buffer.len() / 2);

        let result = DefaultCodec::<String>::decoder().read(&mut buffer.as_slice());
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_batch_codec_items() {
        let int = "x/int".parse::<mime::Mime>().unwrap();
        let codec = BatchCodec::new(vec![1_i64, 2, 3]).with_mime(int.clone());
        assert_eq!(codec.count(), 3);
        assert_eq!(codec.mime_types(), vec![int.clone()]);

        let decoder = BatchCodec::<i64>::decoder().with_mime(int.clone());
        assert!(decoder.accepts(&int));
        assert!(!decoder.accepts(&mime::TEXT_PLAIN));

        let values = (0..codec.count())
            .map(|index| {
                let mut buffer = Vec::new();
                codec.write(index, &mut buffer).unwrap();
                decoder.read(&mut buffer.as_slice()).unwrap()
            })
            .collect::<Vec<_>>();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_raw_payloads() {
        let producer = RawProducer::new(vec!["alpha", "beta"], mime::TEXT_PLAIN_UTF_8);
        let mut buffer = Vec::new();
        producer.write(1, &mut buffer).unwrap();
        assert_eq!(RawConsumer::new().read(&mut buffer.as_slice()).unwrap(), b"beta");
        assert!(RawConsumer::new().accepts(&mime::IMAGE_PNG));
        assert!(!RawConsumer::new().with_mime(mime::TEXT_STAR).accepts(&mime::IMAGE_PNG));
    }
}
