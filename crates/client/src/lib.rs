pub mod codec;
mod error;
mod service;

pub use self::{
    codec::{
        BatchCodec, DefaultCodec, PayloadConsumer, PayloadProducer, RawConsumer, RawProducer,
    },
    error::{Error, Result},
    service::{ClipboardService, ServiceOptions},
};
