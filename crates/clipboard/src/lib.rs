mod default;
mod error;
mod listener;
mod local;
mod pubsub;
mod traits;
pub mod uri_list;

pub use self::{
    default::{Clipboard, DEFAULT_POLL_INTERVAL},
    error::Error,
    local::Clipboard as LocalClipboard,
    pubsub::{Publisher, Subscriber},
    traits::{
        Load as ClipboardLoad, LoadExt as ClipboardLoadExt, Session as ClipboardSession,
        Store as ClipboardStore, StoreExt as ClipboardStoreExt, Subscribe as ClipboardSubscribe,
        Wait as ClipboardWait,
    },
};
