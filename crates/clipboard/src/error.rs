use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{error}"))]
    Arboard { error: arboard::Error },

    #[snafu(display("Could not spawn clipboard listener, error: {source}"))]
    SpawnListener { source: std::io::Error },

    #[snafu(display("Could not spawn clipboard owner, error: {source}"))]
    SpawnOwner { source: std::io::Error },

    #[snafu(display("Clipboard is empty"))]
    Empty,

    #[snafu(display("Primitive was poisoned"))]
    PrimitivePoisoned,

    #[snafu(display("Notifier is closed"))]
    NotifierClosed,
}

impl From<arboard::Error> for Error {
    fn from(error: arboard::Error) -> Self {
        match error {
            arboard::Error::ContentNotAvailable => Self::Empty,
            error => Self::Arboard { error },
        }
    }
}
