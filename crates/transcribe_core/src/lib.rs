mod callbacks;
mod protocol;

pub use callbacks::{
    CloseCallback, DataCallback, ErrorCallback, OpenCallback, TranscriberCallbacks,
};
pub use protocol::{
    parse_upstream_message, ClientMessage, SessionOpened, SessionTerminated, Transcript,
    UpstreamEvent, TERMINATE_MESSAGE,
};
