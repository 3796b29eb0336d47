use std::sync::Arc;

use crate::protocol::{SessionOpened, Transcript, UpstreamEvent};

pub type OpenCallback = Arc<dyn Fn(&SessionOpened) + Send + Sync>;
pub type DataCallback = Arc<dyn Fn(&Transcript) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type CloseCallback = Arc<dyn Fn() + Send + Sync>;

/// Handlers invoked from the upstream reader task.
#[derive(Clone, Default)]
pub struct TranscriberCallbacks {
    on_open: Option<OpenCallback>,
    on_data: Option<DataCallback>,
    on_error: Option<ErrorCallback>,
    on_close: Option<CloseCallback>,
}

impl TranscriberCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_open<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SessionOpened) + Send + Sync + 'static,
    {
        self.on_open = Some(Arc::new(callback));
        self
    }

    pub fn on_data<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Transcript) + Send + Sync + 'static,
    {
        self.on_data = Some(Arc::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn on_close<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_close = Some(Arc::new(callback));
        self
    }

    /// Routes a parsed event to its handler. Termination is reported through
    /// [`close`](Self::close) once the socket actually ends.
    pub fn dispatch(&self, event: &UpstreamEvent) {
        match event {
            UpstreamEvent::Opened(opened) => self.open(opened),
            UpstreamEvent::Transcript(transcript) => self.data(transcript),
            UpstreamEvent::Error(message) => self.error(message),
            UpstreamEvent::Terminated(_) => {}
        }
    }

    pub fn open(&self, opened: &SessionOpened) {
        if let Some(callback) = &self.on_open {
            callback(opened);
        }
    }

    pub fn data(&self, transcript: &Transcript) {
        if let Some(callback) = &self.on_data {
            callback(transcript);
        }
    }

    pub fn error(&self, message: &str) {
        if let Some(callback) = &self.on_error {
            callback(message);
        }
    }

    pub fn close(&self) {
        if let Some(callback) = &self.on_close {
            callback();
        }
    }
}
