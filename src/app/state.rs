use crate::whatsapp::{ConnectionState, DraftMessage};

/// Everything the operator sees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Number and message as typed
    pub draft: DraftMessage,
    /// A send is in flight
    pub sending: bool,
    /// Latest poll result
    pub connection: ConnectionState,
}

impl ViewState {
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn qr(&self) -> Option<&str> {
        self.connection.qr()
    }

    /// Whether a send button would be enabled.
    pub fn can_submit(&self) -> bool {
        !self.sending && !self.draft.raw_number.is_empty() && !self.draft.body.is_empty()
    }
}
