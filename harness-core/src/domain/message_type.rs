//! ISO 20022 message types stored in the transaction history

use serde::{Deserialize, Serialize};

/// Message types the monitoring service records in its `transaction` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageType {
    /// FI to FI customer credit transfer (the transfer request)
    Pacs008,
    /// FI to FI payment status report
    Pacs002,
    /// Customer credit transfer initiation
    Pain001,
    /// Creditor payment activation request
    Pain013,
}

impl MessageType {
    /// All known types, in the order the stats query selects them
    pub const ALL: [MessageType; 4] = [
        MessageType::Pacs008,
        MessageType::Pacs002,
        MessageType::Pain001,
        MessageType::Pain013,
    ];

    /// The type counted by counterparty summaries.
    ///
    /// Every payment is stored twice (request plus status report) with the
    /// same amount, and the status report's source/destination mapping does
    /// not match the request's. Only requests are aggregated.
    pub const TRANSFER_REQUEST: MessageType = MessageType::Pacs008;

    /// Full version code as stored in the `txtp` column
    pub fn code(&self) -> &'static str {
        match self {
            MessageType::Pacs008 => "pacs.008.001.10",
            MessageType::Pacs002 => "pacs.002.001.12",
            MessageType::Pain001 => "pain.001.001.11",
            MessageType::Pain013 => "pain.013.001.09",
        }
    }

    /// Short label used in stats output
    pub fn label(&self) -> &'static str {
        match self {
            MessageType::Pacs008 => "pacs.008",
            MessageType::Pacs002 => "pacs.002",
            MessageType::Pain001 => "pain.001",
            MessageType::Pain013 => "pain.013",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_request_code() {
        assert_eq!(MessageType::TRANSFER_REQUEST.code(), "pacs.008.001.10");
    }

    #[test]
    fn test_labels_follow_codes() {
        for message_type in MessageType::ALL {
            assert!(message_type.code().starts_with(message_type.label()));
            assert_eq!(message_type.to_string(), message_type.code());
        }
    }
}
