pub mod payload;
pub mod pipeline;
pub mod state;
pub mod transport;

pub use payload::{PayloadOptions, SubmissionPayload};
pub use pipeline::{SubmissionOutcome, SubmissionPipeline};
pub use state::SubmissionState;
pub use transport::{
    Credentials, DryRunWriter, ListTarget, ListWriter, ProxyWriter, SharePointWriter,
    TransportConfig, WriteReceipt, writer_for,
};
