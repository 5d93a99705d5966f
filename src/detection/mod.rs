//! Spam and phishing detection core
//!
//! ```text
//!  {type, content}
//!        │
//!        ▼
//!  ┌────────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌───────────┐
//!  │ Normalizer │──▶│  Oracle  │──▶│  Parser  │──▶│   Store   │──▶│ Formatter │
//!  │ (modality) │   │  (HTTP)  │   │ (total)  │   │ (best     │   │           │
//!  └────────────┘   └──────────┘   └──────────┘   │  effort)  │   └───────────┘
//!                                                 └───────────┘
//! ```

pub mod media;
pub mod modality;
pub mod normalizer;
pub mod oracle;
pub mod parser;
pub mod pipeline;
pub mod response;
pub mod store;

pub use modality::Modality;
pub use parser::{Label, Verdict};
pub use pipeline::{DetectionPipeline, DetectionRequest};
pub use response::DetectionResponse;
