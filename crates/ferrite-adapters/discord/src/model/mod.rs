//! Discord gateway wire model.

pub mod payload;

pub use payload::{
    ACTIVITIES_SINCE_VERSION, GatewayPayload, Hello, identify, opcode, presence_for_version,
};
