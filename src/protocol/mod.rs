pub mod request;
pub mod response;

pub use request::{ClientInfo, InitializeParams, JsonRpcRequest, ReadResourceParams, RpcId};
pub use response::{
    JsonRpcError, JsonRpcNotification, JsonRpcResponse, ReadResourceResult, ResourceContents,
    ResourceDescriptor, ResourceError, ResourceErrorCode, ResourceErrorResponse,
    ResourceTemplateDescriptor,
};
