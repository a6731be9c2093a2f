//! On-chain balance reads.

mod json_rpc;
mod reader;
mod transport;

pub use json_rpc::JsonRpcTransport;
pub use reader::BalanceReader;
pub use transport::RpcTransport;
