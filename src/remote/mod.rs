/// HEIC conversion and PDF assembly contracts.
pub mod convert;
/// Background generation contract.
pub mod generate;
/// Background removal backends and failover proxy.
pub mod removebg;
/// Text overlay suggestion contract.
pub mod suggest;
/// Wire transport abstraction for the background-removal upstream.
pub mod transport;
