//! Locally saved addresses for Kneecast.

pub mod address;
pub mod address_store;

pub use address::SavedAddress;
pub use address_store::SavedAddressStore;
