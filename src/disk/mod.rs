pub mod block_device;
pub mod init;
pub mod memory_disk;
pub mod types;

pub use block_device::BlockDevice;
pub use memory_disk::MemoryDisk;
pub use types::{BlockId, Geometry};
